//! In-place schema evolution for the SQLite store.
//!
//! Each helper inspects the live schema first and does nothing when its change
//! is already present, so calling one twice is harmless.

use sea_orm::sea_query::{Alias, ColumnDef, Table, TableCreateStatement};
use sea_orm::{ConnectionTrait, DbErr, Statement, TransactionTrait};

/// Rejects anything that is not a plain SQL identifier. Table and column names
/// cannot be bound as parameters, so they are checked before being spliced in.
fn ident(name: &str) -> Result<&str, DbErr> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit());
    if valid {
        Ok(name)
    } else {
        Err(DbErr::Custom(format!("invalid identifier '{}'", name)))
    }
}

pub async fn table_columns<C: ConnectionTrait>(db: &C, table: &str) -> Result<Vec<String>, DbErr> {
    let sql = format!("PRAGMA table_info(\"{}\")", ident(table)?);
    let rows = db
        .query_all(Statement::from_string(db.get_database_backend(), sql))
        .await?;
    rows.iter()
        .map(|row| row.try_get::<String>("", "name"))
        .collect()
}

pub async fn table_exists<C: ConnectionTrait>(db: &C, table: &str) -> Result<bool, DbErr> {
    Ok(!table_columns(db, table).await?.is_empty())
}

pub async fn column_exists<C: ConnectionTrait>(
    db: &C,
    table: &str,
    column: &str,
) -> Result<bool, DbErr> {
    Ok(table_columns(db, table).await?.iter().any(|c| c == column))
}

pub async fn count_rows<C: ConnectionTrait>(db: &C, table: &str) -> Result<i64, DbErr> {
    let sql = format!("SELECT COUNT(*) AS n FROM \"{}\"", ident(table)?);
    let row = db
        .query_one(Statement::from_string(db.get_database_backend(), sql))
        .await?
        .ok_or_else(|| DbErr::Custom(format!("no count returned for {}", table)))?;
    row.try_get::<i64>("", "n")
}

/// Adds `column` to `table` unless a column of that name already exists.
/// Returns whether the table was altered.
pub async fn add_column_if_absent<C: ConnectionTrait>(
    db: &C,
    table: &str,
    column: &mut ColumnDef,
) -> Result<bool, DbErr> {
    let name = column.get_column_name();
    if column_exists(db, table, &name).await? {
        tracing::debug!(table, column = %name, "column already present");
        return Ok(false);
    }

    let stmt = Table::alter()
        .table(Alias::new(ident(table)?))
        .add_column(column)
        .to_owned();
    db.execute(db.get_database_backend().build(&stmt)).await?;
    tracing::info!(table, column = %name, "column added");
    Ok(true)
}

/// A column rename carried out by copy-and-swap.
///
/// `replacement` must create the table named by [`staging_table`] with the
/// final column layout: every column of `table` must exist in it, with `from`
/// renamed to `to`. Indexes on `table` are dropped with it and have to be
/// recreated by the caller.
pub struct ColumnRename<'a> {
    pub table: &'a str,
    pub from: &'a str,
    pub to: &'a str,
    pub replacement: TableCreateStatement,
}

pub fn staging_table(table: &str) -> String {
    format!("{}_new", table)
}

/// Runs create-new/copy-rows/drop-old/rename inside one transaction. Returns
/// `Ok(false)` when `from` is already gone and `to` present.
pub async fn rename_column<C>(db: &C, rename: ColumnRename<'_>) -> Result<bool, DbErr>
where
    C: ConnectionTrait + TransactionTrait,
{
    let table = ident(rename.table)?;
    let from = ident(rename.from)?;
    let to = ident(rename.to)?;
    let staging = staging_table(table);

    let columns = table_columns(db, table).await?;
    let has_from = columns.iter().any(|c| c == from);
    let has_to = columns.iter().any(|c| c == to);
    match (has_from, has_to) {
        (false, true) => {
            tracing::debug!(table, from, to, "column already renamed");
            return Ok(false);
        }
        (false, false) => {
            return Err(DbErr::Custom(format!("{}.{} does not exist", table, from)))
        }
        (true, true) => {
            return Err(DbErr::Custom(format!(
                "{} has both {} and {}",
                table, from, to
            )))
        }
        (true, false) => {}
    }

    let source_cols: Vec<String> = columns.iter().map(|c| format!("\"{}\"", c)).collect();
    let target_cols: Vec<String> = columns
        .iter()
        .map(|c| if c == from { to } else { c.as_str() })
        .map(|c| format!("\"{}\"", c))
        .collect();

    let backend = db.get_database_backend();
    let txn = db.begin().await?;

    // The old table disappears before its replacement takes the name.
    txn.execute_unprepared("PRAGMA defer_foreign_keys = ON").await?;
    txn.execute_unprepared(&format!("DROP TABLE IF EXISTS \"{}\"", staging))
        .await?;
    txn.execute(backend.build(&rename.replacement)).await?;

    let staged = table_columns(&txn, &staging).await?;
    if let Some(missing) = target_cols
        .iter()
        .map(|c| c.trim_matches('"'))
        .find(|c| !staged.iter().any(|s| s == c))
    {
        return Err(DbErr::Custom(format!(
            "replacement for {} lacks column {}",
            table, missing
        )));
    }

    txn.execute_unprepared(&format!(
        "INSERT INTO \"{}\" ({}) SELECT {} FROM \"{}\"",
        staging,
        target_cols.join(", "),
        source_cols.join(", "),
        table
    ))
    .await?;

    let before = count_rows(&txn, table).await?;
    let after = count_rows(&txn, &staging).await?;
    if before != after {
        return Err(DbErr::Custom(format!(
            "copied {} of {} rows from {}",
            after, before, table
        )));
    }

    txn.execute_unprepared(&format!("DROP TABLE \"{}\"", table))
        .await?;
    txn.execute_unprepared(&format!(
        "ALTER TABLE \"{}\" RENAME TO \"{}\"",
        staging, table
    ))
    .await?;
    txn.commit().await?;

    tracing::info!(table, from, to, rows = before, "column renamed");
    Ok(true)
}

/// Deletes every row whose `key` tuple repeats an earlier row, keeping the one
/// with the lowest `id`. Returns the number of rows removed.
pub async fn dedupe_by_key<C: ConnectionTrait>(
    db: &C,
    table: &str,
    key: &[&str],
) -> Result<u64, DbErr> {
    let table = ident(table)?;
    if key.is_empty() {
        return Err(DbErr::Custom("dedupe key must not be empty".to_string()));
    }
    let key = key
        .iter()
        .map(|k| ident(k).map(|k| format!("\"{}\"", k)))
        .collect::<Result<Vec<_>, _>>()?
        .join(", ");

    let sql = format!(
        "DELETE FROM \"{table}\" WHERE id NOT IN (SELECT MIN(id) FROM \"{table}\" GROUP BY {key})",
        table = table,
        key = key
    );
    let removed = db.execute_unprepared(&sql).await?.rows_affected();
    if removed > 0 {
        tracing::info!(table, removed, "duplicate rows removed");
    }
    Ok(removed)
}
