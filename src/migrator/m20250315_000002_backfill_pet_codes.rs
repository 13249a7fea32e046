use crate::code::generate_code;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{ConnectionTrait, SqlErr, Statement};

#[derive(DeriveMigrationName)]
pub struct Migration;

const MAX_ATTEMPTS: usize = 10;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let backend = manager.get_database_backend();

        let select = Query::select()
            .column(Pets::Id)
            .from(Pets::Table)
            .and_where(Expr::col(Pets::PetCode).is_null())
            .to_owned();
        let rows = db.query_all(backend.build(&select)).await?;
        if rows.is_empty() {
            return Ok(());
        }
        tracing::info!(pets = rows.len(), "backfilling public codes");

        for row in rows {
            let id: i32 = row.try_get("", "id")?;
            let mut assigned = false;
            for _ in 0..MAX_ATTEMPTS {
                let code = generate_code();
                let update = Statement::from_sql_and_values(
                    backend,
                    "UPDATE pets SET pet_code = ? WHERE id = ? AND pet_code IS NULL",
                    [code.clone().into(), id.into()],
                );
                match db.execute(update).await {
                    Ok(_) => {
                        tracing::info!(pet_id = id, pet_code = %code, "public code assigned");
                        assigned = true;
                        break;
                    }
                    Err(e)
                        if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) =>
                    {
                        tracing::warn!(pet_id = id, pet_code = %code, "code collision during backfill");
                    }
                    Err(e) => return Err(e),
                }
            }
            if !assigned {
                return Err(DbErr::Custom(format!(
                    "could not assign a unique code to pet {} after {} attempts",
                    id, MAX_ATTEMPTS
                )));
            }
        }
        Ok(())
    }

    async fn down(&self, _manager: &SchemaManager) -> Result<(), DbErr> {
        // Assigned codes are already printed on tags; they stay.
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Pets {
    Table,
    Id,
    PetCode,
}
