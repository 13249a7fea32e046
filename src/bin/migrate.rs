//! Versioned schema runner: `migrate [up|status|down [n]]`.

use pettag_server::config::AppConfig;
use pettag_server::migrator::Migrator;
use sea_orm_migration::MigratorTrait;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    pettag_server::telemetry::init_telemetry("pettag-migrate");

    let config = AppConfig::from_env()?;
    let db = pettag_server::store::connect(&config.database_url).await?;

    let mut args = std::env::args().skip(1);
    let command = args.next().unwrap_or_else(|| "up".to_string());

    match command.as_str() {
        "up" => {
            let pending = Migrator::get_pending_migrations(&db).await?;
            Migrator::up(&db, None).await?;
            tracing::info!(applied = pending.len(), "schema up to date");
        }
        "status" => {
            for migration in Migrator::get_applied_migrations(&db).await? {
                println!("applied  {}", migration.name());
            }
            for migration in Migrator::get_pending_migrations(&db).await? {
                println!("pending  {}", migration.name());
            }
        }
        "down" => {
            let steps = match args.next() {
                Some(raw) => raw
                    .parse::<u32>()
                    .map_err(|e| format!("invalid step count '{}': {}", raw, e))?,
                None => 1,
            };
            Migrator::down(&db, Some(steps)).await?;
            tracing::info!(steps, "rolled back");
        }
        other => {
            return Err(
                format!("unknown command '{}'; expected up, status or down [n]", other).into(),
            );
        }
    }

    Ok(())
}
