use sea_orm_migration::prelude::*;

mod m20250301_000001_create_owners_and_pets;
mod m20250301_000002_create_breeds;
mod m20250315_000001_add_pet_code;
mod m20250315_000002_backfill_pet_codes;
mod m20250402_000001_rename_microchip;
mod m20250402_000002_dedupe_breeds;
mod m20250410_000001_create_pet_events;
mod m20250410_000002_lookup_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_owners_and_pets::Migration),
            Box::new(m20250301_000002_create_breeds::Migration),
            Box::new(m20250315_000001_add_pet_code::Migration),
            Box::new(m20250315_000002_backfill_pet_codes::Migration),
            Box::new(m20250402_000001_rename_microchip::Migration),
            Box::new(m20250402_000002_dedupe_breeds::Migration),
            Box::new(m20250410_000001_create_pet_events::Migration),
            Box::new(m20250410_000002_lookup_indexes::Migration),
        ]
    }
}
