use crate::store::schema::{self, ColumnRename};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// The pets table with the chip column under `chip_column`. The public code is
/// NOT NULL from here on; the backfill guarantees every row has one.
fn pets_table(chip_column: Pets, code_required: bool) -> TableCreateStatement {
    let mut pet_code = ColumnDef::new(Pets::PetCode);
    pet_code.string_len(20);
    if code_required {
        pet_code.not_null();
    }

    Table::create()
        .table(Alias::new(schema::staging_table("pets")))
        .col(
            ColumnDef::new(Pets::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(ColumnDef::new(Pets::UserId).integer().not_null())
        .col(ColumnDef::new(Pets::Name).string_len(255).not_null())
        .col(ColumnDef::new(Pets::Species).string_len(50).not_null())
        .col(ColumnDef::new(Pets::Sex).string_len(10).not_null())
        .col(ColumnDef::new(Pets::Color).string_len(255).not_null())
        .col(ColumnDef::new(Pets::AgeYears).integer())
        .col(ColumnDef::new(Pets::AgeMonths).integer())
        .col(ColumnDef::new(Pets::Breed).string_len(255))
        .col(ColumnDef::new(chip_column).string_len(50))
        .col(&mut pet_code)
        .col(ColumnDef::new(Pets::IsActive).boolean().not_null().default(true))
        .col(ColumnDef::new(Pets::GpsAlerts).boolean().not_null().default(false))
        .col(ColumnDef::new(Pets::AlertEmail).boolean().not_null().default(false))
        .col(ColumnDef::new(Pets::AlertWhatsapp).boolean().not_null().default(false))
        .col(ColumnDef::new(Pets::AlertSms).boolean().not_null().default(false))
        .col(ColumnDef::new(Pets::WhatsappNumber).string_len(20))
        .col(
            ColumnDef::new(Pets::CreatedAt)
                .date_time()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .col(
            ColumnDef::new(Pets::UpdatedAt)
                .date_time()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk-pet-user_id")
                .from(Alias::new(schema::staging_table("pets")), Pets::UserId)
                .to(Users::Table, Users::Id),
        )
        .to_owned()
}

async fn restore_code_index(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    manager
        .create_index(
            Index::create()
                .name(super::m20250315_000001_add_pet_code::PET_CODE_INDEX)
                .table(Pets::Table)
                .col(Pets::PetCode)
                .unique()
                .if_not_exists()
                .to_owned(),
        )
        .await
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        schema::rename_column(
            manager.get_connection(),
            ColumnRename {
                table: "pets",
                from: "microchip",
                to: "sterilization_code",
                replacement: pets_table(Pets::SterilizationCode, true),
            },
        )
        .await?;
        restore_code_index(manager).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        schema::rename_column(
            manager.get_connection(),
            ColumnRename {
                table: "pets",
                from: "sterilization_code",
                to: "microchip",
                replacement: pets_table(Pets::Microchip, false),
            },
        )
        .await?;
        restore_code_index(manager).await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Pets {
    Table,
    Id,
    UserId,
    Name,
    Species,
    Sex,
    Color,
    AgeYears,
    AgeMonths,
    Breed,
    Microchip,
    SterilizationCode,
    PetCode,
    IsActive,
    GpsAlerts,
    AlertEmail,
    AlertWhatsapp,
    AlertSms,
    WhatsappNumber,
    CreatedAt,
    UpdatedAt,
}
