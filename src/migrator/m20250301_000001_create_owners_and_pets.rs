use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create Users Table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Email).string_len(255).not_null())
                    .col(ColumnDef::new(Users::Name).string_len(255))
                    .col(ColumnDef::new(Users::Phone).string_len(20))
                    .col(ColumnDef::new(Users::City).string_len(100))
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .date_time()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Pets as first deployed: the chip number lived in `microchip` and
        // there was no public code yet.
        manager
            .create_table(
                Table::create()
                    .table(Pets::Table)
                    .if_not_exists()
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
                    .col(ColumnDef::new(Pets::Microchip).string_len(50))
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
                            .from(Pets::Table, Pets::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Pets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    Name,
    Phone,
    City,
    CreatedAt,
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
    IsActive,
    GpsAlerts,
    AlertEmail,
    AlertWhatsapp,
    AlertSms,
    WhatsappNumber,
    CreatedAt,
    UpdatedAt,
}
