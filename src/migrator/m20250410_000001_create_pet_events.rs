use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PetLocations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PetLocations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PetLocations::PetId).integer().not_null())
                    .col(ColumnDef::new(PetLocations::Latitude).double().not_null())
                    .col(ColumnDef::new(PetLocations::Longitude).double().not_null())
                    .col(ColumnDef::new(PetLocations::Accuracy).double())
                    .col(ColumnDef::new(PetLocations::FoundTimestamp).text())
                    .col(
                        ColumnDef::new(PetLocations::CreatedAt)
                            .date_time()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-pet_location-pet_id")
                            .from(PetLocations::Table, PetLocations::PetId)
                            .to(Pets::Table, Pets::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PetNotifications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PetNotifications::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PetNotifications::PetId).integer().not_null())
                    .col(ColumnDef::new(PetNotifications::FinderName).text().not_null())
                    .col(ColumnDef::new(PetNotifications::FinderPhone).text().not_null())
                    .col(ColumnDef::new(PetNotifications::FinderMessage).text())
                    .col(ColumnDef::new(PetNotifications::LocationLat).double())
                    .col(ColumnDef::new(PetNotifications::LocationLng).double())
                    .col(ColumnDef::new(PetNotifications::LocationAccuracy).double())
                    .col(ColumnDef::new(PetNotifications::FoundTimestamp).text())
                    .col(
                        ColumnDef::new(PetNotifications::CreatedAt)
                            .date_time()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-pet_notification-pet_id")
                            .from(PetNotifications::Table, PetNotifications::PetId)
                            .to(Pets::Table, Pets::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-pet_locations-pet_id")
                    .table(PetLocations::Table)
                    .col(PetLocations::PetId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-pet_notifications-pet_id")
                    .table(PetNotifications::Table)
                    .col(PetNotifications::PetId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PetNotifications::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PetLocations::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Pets {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum PetLocations {
    Table,
    Id,
    PetId,
    Latitude,
    Longitude,
    Accuracy,
    FoundTimestamp,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PetNotifications {
    Table,
    Id,
    PetId,
    FinderName,
    FinderPhone,
    FinderMessage,
    LocationLat,
    LocationLng,
    LocationAccuracy,
    FoundTimestamp,
    CreatedAt,
}
