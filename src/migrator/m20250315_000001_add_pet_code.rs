use crate::store::schema;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

pub(super) const PET_CODE_INDEX: &str = "idx-pets-pet_code";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // SQLite cannot add a UNIQUE column, so uniqueness comes from the index.
        schema::add_column_if_absent(
            manager.get_connection(),
            "pets",
            ColumnDef::new(Pets::PetCode).string_len(20).null(),
        )
        .await?;

        manager
            .create_index(
                Index::create()
                    .name(PET_CODE_INDEX)
                    .table(Pets::Table)
                    .col(Pets::PetCode)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name(PET_CODE_INDEX).table(Pets::Table).to_owned())
            .await?;
        manager
            .alter_table(
                Table::alter()
                    .table(Pets::Table)
                    .drop_column(Pets::PetCode)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Pets {
    Table,
    PetCode,
}
