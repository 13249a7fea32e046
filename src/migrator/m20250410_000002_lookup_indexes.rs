use super::m20250315_000001_add_pet_code::PET_CODE_INDEX;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const ACTIVE_CODE_INDEX: &str = "idx-pets-active-pet_code";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // Codes only have to be unique among active pets; a deactivated tag
        // keeps its code for the record.
        manager
            .drop_index(
                Index::drop()
                    .name(PET_CODE_INDEX)
                    .table(Pets::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;
        db.execute_unprepared(&format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS \"{}\" ON pets (pet_code) WHERE is_active = 1",
            ACTIVE_CODE_INDEX
        ))
        .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-pets-user_id")
                    .table(Pets::Table)
                    .col(Pets::UserId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-users-email")
                    .table(Users::Table)
                    .col(Users::Email)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx-users-email").table(Users::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx-pets-user_id").table(Pets::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name(ACTIVE_CODE_INDEX).table(Pets::Table).to_owned())
            .await?;
        manager
            .create_index(
                Index::create()
                    .name(PET_CODE_INDEX)
                    .table(Pets::Table)
                    .col(Pets::PetCode)
                    .unique()
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Email,
}

#[derive(DeriveIden)]
enum Pets {
    Table,
    UserId,
    PetCode,
}
