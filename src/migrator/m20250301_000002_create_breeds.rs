use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Breeds::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Breeds::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Breeds::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Breeds::Species).string_len(50).not_null())
                    .col(ColumnDef::new(Breeds::IsActive).boolean().not_null().default(true))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Breeds::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Breeds {
    Table,
    Id,
    Name,
    Species,
    IsActive,
}
