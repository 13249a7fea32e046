use crate::store::schema;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const BREED_KEY_INDEX: &str = "idx-breeds-name-species";

const SEED: &[(&str, &[&str])] = &[
    (
        "Perro",
        &[
            "Labrador Retriever",
            "Pastor Alemán",
            "Golden Retriever",
            "Bulldog Francés",
            "Chihuahua",
            "Poodle",
            "Beagle",
            "Mestizo",
        ],
    ),
    (
        "Gato",
        &["Siamés", "Persa", "Maine Coon", "Bengalí", "Común Europeo", "Mestizo"],
    ),
    (
        "Conejo",
        &[
            "Holland Lop",
            "Mini Lop",
            "Netherland Dwarf",
            "Lionhead",
            "Dutch",
            "Flemish Giant",
            "Rex",
            "Angora",
            "English Lop",
        ],
    ),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        schema::dedupe_by_key(manager.get_connection(), "breeds", &["name", "species"]).await?;

        manager
            .create_index(
                Index::create()
                    .name(BREED_KEY_INDEX)
                    .table(Breeds::Table)
                    .col(Breeds::Name)
                    .col(Breeds::Species)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        let mut insert = Query::insert()
            .into_table(Breeds::Table)
            .columns([Breeds::Name, Breeds::Species])
            .on_conflict(
                OnConflict::columns([Breeds::Name, Breeds::Species])
                    .do_nothing()
                    .to_owned(),
            )
            .to_owned();
        for (species, names) in SEED {
            for name in names.iter() {
                insert.values_panic([(*name).into(), (*species).into()]);
            }
        }
        manager.exec_stmt(insert).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name(BREED_KEY_INDEX).table(Breeds::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Breeds {
    Table,
    Name,
    Species,
}
