use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "pet_notifications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub pet_id: i32,
    pub finder_name: String,
    pub finder_phone: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub finder_message: Option<String>,
    #[sea_orm(column_type = "Double", nullable)]
    pub location_lat: Option<f64>,
    #[sea_orm(column_type = "Double", nullable)]
    pub location_lng: Option<f64>,
    #[sea_orm(column_type = "Double", nullable)]
    pub location_accuracy: Option<f64>,
    pub found_timestamp: Option<String>,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pet::Entity",
        from = "Column::PetId",
        to = "super::pet::Column::Id"
    )]
    Pet,
}

impl Related<super::pet::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pet.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
