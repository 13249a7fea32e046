use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "pets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub species: String,
    pub sex: String,
    pub color: String,
    pub age_years: Option<i32>,
    pub age_months: Option<i32>,
    pub breed: Option<String>,
    pub sterilization_code: Option<String>,
    pub pet_code: String,
    pub is_active: bool,
    pub gps_alerts: bool,
    pub alert_email: bool,
    pub alert_whatsapp: bool,
    pub alert_sms: bool,
    pub whatsapp_number: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::owner::Entity",
        from = "Column::UserId",
        to = "super::owner::Column::Id"
    )]
    Owner,
    #[sea_orm(has_many = "super::pet_location::Entity")]
    PetLocation,
    #[sea_orm(has_many = "super::pet_notification::Entity")]
    PetNotification,
}

impl Related<super::owner::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::pet_location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PetLocation.def()
    }
}

impl Related<super::pet_notification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PetNotification.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
