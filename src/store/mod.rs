//! Durable storage for owners, pets, breeds and finder events.

pub mod schema;

use crate::config::OwnerEmailPolicy;
use crate::entities::{breed, owner, pet, pet_location, pet_notification, prelude::*};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Database, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("storage failure: {0}")]
    Io(DbErr),
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                StoreError::ConstraintViolation(detail)
            }
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => StoreError::NotFound(detail),
            _ => StoreError::Io(err),
        }
    }
}

/// Opens the store, creating the parent directory of a file-backed SQLite URL.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    if let Some(path) = database_url.strip_prefix("sqlite://") {
        let path = path.split('?').next().unwrap_or(path);
        if let Some(parent) = std::path::Path::new(path).parent() {
            if path != ":memory:" && !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    DbErr::Custom(format!("cannot create {}: {}", parent.display(), e))
                })?;
            }
        }
    }
    Database::connect(database_url).await
}

#[derive(Clone, Debug, Default)]
pub struct NewOwner {
    pub email: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AlertChannels {
    pub email: bool,
    pub whatsapp: bool,
    pub sms: bool,
    pub gps: bool,
}

#[derive(Clone, Debug, Default)]
pub struct NewPet {
    pub name: String,
    pub species: String,
    pub sex: String,
    pub color: String,
    pub breed: Option<String>,
    pub age_years: Option<i32>,
    pub age_months: Option<i32>,
    pub sterilization_code: Option<String>,
    pub whatsapp_number: Option<String>,
    pub alerts: AlertChannels,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: Option<f64>,
}

#[derive(Clone, Debug)]
pub struct LocationReport {
    pub position: Coordinates,
    pub found_at: Option<String>,
}

#[derive(Clone, Debug)]
pub struct FinderContact {
    pub name: String,
    pub phone: String,
    pub message: Option<String>,
    pub position: Option<Coordinates>,
    pub found_at: Option<String>,
}

/// Handle over the relational store. Cheap to clone; every clone shares the
/// same connection pool.
#[derive(Clone, Debug)]
pub struct PetStore {
    db: DatabaseConnection,
    email_policy: OwnerEmailPolicy,
}

impl PetStore {
    pub fn new(db: DatabaseConnection, email_policy: OwnerEmailPolicy) -> Self {
        Self { db, email_policy }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn email_policy(&self) -> OwnerEmailPolicy {
        self.email_policy
    }

    pub async fn create_owner(&self, fields: NewOwner) -> Result<owner::Model, StoreError> {
        let txn = self.db.begin().await?;

        if self.email_policy == OwnerEmailPolicy::Strict {
            let existing = Owner::find()
                .filter(owner::Column::Email.eq(fields.email.as_str()))
                .one(&txn)
                .await?;
            if existing.is_some() {
                return Err(StoreError::ConstraintViolation(format!(
                    "owner e-mail '{}' already registered",
                    fields.email
                )));
            }
        }

        let created = owner::ActiveModel {
            email: Set(fields.email),
            name: Set(fields.name),
            phone: Set(fields.phone),
            city: Set(fields.city),
            created_at: Set(chrono::Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(created)
    }

    /// Lowest-id owner with this e-mail; under the lenient policy there may be several.
    pub async fn find_owner_by_email(
        &self,
        email: &str,
    ) -> Result<Option<owner::Model>, StoreError> {
        Ok(Owner::find()
            .filter(owner::Column::Email.eq(email))
            .order_by_asc(owner::Column::Id)
            .one(&self.db)
            .await?)
    }

    pub async fn find_owner(&self, owner_id: i32) -> Result<Option<owner::Model>, StoreError> {
        Ok(Owner::find_by_id(owner_id).one(&self.db).await?)
    }

    /// Returns the owner and whether it was created by this call.
    pub async fn find_or_create_owner(
        &self,
        fields: NewOwner,
    ) -> Result<(owner::Model, bool), StoreError> {
        if let Some(existing) = self.find_owner_by_email(&fields.email).await? {
            return Ok((existing, false));
        }
        match self.create_owner(fields.clone()).await {
            Ok(created) => Ok((created, true)),
            // Lost a race with a concurrent registration for the same address.
            Err(StoreError::ConstraintViolation(_)) => self
                .find_owner_by_email(&fields.email)
                .await?
                .map(|owner| (owner, false))
                .ok_or_else(|| StoreError::NotFound(format!("owner '{}'", fields.email))),
            Err(e) => Err(e),
        }
    }

    /// Inserts an active pet under `code`. A code already held by an active pet
    /// yields `ConstraintViolation`; nothing is overwritten.
    pub async fn create_pet(
        &self,
        owner_id: i32,
        fields: &NewPet,
        code: &str,
    ) -> Result<pet::Model, StoreError> {
        let now = chrono::Utc::now().naive_utc();
        let new_pet = pet::ActiveModel {
            user_id: Set(owner_id),
            name: Set(fields.name.clone()),
            species: Set(fields.species.clone()),
            sex: Set(fields.sex.clone()),
            color: Set(fields.color.clone()),
            age_years: Set(fields.age_years),
            age_months: Set(fields.age_months),
            breed: Set(fields.breed.clone()),
            sterilization_code: Set(fields.sterilization_code.clone()),
            pet_code: Set(code.to_string()),
            is_active: Set(true),
            gps_alerts: Set(fields.alerts.gps),
            alert_email: Set(fields.alerts.email),
            alert_whatsapp: Set(fields.alerts.whatsapp),
            alert_sms: Set(fields.alerts.sms),
            whatsapp_number: Set(fields.whatsapp_number.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        Ok(new_pet.insert(&self.db).await?)
    }

    /// Active pet holding `code`. Inactive pets are reported as absent.
    pub async fn find_pet_by_code(&self, code: &str) -> Result<Option<pet::Model>, StoreError> {
        Ok(Pet::find()
            .filter(pet::Column::PetCode.eq(code))
            .filter(pet::Column::IsActive.eq(true))
            .one(&self.db)
            .await?)
    }

    pub async fn list_pets_by_owner(&self, owner_id: i32) -> Result<Vec<pet::Model>, StoreError> {
        Ok(Pet::find()
            .filter(pet::Column::UserId.eq(owner_id))
            .filter(pet::Column::IsActive.eq(true))
            .order_by_asc(pet::Column::Id)
            .all(&self.db)
            .await?)
    }

    /// Newest first.
    pub async fn list_active_pets(&self) -> Result<Vec<pet::Model>, StoreError> {
        Ok(Pet::find()
            .filter(pet::Column::IsActive.eq(true))
            .order_by_desc(pet::Column::CreatedAt)
            .order_by_desc(pet::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn deactivate_pet(&self, code: &str) -> Result<pet::Model, StoreError> {
        let found = self
            .find_pet_by_code(code)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("pet {}", code)))?;

        let mut active = found.into_active_model();
        active.is_active = Set(false);
        active.updated_at = Set(chrono::Utc::now().naive_utc());
        Ok(active.update(&self.db).await?)
    }

    async fn require_pet(&self, pet_id: i32) -> Result<(), StoreError> {
        match Pet::find_by_id(pet_id).one(&self.db).await? {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(format!("pet id {}", pet_id))),
        }
    }

    pub async fn record_location(
        &self,
        pet_id: i32,
        report: &LocationReport,
    ) -> Result<pet_location::Model, StoreError> {
        self.require_pet(pet_id).await?;

        let event = pet_location::ActiveModel {
            pet_id: Set(pet_id),
            latitude: Set(report.position.latitude),
            longitude: Set(report.position.longitude),
            accuracy: Set(report.position.accuracy),
            found_timestamp: Set(report.found_at.clone()),
            created_at: Set(chrono::Utc::now().naive_utc()),
            ..Default::default()
        };
        Ok(event.insert(&self.db).await?)
    }

    pub async fn record_notification(
        &self,
        pet_id: i32,
        contact: &FinderContact,
    ) -> Result<pet_notification::Model, StoreError> {
        self.require_pet(pet_id).await?;

        let event = pet_notification::ActiveModel {
            pet_id: Set(pet_id),
            finder_name: Set(contact.name.clone()),
            finder_phone: Set(contact.phone.clone()),
            finder_message: Set(contact.message.clone()),
            location_lat: Set(contact.position.map(|p| p.latitude)),
            location_lng: Set(contact.position.map(|p| p.longitude)),
            location_accuracy: Set(contact.position.and_then(|p| p.accuracy)),
            found_timestamp: Set(contact.found_at.clone()),
            created_at: Set(chrono::Utc::now().naive_utc()),
            ..Default::default()
        };
        Ok(event.insert(&self.db).await?)
    }

    pub async fn locations_for_pet(
        &self,
        pet_id: i32,
    ) -> Result<Vec<pet_location::Model>, StoreError> {
        Ok(PetLocation::find()
            .filter(pet_location::Column::PetId.eq(pet_id))
            .order_by_asc(pet_location::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn notifications_for_pet(
        &self,
        pet_id: i32,
    ) -> Result<Vec<pet_notification::Model>, StoreError> {
        Ok(PetNotification::find()
            .filter(pet_notification::Column::PetId.eq(pet_id))
            .order_by_asc(pet_notification::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn list_breeds(&self, species: &str) -> Result<Vec<breed::Model>, StoreError> {
        Ok(Breed::find()
            .filter(breed::Column::Species.eq(species))
            .filter(breed::Column::IsActive.eq(true))
            .order_by_asc(breed::Column::Name)
            .all(&self.db)
            .await?)
    }

    pub async fn count_active_pets(&self) -> Result<u64, StoreError> {
        Ok(Pet::find()
            .filter(pet::Column::IsActive.eq(true))
            .count(&self.db)
            .await?)
    }

    pub async fn count_owners(&self) -> Result<u64, StoreError> {
        Ok(Owner::find().count(&self.db).await?)
    }
}
