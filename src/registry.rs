//! Registration and lookup of pets by public code.
//!
//! A pet is `Active` from the moment its row is written until it is
//! deactivated; only active pets resolve.

use crate::code::{is_well_formed, CodeSource, RandomCodes};
use crate::config::AppConfig;
use crate::entities::{owner, pet};
use crate::error::AppError;
use crate::qr::QrRenderer;
use crate::store::{AlertChannels, NewOwner, NewPet, PetStore, StoreError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Default, Deserialize)]
pub struct OwnerDetails {
    pub email: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RegistrationRequest {
    pub name: Option<String>,
    pub species: Option<String>,
    pub sex: Option<String>,
    pub color: Option<String>,
    pub breed: Option<String>,
    pub age_years: Option<FormNumber>,
    pub age_months: Option<FormNumber>,
    pub sterilization_code: Option<String>,
    pub whatsapp_number: Option<String>,
    #[serde(default)]
    pub gps_alerts: bool,
    #[serde(default)]
    pub alert_email: bool,
    #[serde(default)]
    pub alert_whatsapp: bool,
    #[serde(default)]
    pub alert_sms: bool,
    pub owner: Option<OwnerDetails>,
}

/// A whole number sent either as JSON or as the text of a form input.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FormNumber {
    Number(i64),
    Text(String),
    Other(serde_json::Value),
}

impl FormNumber {
    /// `Ok(None)` for empty text, `Err` for anything that is not a whole number.
    fn read(&self) -> Result<Option<i32>, ()> {
        match self {
            FormNumber::Number(n) => i32::try_from(*n).map(Some).map_err(|_| ()),
            FormNumber::Text(text) if text.trim().is_empty() => Ok(None),
            FormNumber::Text(text) => text.trim().parse().map(Some).map_err(|_| ()),
            FormNumber::Other(_) => Err(()),
        }
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn bounded_age(
    field: &'static str,
    value: Option<FormNumber>,
    range: std::ops::RangeInclusive<i32>,
    invalid_fields: &mut Vec<&'static str>,
) -> Option<i32> {
    match value.as_ref().map(FormNumber::read) {
        None | Some(Ok(None)) => None,
        Some(Ok(Some(n))) if range.contains(&n) => Some(n),
        Some(_) => {
            invalid_fields.push(field);
            None
        }
    }
}

impl RegistrationRequest {
    /// Checks mandatory and range-limited fields. Runs before any code is drawn
    /// or the store is touched.
    pub fn validate(self) -> Result<(NewPet, Option<NewOwner>), AppError> {
        let mut missing_fields = Vec::new();
        let mut invalid_fields = Vec::new();

        let name = present(self.name);
        let species = present(self.species);
        let sex = present(self.sex);
        let color = present(self.color);
        for (field, value) in [
            ("name", &name),
            ("species", &species),
            ("sex", &sex),
            ("color", &color),
        ] {
            if value.is_none() {
                missing_fields.push(field);
            }
        }

        let age_years = bounded_age("age_years", self.age_years, 0..=30, &mut invalid_fields);
        let age_months = bounded_age("age_months", self.age_months, 0..=11, &mut invalid_fields);

        let owner = match self.owner {
            Some(details) => match present(details.email) {
                Some(email) if email.contains('@') => Some(NewOwner {
                    email: email.trim().to_string(),
                    name: present(details.name),
                    phone: present(details.phone),
                    city: present(details.city),
                }),
                Some(_) => {
                    invalid_fields.push("owner.email");
                    None
                }
                None => {
                    missing_fields.push("owner.email");
                    None
                }
            },
            None => None,
        };

        match (name, species, sex, color) {
            (Some(name), Some(species), Some(sex), Some(color))
                if invalid_fields.is_empty() && missing_fields.is_empty() =>
            {
                Ok((
                    NewPet {
                        name,
                        species,
                        sex,
                        color,
                        breed: present(self.breed),
                        age_years,
                        age_months,
                        sterilization_code: present(self.sterilization_code),
                        whatsapp_number: present(self.whatsapp_number),
                        alerts: AlertChannels {
                            email: self.alert_email,
                            whatsapp: self.alert_whatsapp,
                            sms: self.alert_sms,
                            gps: self.gps_alerts,
                        },
                    },
                    owner,
                ))
            }
            _ => Err(AppError::Validation {
                missing_fields,
                invalid_fields,
            }),
        }
    }
}

/// `"2 años y 3 meses"`, or `"No especificada"` without an age.
pub fn age_text(years: Option<i32>, months: Option<i32>) -> String {
    let years = years.filter(|y| *y > 0);
    let months = months.filter(|m| *m > 0);
    match (years, months) {
        (Some(y), Some(m)) => format!("{} años y {} meses", y, m),
        (Some(y), None) => format!("{} años", y),
        (None, Some(m)) => format!("{} meses", m),
        (None, None) => "No especificada".to_string(),
    }
}

/// `"2a 3m"`, or `"-"` without an age.
pub fn age_text_short(years: Option<i32>, months: Option<i32>) -> String {
    let years = years.filter(|y| *y > 0);
    let months = months.filter(|m| *m > 0);
    match (years, months) {
        (Some(y), Some(m)) => format!("{}a {}m", y, m),
        (Some(y), None) => format!("{}a", y),
        (None, Some(m)) => format!("{}m", m),
        (None, None) => "-".to_string(),
    }
}

/// What a finder sees after scanning a tag.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PetProfile {
    pub pet_id: String,
    pub name: String,
    pub species: String,
    pub sex: String,
    pub color: String,
    pub breed: Option<String>,
    pub age_years: Option<i32>,
    pub age_months: Option<i32>,
    pub age_text: String,
    pub sterilization_code: Option<String>,
    pub whatsapp_number: Option<String>,
    pub gps_alerts: bool,
    pub registered_at: chrono::NaiveDateTime,
}

impl From<pet::Model> for PetProfile {
    fn from(model: pet::Model) -> Self {
        Self {
            age_text: age_text(model.age_years, model.age_months),
            pet_id: model.pet_code,
            name: model.name,
            species: model.species,
            sex: model.sex,
            color: model.color,
            breed: model.breed,
            age_years: model.age_years,
            age_months: model.age_months,
            sterilization_code: model.sterilization_code,
            whatsapp_number: model.whatsapp_number,
            gps_alerts: model.gps_alerts,
            registered_at: model.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminPetRow {
    pub id: i32,
    pub owner_id: i32,
    pub pet_code: String,
    pub name: String,
    pub species: String,
    pub sex: String,
    pub color: String,
    pub breed: Option<String>,
    pub age: String,
    pub sterilization_code: Option<String>,
    pub whatsapp_number: Option<String>,
    pub created_at: chrono::NaiveDateTime,
}

impl From<pet::Model> for AdminPetRow {
    fn from(model: pet::Model) -> Self {
        Self {
            age: age_text_short(model.age_years, model.age_months),
            id: model.id,
            owner_id: model.user_id,
            pet_code: model.pet_code,
            name: model.name,
            species: model.species,
            sex: model.sex,
            color: model.color,
            breed: model.breed,
            sterilization_code: model.sterilization_code,
            whatsapp_number: model.whatsapp_number,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub pet: pet::Model,
    pub pet_url: String,
    /// `None` when the QR renderer failed; the pet is registered regardless.
    pub qr_code: Option<String>,
}

pub struct Registry {
    store: PetStore,
    codes: Arc<dyn CodeSource>,
    qr: Arc<dyn QrRenderer>,
    config: Arc<AppConfig>,
}

impl Registry {
    pub fn new(store: PetStore, qr: Arc<dyn QrRenderer>, config: Arc<AppConfig>) -> Self {
        Self {
            store,
            codes: Arc::new(RandomCodes),
            qr,
            config,
        }
    }

    pub fn with_code_source(mut self, codes: Arc<dyn CodeSource>) -> Self {
        self.codes = codes;
        self
    }

    pub fn store(&self) -> &PetStore {
        &self.store
    }

    pub async fn register(&self, request: RegistrationRequest) -> Result<Registration, AppError> {
        let (fields, owner) = request.validate()?;

        let owner = self.resolve_owner(owner).await?;
        let pet = self.insert_with_fresh_code(owner.id, &fields).await?;

        let pet_url = self.config.pet_url(&pet.pet_code);
        let qr_code = match self.qr.render(&pet_url) {
            Ok(image) => Some(image),
            Err(e) => {
                warn!(pet_code = %pet.pet_code, error = %e, "QR rendering unavailable");
                crate::metrics::increment_collaborator_failures(e.collaborator());
                None
            }
        };

        info!(pet_id = pet.id, pet_code = %pet.pet_code, owner_id = owner.id, "pet registered");
        crate::metrics::increment_pets_registered();

        Ok(Registration {
            pet,
            pet_url,
            qr_code,
        })
    }

    async fn resolve_owner(&self, details: Option<NewOwner>) -> Result<owner::Model, AppError> {
        let details = details.unwrap_or_else(|| NewOwner {
            email: self.config.default_owner_email.clone(),
            ..Default::default()
        });
        let (owner, created) = self.store.find_or_create_owner(details).await?;
        if created {
            info!(owner_id = owner.id, "owner created");
            crate::metrics::increment_owners();
        }
        Ok(owner)
    }

    /// The generator never checks the store, so a drawn code may already be
    /// held by an active pet. The unique index rejects that insert and a new
    /// code is drawn, up to `registration_attempts` times.
    async fn insert_with_fresh_code(
        &self,
        owner_id: i32,
        fields: &NewPet,
    ) -> Result<pet::Model, AppError> {
        let attempts = self.config.registration_attempts.max(1);
        for attempt in 1..=attempts {
            let code = self.codes.next_code();
            match self.store.create_pet(owner_id, fields, &code).await {
                Ok(pet) => return Ok(pet),
                Err(StoreError::ConstraintViolation(detail)) => {
                    warn!(attempt, pet_code = %code, detail = %detail, "public code collision");
                    crate::metrics::increment_code_collisions();
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(AppError::RegistrationFailed { attempts })
    }

    pub async fn lookup(&self, code: &str) -> Result<PetProfile, AppError> {
        Ok(self.resolve(code).await?.into())
    }

    /// Active pet behind `code`, or `NotFound`.
    pub async fn resolve(&self, code: &str) -> Result<pet::Model, AppError> {
        if !is_well_formed(code) {
            return Err(AppError::NotFound(format!("pet {}", code)));
        }
        self.store
            .find_pet_by_code(code)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("pet {}", code)))
    }

    pub async fn deactivate(&self, code: &str) -> Result<pet::Model, AppError> {
        let pet = self.store.deactivate_pet(code).await?;
        info!(pet_id = pet.id, pet_code = %pet.pet_code, "pet deactivated");
        crate::metrics::decrement_active_pets();
        Ok(pet)
    }

    pub async fn active_pets(&self) -> Result<Vec<AdminPetRow>, AppError> {
        let pets = self.store.list_active_pets().await?;
        Ok(pets.into_iter().map(AdminPetRow::from).collect())
    }

    pub async fn pets_of_owner(&self, owner_id: i32) -> Result<Vec<AdminPetRow>, AppError> {
        let pets = self.store.list_pets_by_owner(owner_id).await?;
        Ok(pets.into_iter().map(AdminPetRow::from).collect())
    }
}
