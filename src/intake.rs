//! Finder submissions: location reports and contact requests against a pet's
//! public code. Both append a new event row per call.

use crate::entities::{pet, pet_location, pet_notification};
use crate::error::{AppError, CollaboratorError};
use crate::geocoding::{valid_coordinates, ReverseGeocoder};
use crate::notifications::{Delivery, FoundNotice, OwnerNotifier};
use crate::store::{Coordinates, FinderContact, LocationReport, PetStore};
use futures::future;
use serde::Deserialize;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSubmission {
    pub pet_id: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub accuracy: Option<f64>,
    pub timestamp: Option<Value>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SubmittedPosition {
    pub lat: f64,
    pub lng: f64,
    pub accuracy: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerNotificationRequest {
    pub pet_id: Option<String>,
    pub finder_name: Option<String>,
    pub finder_phone: Option<String>,
    pub message: Option<String>,
    pub location: Option<SubmittedPosition>,
    pub timestamp: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct RecordedNotification {
    pub notification: pet_notification::Model,
    pub owner_notified: bool,
}

/// Browsers send either an ISO string or epoch milliseconds; keep it verbatim.
fn found_at(timestamp: Option<Value>) -> Option<String> {
    match timestamp? {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl LocationSubmission {
    pub fn validate(self) -> Result<(String, LocationReport), AppError> {
        let mut missing_fields = Vec::new();
        let mut invalid_fields = Vec::new();

        let code = present(self.pet_id);
        if code.is_none() {
            missing_fields.push("petId");
        }
        if self.latitude.is_none() {
            missing_fields.push("latitude");
        }
        if self.longitude.is_none() {
            missing_fields.push("longitude");
        }
        if let (Some(lat), Some(lng)) = (self.latitude, self.longitude) {
            if !valid_coordinates(lat, 0.0) {
                invalid_fields.push("latitude");
            }
            if !valid_coordinates(0.0, lng) {
                invalid_fields.push("longitude");
            }
        }
        if matches!(self.accuracy, Some(a) if a < 0.0) {
            invalid_fields.push("accuracy");
        }

        match (code, self.latitude, self.longitude) {
            (Some(code), Some(latitude), Some(longitude)) if invalid_fields.is_empty() => Ok((
                code,
                LocationReport {
                    position: Coordinates {
                        latitude,
                        longitude,
                        accuracy: self.accuracy,
                    },
                    found_at: found_at(self.timestamp),
                },
            )),
            _ => Err(AppError::Validation {
                missing_fields,
                invalid_fields,
            }),
        }
    }
}

impl OwnerNotificationRequest {
    pub fn validate(self) -> Result<(String, FinderContact), AppError> {
        let mut missing_fields = Vec::new();
        let mut invalid_fields = Vec::new();

        let code = present(self.pet_id);
        let name = present(self.finder_name);
        let phone = present(self.finder_phone);
        for (field, value) in [
            ("petId", &code),
            ("finderName", &name),
            ("finderPhone", &phone),
        ] {
            if value.is_none() {
                missing_fields.push(field);
            }
        }
        if let Some(position) = self.location {
            if !valid_coordinates(position.lat, position.lng) {
                invalid_fields.push("location");
            }
        }

        match (code, name, phone) {
            (Some(code), Some(name), Some(phone)) if invalid_fields.is_empty() => Ok((
                code,
                FinderContact {
                    name,
                    phone,
                    message: present(self.message),
                    position: self.location.map(|p| Coordinates {
                        latitude: p.lat,
                        longitude: p.lng,
                        accuracy: p.accuracy,
                    }),
                    found_at: found_at(self.timestamp),
                },
            )),
            _ => Err(AppError::Validation {
                missing_fields,
                invalid_fields,
            }),
        }
    }
}

async fn bounded<T, F>(
    collaborator: &'static str,
    limit: Duration,
    call: F,
) -> Result<T, CollaboratorError>
where
    F: Future<Output = Result<T, CollaboratorError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(CollaboratorError::Timeout(collaborator)),
    }
}

pub struct Intake {
    store: PetStore,
    notifier: Option<Arc<dyn OwnerNotifier>>,
    geocoder: Option<Arc<dyn ReverseGeocoder>>,
    timeout: Duration,
}

impl Intake {
    pub fn new(store: PetStore, timeout: Duration) -> Self {
        Self {
            store,
            notifier: None,
            geocoder: None,
            timeout,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn OwnerNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_geocoder(mut self, geocoder: Arc<dyn ReverseGeocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    async fn resolve(&self, code: &str) -> Result<pet::Model, AppError> {
        self.store
            .find_pet_by_code(code)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("pet {}", code)))
    }

    pub async fn submit_location(
        &self,
        submission: LocationSubmission,
    ) -> Result<(pet::Model, pet_location::Model), AppError> {
        let (code, report) = submission.validate()?;
        let pet = self.resolve(&code).await?;
        let location = self.store.record_location(pet.id, &report).await?;

        info!(pet_id = pet.id, location_id = location.id, "finder location recorded");
        crate::metrics::increment_locations_recorded();
        Ok((pet, location))
    }

    /// Stores the finder's contact and, for pets with e-mail alerts, tells the
    /// owner. The event is committed before any collaborator is called; their
    /// failures only clear `owner_notified`.
    pub async fn notify_owner(
        &self,
        request: OwnerNotificationRequest,
    ) -> Result<(pet::Model, RecordedNotification), AppError> {
        let (code, contact) = request.validate()?;
        let pet = self.resolve(&code).await?;
        let notification = self.store.record_notification(pet.id, &contact).await?;

        info!(pet_id = pet.id, notification_id = notification.id, "finder contact recorded");
        crate::metrics::increment_notifications_recorded();

        let owner_notified = if pet.alert_email {
            self.email_owner(&pet, &contact).await
        } else {
            false
        };

        Ok((
            pet,
            RecordedNotification {
                notification,
                owner_notified,
            },
        ))
    }

    async fn email_owner(&self, pet: &pet::Model, contact: &FinderContact) -> bool {
        let Some(notifier) = &self.notifier else {
            crate::metrics::record_owner_email("disabled");
            return false;
        };

        let address = async {
            let (Some(geocoder), Some(position)) = (&self.geocoder, contact.position) else {
                return None;
            };
            let lookup = geocoder.address_for(position.latitude, position.longitude);
            match bounded("geocoder", self.timeout, lookup).await {
                Ok(address) => address,
                Err(e) => {
                    warn!(pet_id = pet.id, error = %e, "address unavailable");
                    crate::metrics::increment_collaborator_failures(e.collaborator());
                    None
                }
            }
        };
        let (owner, address) = future::join(self.store.find_owner(pet.user_id), address).await;

        let owner = match owner {
            Ok(Some(owner)) => owner,
            Ok(None) => {
                warn!(pet_id = pet.id, owner_id = pet.user_id, "owner missing, e-mail skipped");
                crate::metrics::record_owner_email("skipped");
                return false;
            }
            Err(e) => {
                warn!(pet_id = pet.id, error = %e, "owner lookup failed, e-mail skipped");
                crate::metrics::record_owner_email("skipped");
                return false;
            }
        };

        let notice = FoundNotice {
            owner_email: owner.email,
            owner_name: owner.name,
            pet_code: pet.pet_code.clone(),
            pet_name: pet.name.clone(),
            pet_species: pet.species.clone(),
            pet_sex: pet.sex.clone(),
            pet_color: pet.color.clone(),
            pet_breed: pet.breed.clone(),
            finder_name: contact.name.clone(),
            finder_phone: contact.phone.clone(),
            finder_message: contact.message.clone(),
            position: contact.position,
            address,
            reported_at: chrono::Utc::now(),
        };

        match bounded("email", self.timeout, notifier.notify_found(&notice)).await {
            Ok(Delivery::Sent) => {
                crate::metrics::record_owner_email("sent");
                true
            }
            Ok(Delivery::Logged) => {
                crate::metrics::record_owner_email("logged");
                false
            }
            Err(e) => {
                warn!(pet_id = pet.id, error = %e, "owner e-mail failed");
                crate::metrics::record_owner_email("failed");
                crate::metrics::increment_collaborator_failures(e.collaborator());
                false
            }
        }
    }

    pub async fn reports(
        &self,
        code: &str,
    ) -> Result<(pet::Model, Vec<pet_location::Model>, Vec<pet_notification::Model>), AppError> {
        let pet = self.resolve(code).await?;
        let locations = self.store.locations_for_pet(pet.id).await?;
        let notifications = self.store.notifications_for_pet(pet.id).await?;
        Ok((pet, locations, notifications))
    }
}
