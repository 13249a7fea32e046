use crate::error::CollaboratorError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const USER_AGENT: &str = concat!("pettag-server/", env!("CARGO_PKG_VERSION"));

/// Best guess at a human-readable address for a coordinate pair.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn address_for(&self, latitude: f64, longitude: f64)
        -> Result<Option<String>, CollaboratorError>;
}

pub fn valid_coordinates(latitude: f64, longitude: f64) -> bool {
    latitude.is_finite()
        && longitude.is_finite()
        && (-90.0..=90.0).contains(&latitude)
        && (-180.0..=180.0).contains(&longitude)
}

#[derive(Deserialize)]
struct NominatimReply {
    display_name: Option<String>,
}

/// Client for a Nominatim-compatible `/reverse` endpoint.
#[derive(Clone)]
pub struct NominatimGeocoder {
    client: Client,
    endpoint: String,
}

impl NominatimGeocoder {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, CollaboratorError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| CollaboratorError::Http {
                collaborator: "geocoder",
                message: e.to_string(),
            })?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    async fn address_for(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<String>, CollaboratorError> {
        if !valid_coordinates(latitude, longitude) {
            return Ok(None);
        }

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("format", "json".to_string()),
                ("zoom", "18".to_string()),
                ("addressdetails", "1".to_string()),
            ])
            .header(reqwest::header::ACCEPT_LANGUAGE, "es,en")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CollaboratorError::Timeout("geocoder")
                } else {
                    CollaboratorError::Http {
                        collaborator: "geocoder",
                        message: e.to_string(),
                    }
                }
            })?;

        if !response.status().is_success() {
            return Err(CollaboratorError::Rejected {
                collaborator: "geocoder",
                message: response.status().to_string(),
            });
        }

        let reply: NominatimReply = response.json().await.map_err(|e| CollaboratorError::Http {
            collaborator: "geocoder",
            message: e.to_string(),
        })?;
        Ok(reply.display_name)
    }
}
