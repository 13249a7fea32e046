//! Shared fixtures: a migrated SQLite file per test and in-process fakes for
//! the outbound collaborators.

#![allow(dead_code)]

use async_trait::async_trait;
use pettag_server::code::{generate_code, CodeSource};
use pettag_server::config::{AppConfig, OwnerEmailPolicy};
use pettag_server::error::CollaboratorError;
use pettag_server::geocoding::ReverseGeocoder;
use pettag_server::intake::Intake;
use pettag_server::migrator::Migrator;
use pettag_server::notifications::{Delivery, FoundNotice, OwnerNotifier};
use pettag_server::qr::{QrRenderer, SvgQrRenderer};
use pettag_server::registry::{RegistrationRequest, Registry};
use pettag_server::store::PetStore;
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

pub struct TestDb {
    pub db: DatabaseConnection,
    // Dropped last; removes the database file.
    _dir: TempDir,
}

/// Empty database file with no migrations applied.
pub async fn blank_db() -> TestDb {
    let dir = tempfile::tempdir().expect("temp dir");
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("pets.db").display());
    let db = Database::connect(&url).await.expect("connect sqlite");
    TestDb { db, _dir: dir }
}

pub async fn migrated_db() -> TestDb {
    let test_db = blank_db().await;
    Migrator::up(&test_db.db, None).await.expect("migrations apply");
    test_db
}

pub fn test_config() -> AppConfig {
    AppConfig {
        public_base_url: "https://pets.example.org".to_string(),
        admin_token: Some("s3cret".to_string()),
        collaborator_timeout: Duration::from_millis(200),
        ..AppConfig::default()
    }
}

pub fn luna() -> RegistrationRequest {
    RegistrationRequest {
        name: Some("Luna".into()),
        species: Some("Gato".into()),
        sex: Some("Hembra".into()),
        color: Some("Negro".into()),
        ..Default::default()
    }
}

/// Hands out the queued codes first, then random ones.
#[derive(Default)]
pub struct ScriptedCodes {
    queue: Mutex<VecDeque<String>>,
}

impl ScriptedCodes {
    pub fn new<I: IntoIterator<Item = &'static str>>(codes: I) -> Self {
        Self {
            queue: Mutex::new(codes.into_iter().map(String::from).collect()),
        }
    }
}

impl CodeSource for ScriptedCodes {
    fn next_code(&self) -> String {
        self.queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(generate_code)
    }
}

/// Always returns the same code.
pub struct StuckCodes(pub &'static str);

impl CodeSource for StuckCodes {
    fn next_code(&self) -> String {
        self.0.to_string()
    }
}

pub struct BrokenQr;

impl QrRenderer for BrokenQr {
    fn render(&self, _url: &str) -> Result<String, CollaboratorError> {
        Err(CollaboratorError::Render("printer on fire".into()))
    }
}

pub enum NotifierMode {
    Deliver,
    Fail,
    Hang,
}

pub struct RecordingNotifier {
    mode: NotifierMode,
    pub sent: Mutex<Vec<FoundNotice>>,
}

impl RecordingNotifier {
    pub fn new(mode: NotifierMode) -> Arc<Self> {
        Arc::new(Self {
            mode,
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn sent(&self) -> Vec<FoundNotice> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl OwnerNotifier for RecordingNotifier {
    async fn notify_found(&self, notice: &FoundNotice) -> Result<Delivery, CollaboratorError> {
        match self.mode {
            NotifierMode::Deliver => {
                self.sent.lock().unwrap().push(notice.clone());
                Ok(Delivery::Sent)
            }
            NotifierMode::Fail => Err(CollaboratorError::Rejected {
                collaborator: "email",
                message: "mailbox full".into(),
            }),
            NotifierMode::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(Delivery::Sent)
            }
        }
    }
}

pub struct FixedGeocoder(pub &'static str);

#[async_trait]
impl ReverseGeocoder for FixedGeocoder {
    async fn address_for(&self, _lat: f64, _lng: f64) -> Result<Option<String>, CollaboratorError> {
        Ok(Some(self.0.to_string()))
    }
}

pub struct Harness {
    pub test_db: TestDb,
    pub store: PetStore,
    pub config: Arc<AppConfig>,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: AppConfig) -> Self {
        let test_db = migrated_db().await;
        let store = PetStore::new(test_db.db.clone(), config.owner_email_policy);
        Self {
            test_db,
            store,
            config: Arc::new(config),
        }
    }

    pub async fn lenient() -> Self {
        Self::with_config(AppConfig {
            owner_email_policy: OwnerEmailPolicy::Lenient,
            ..test_config()
        })
        .await
    }

    pub fn registry(&self) -> Registry {
        Registry::new(
            self.store.clone(),
            Arc::new(SvgQrRenderer::default()),
            self.config.clone(),
        )
    }

    pub fn intake(&self) -> Intake {
        Intake::new(self.store.clone(), self.config.collaborator_timeout)
    }
}
