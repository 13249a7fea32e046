mod common;

use common::{luna, FixedGeocoder, Harness, NotifierMode, RecordingNotifier};
use pettag_server::error::AppError;
use pettag_server::intake::{LocationSubmission, OwnerNotificationRequest};
use pettag_server::store::{Coordinates, LocationReport, StoreError};
use pettag_server::notifications::SendgridNotifier;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;

fn location(code: &str) -> LocationSubmission {
    serde_json::from_value(json!({
        "petId": code,
        "latitude": 40.4168,
        "longitude": -3.7038,
        "accuracy": 15.0,
        "timestamp": "2025-04-10T12:00:00Z",
    }))
    .unwrap()
}

fn contact(code: &str) -> OwnerNotificationRequest {
    serde_json::from_value(json!({
        "petId": code,
        "finderName": "Marta",
        "finderPhone": "+34 600 000 000",
        "message": "La encontré en el parque",
        "location": {"lat": 40.4168, "lng": -3.7038, "accuracy": 15.0},
        "timestamp": 1712750400000u64,
    }))
    .unwrap()
}

async fn register_with_email_alerts(harness: &Harness) -> String {
    let mut request = luna();
    request.alert_email = true;
    harness.registry().register(request).await.unwrap().pet.pet_code
}

#[tokio::test]
async fn unknown_code_records_nothing() {
    let harness = Harness::new().await;
    let intake = harness.intake();

    assert!(matches!(
        intake.submit_location(location("PET_NOPE0000")).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        intake.notify_owner(contact("PET_NOPE0000")).await,
        Err(AppError::NotFound(_))
    ));

    let rows = pettag_server::store::schema::count_rows(&harness.test_db.db, "pet_locations")
        .await
        .unwrap();
    assert_eq!(rows, 0);
}

#[tokio::test]
async fn every_submission_appends_a_row() {
    let harness = Harness::new().await;
    let code = harness.registry().register(luna()).await.unwrap().pet.pet_code;
    let intake = harness.intake();

    let (pet, first) = intake.submit_location(location(&code)).await.unwrap();
    let (_, second) = intake.submit_location(location(&code)).await.unwrap();
    assert_ne!(first.id, second.id);
    assert_eq!(first.found_timestamp.as_deref(), Some("2025-04-10T12:00:00Z"));

    let stored = harness.store.locations_for_pet(pet.id).await.unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].latitude, 40.4168);
    assert_eq!(stored[0].accuracy, Some(15.0));
}

#[tokio::test]
async fn store_rejects_events_for_missing_pets() {
    let harness = Harness::new().await;
    let report = LocationReport {
        position: Coordinates {
            latitude: 1.0,
            longitude: 2.0,
            accuracy: None,
        },
        found_at: None,
    };
    assert!(matches!(
        harness.store.record_location(9999, &report).await,
        Err(StoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn inactive_pets_accept_no_reports() {
    let harness = Harness::new().await;
    let registry = harness.registry();
    let code = registry.register(luna()).await.unwrap().pet.pet_code;
    registry.deactivate(&code).await.unwrap();

    assert!(matches!(
        harness.intake().submit_location(location(&code)).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn owner_is_emailed_when_alerts_are_on() {
    let harness = Harness::new().await;
    let code = register_with_email_alerts(&harness).await;
    let notifier = RecordingNotifier::new(NotifierMode::Deliver);
    let intake = harness
        .intake()
        .with_notifier(notifier.clone())
        .with_geocoder(Arc::new(FixedGeocoder("Puerta del Sol, Madrid")));

    let (pet, recorded) = intake.notify_owner(contact(&code)).await.unwrap();
    assert!(recorded.owner_notified);
    assert_eq!(recorded.notification.finder_name, "Marta");
    assert_eq!(recorded.notification.found_timestamp.as_deref(), Some("1712750400000"));
    assert_eq!(recorded.notification.location_lat, Some(40.4168));

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].pet_code, pet.pet_code);
    assert_eq!(sent[0].owner_email, harness.config.default_owner_email);
    assert_eq!(sent[0].address.as_deref(), Some("Puerta del Sol, Madrid"));
}

#[tokio::test]
async fn no_email_without_the_alert_flag() {
    let harness = Harness::new().await;
    let code = harness.registry().register(luna()).await.unwrap().pet.pet_code;
    let notifier = RecordingNotifier::new(NotifierMode::Deliver);
    let intake = harness.intake().with_notifier(notifier.clone());

    let (_, recorded) = intake.notify_owner(contact(&code)).await.unwrap();
    assert!(!recorded.owner_notified);
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn logged_email_is_not_reported_as_notified() {
    let harness = Harness::new().await;
    let code = register_with_email_alerts(&harness).await;
    let intake = harness
        .intake()
        .with_notifier(Arc::new(SendgridNotifier::new(None, "alerts@pettag.local")));

    let (pet, recorded) = intake.notify_owner(contact(&code)).await.unwrap();
    assert!(!recorded.owner_notified);
    assert_eq!(harness.store.notifications_for_pet(pet.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn failed_email_keeps_the_notification() {
    let harness = Harness::new().await;
    let code = register_with_email_alerts(&harness).await;
    let intake = harness
        .intake()
        .with_notifier(RecordingNotifier::new(NotifierMode::Fail));

    let (pet, recorded) = intake.notify_owner(contact(&code)).await.unwrap();
    assert!(!recorded.owner_notified);

    let stored = harness.store.notifications_for_pet(pet.id).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, recorded.notification.id);
}

#[tokio::test]
async fn hung_mailer_is_cut_off() {
    let harness = Harness::new().await;
    let code = register_with_email_alerts(&harness).await;
    let intake = harness
        .intake()
        .with_notifier(RecordingNotifier::new(NotifierMode::Hang));

    let started = Instant::now();
    let (pet, recorded) = intake.notify_owner(contact(&code)).await.unwrap();
    assert!(started.elapsed() < std::time::Duration::from_secs(10));
    assert!(!recorded.owner_notified);
    assert_eq!(harness.store.notifications_for_pet(pet.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn reports_list_both_event_kinds() {
    let harness = Harness::new().await;
    let code = harness.registry().register(luna()).await.unwrap().pet.pet_code;
    let intake = harness.intake();

    intake.submit_location(location(&code)).await.unwrap();
    intake.notify_owner(contact(&code)).await.unwrap();
    intake.submit_location(location(&code)).await.unwrap();

    let (_, locations, notifications) = intake.reports(&code).await.unwrap();
    assert_eq!(locations.len(), 2);
    assert_eq!(notifications.len(), 1);
    assert!(locations[0].id < locations[1].id);
}
