use crate::store::PetStore;

pub async fn init_metrics(store: &PetStore) {
    let pet_count = store.count_active_pets().await.unwrap_or(0);
    metrics::gauge!("pettag_pets_active").set(pet_count as f64);

    let owner_count = store.count_owners().await.unwrap_or(0);
    metrics::gauge!("pettag_owners_total").set(owner_count as f64);

    tracing::info!(
        "Initialized metrics: ActivePets={}, Owners={}",
        pet_count, owner_count
    );
}

pub fn increment_pets_registered() {
    metrics::counter!("pettag_pets_registered_total").increment(1);
    metrics::gauge!("pettag_pets_active").increment(1.0);
}

pub fn decrement_active_pets() {
    metrics::gauge!("pettag_pets_active").decrement(1.0);
}

pub fn increment_owners() {
    metrics::gauge!("pettag_owners_total").increment(1.0);
}

pub fn increment_code_collisions() {
    metrics::counter!("pettag_code_collisions_total").increment(1);
}

pub fn increment_locations_recorded() {
    metrics::counter!("pettag_locations_recorded_total").increment(1);
}

pub fn increment_notifications_recorded() {
    metrics::counter!("pettag_notifications_recorded_total").increment(1);
}

pub fn record_owner_email(outcome: &str) {
    metrics::counter!("pettag_owner_emails_total", "outcome" => outcome.to_string()).increment(1);
}

pub fn increment_collaborator_failures(collaborator: &str) {
    metrics::counter!("pettag_collaborator_failures_total", "collaborator" => collaborator.to_string())
        .increment(1);
}
