pub use super::breed::Entity as Breed;
pub use super::owner::Entity as Owner;
pub use super::pet::Entity as Pet;
pub use super::pet_location::Entity as PetLocation;
pub use super::pet_notification::Entity as PetNotification;
