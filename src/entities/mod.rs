pub mod breed;
pub mod owner;
pub mod pet;
pub mod pet_location;
pub mod pet_notification;

pub use breed::Entity as Breed;
pub use owner::Entity as Owner;
pub use pet::Entity as Pet;
pub use pet_location::Entity as PetLocation;
pub use pet_notification::Entity as PetNotification;

pub mod prelude;
