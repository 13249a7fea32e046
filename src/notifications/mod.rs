pub mod email;
pub mod templates;

pub use email::{Delivery, FoundNotice, OwnerNotifier, SendgridNotifier};
pub use templates::NotificationTemplates;
