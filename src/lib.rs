pub mod api;
pub mod code;
pub mod config;
pub mod entities;
pub mod error;
pub mod geocoding;
pub mod intake;
pub mod metrics;
pub mod migrator;
pub mod notifications;
pub mod qr;
pub mod registry;
pub mod store;
pub mod telemetry;

pub use sea_orm;
