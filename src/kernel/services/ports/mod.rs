//! Service ports: traits + data contracts.

pub mod config;
pub mod gateway;
pub mod settings;

pub use config::SessionConfig;
pub use gateway::{GatewayError, Result as GatewayResult, SharedGateway, StorageGateway};
pub use settings::Settings;
