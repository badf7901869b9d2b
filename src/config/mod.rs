//! Configuration subsystem.
//!
//! TOML on disk → serde schema → semantic validation. Every section has a
//! working default so the client can run without a config file.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::ClientConfig;
