//! This crate implements a small HTTP gateway for GPIO pin operations.
//! Clients submit batches of operations on named pin aliases; each batch is
//! validated as a whole against a static alias registry and only then applied
//! to the pin driver.

pub mod types; // Request items, queued operations and validation errors.
pub mod api; // HTTP endpoint for pin-operation batches.
pub mod validation; // Batch validation and operation-queue building.
pub mod registry; // Static alias registry and value rules.
pub mod gpio; // Pin drivers and queue execution.
pub mod config; // Defines and loads gateway configuration.

// Re-export commonly used types and configurations for easier access.
pub use types::*;
pub use config::Config;
pub use validation::Validator;
