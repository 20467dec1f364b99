//! Batch Validation Module
//!
//! This module validates pin-operation batches before anything touches a pin.
//! Performs alias lookup, operation allow-list checks and value validation,
//! and builds the ordered operation queue.

mod validator;


pub use validator::{validate, Validator};
