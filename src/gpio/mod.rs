//! GPIO Execution Module
//!
//! This module applies validated operation queues to pins:
//! - PinDriver: hardware abstraction (digital write, PWM write, read)
//! - SimulatedPins: in-memory driver used when no hardware backend is present
//! - Executor: applies a queue in order and reports per-operation outcomes

mod driver;
mod executor;

pub use driver::{DriverError, PinDriver, SimulatedPins};
pub use executor::{ExecutionError, Executor};

/// Number of addressable pins (BCM 0..=MAX_PIN)
pub const PIN_COUNT: u8 = crate::registry::MAX_PIN + 1;
