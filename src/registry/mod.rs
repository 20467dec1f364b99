//! Alias Registry Module
//!
//! This module provides the static registry of pin aliases that requests are
//! validated against:
//! - AliasRegistry / AliasEntry: alias name -> pin, allowed operations, validator
//! - ValueRule / ValuePredicate: checks applied to written values

mod alias;
mod rules;

pub use alias::{AliasEntry, AliasRegistry, RegistryError, MAX_PIN};
pub use rules::{ValuePredicate, ValueRule, MAX_DUTY_CYCLE};
