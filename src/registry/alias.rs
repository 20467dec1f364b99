//! Alias Registry Module
//!
//! Maps human-readable alias names to physical pins, the operations each pin
//! permits, and an optional value predicate for writes.
//!
//! The registry is built once at start-up (from configuration or by hand) and
//! shared read-only between request handlers.

use super::rules::{ValuePredicate, ValueRule};
use crate::{config::AliasConfig, OperationKind};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Highest BCM GPIO number on a Raspberry Pi header
pub const MAX_PIN: u8 = 53;

/// Errors raised while building a registry from configuration
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error(
        "alias `{alias}` allows the deprecated `write` operation; use `digitalWrite` or `pwmWrite`"
    )]
    DeprecatedOperation { alias: String },
    #[error("alias `{alias}` allows unknown operation `{operation}`")]
    UnknownOperation { alias: String, operation: String },
    #[error("alias `{alias}` uses pin {pin}, expected 0..={max}", max = MAX_PIN)]
    PinOutOfRange { alias: String, pin: u32 },
    #[error("alias `{alias}` has an empty value range ({min} > {max})")]
    InvalidRange { alias: String, min: f64, max: f64 },
}

/// Registered pin record
#[derive(Clone)]
pub struct AliasEntry {
    pin: u8,
    allowed_operations: HashSet<OperationKind>,
    validate: Option<Arc<dyn ValuePredicate>>,
}

impl AliasEntry {
    /// Creates an entry without a value validator
    ///
    /// Write operations on such an alias always fail value validation.
    pub fn new(pin: u8, allowed_operations: impl IntoIterator<Item = OperationKind>) -> Self {
        Self {
            pin,
            allowed_operations: allowed_operations.into_iter().collect(),
            validate: None,
        }
    }

    /// Attaches the predicate used to check written values
    pub fn with_validator(mut self, predicate: impl ValuePredicate + 'static) -> Self {
        self.validate = Some(Arc::new(predicate));
        self
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }

    pub fn allows(&self, operation: OperationKind) -> bool {
        self.allowed_operations.contains(&operation)
    }

    pub fn validator(&self) -> Option<&dyn ValuePredicate> {
        self.validate.as_deref()
    }
}

impl fmt::Debug for AliasEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut operations: Vec<_> =
            self.allowed_operations.iter().map(OperationKind::as_str).collect();
        operations.sort_unstable();
        f.debug_struct("AliasEntry")
            .field("pin", &self.pin)
            .field("allowed_operations", &operations)
            .field("validate", &self.validate.is_some())
            .finish()
    }
}

/// Immutable mapping from alias name to [`AliasEntry`]
#[derive(Debug, Clone, Default)]
pub struct AliasRegistry {
    aliases: HashMap<String, AliasEntry>,
}

impl AliasRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) an alias while the registry is being assembled
    pub fn with_alias(mut self, name: impl Into<String>, entry: AliasEntry) -> Self {
        self.aliases.insert(name.into(), entry);
        self
    }

    /// Builds the registry from the `[aliases]` configuration table
    ///
    /// # Returns
    /// * `Ok(AliasRegistry)` when every alias is well formed
    /// * `Err(RegistryError)` for the first offending alias (in name order)
    pub fn from_config(aliases: &BTreeMap<String, AliasConfig>) -> Result<Self, RegistryError> {
        let mut registry = Self::new();

        for (name, alias) in aliases {
            let pin = u8::try_from(alias.pin)
                .ok()
                .filter(|pin| *pin <= MAX_PIN)
                .ok_or_else(|| RegistryError::PinOutOfRange {
                    alias: name.clone(),
                    pin: alias.pin,
                })?;

            let mut operations = Vec::with_capacity(alias.allowed_operations.len());
            for operation in &alias.allowed_operations {
                if operation == OperationKind::LEGACY_WRITE {
                    return Err(RegistryError::DeprecatedOperation { alias: name.clone() });
                }
                let kind = OperationKind::parse(operation).ok_or_else(|| {
                    RegistryError::UnknownOperation {
                        alias: name.clone(),
                        operation: operation.clone(),
                    }
                })?;
                operations.push(kind);
            }

            let mut entry = AliasEntry::new(pin, operations);
            if let Some(rule) = &alias.validate {
                if let ValueRule::Range { min, max } = rule {
                    if min > max {
                        return Err(RegistryError::InvalidRange {
                            alias: name.clone(),
                            min: *min,
                            max: *max,
                        });
                    }
                }
                entry = entry.with_validator(rule.clone());
            }

            registry = registry.with_alias(name.clone(), entry);
        }

        Ok(registry)
    }

    pub fn get(&self, alias: &str) -> Option<&AliasEntry> {
        self.aliases.get(alias)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Alias names in sorted order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.aliases.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
