//! Value Rules Module
//!
//! Predicates that decide whether a value may be written to an aliased pin.
//! Aliases declared in configuration pick one of the built-in [`ValueRule`]s;
//! code that builds a registry by hand can plug in any [`ValuePredicate`].

use serde::Deserialize;
use serde_json::Value;

/// Largest duty cycle accepted by `pwmWrite` (8-bit PWM range)
pub const MAX_DUTY_CYCLE: u64 = 255;

/// A check applied to the value of a write operation
pub trait ValuePredicate: Send + Sync {
    /// Returns `true` if `value` may be written
    fn accepts(&self, value: &Value) -> bool;
}

impl<F> ValuePredicate for F
where
    F: Fn(&Value) -> bool + Send + Sync,
{
    fn accepts(&self, value: &Value) -> bool {
        self(value)
    }
}

/// Built-in value rules available from configuration
///
/// # Example TOML
/// ```toml
/// validate = { kind = "dutyCycle" }
/// validate = { kind = "range", min = 0, max = 100 }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ValueRule {
    /// Every value is accepted
    Any,
    /// `0`, `1`, `true` or `false`
    Digital,
    /// Integer duty cycle in `0..=255`
    DutyCycle,
    /// Any number within `[min, max]`
    Range { min: f64, max: f64 },
}

impl ValuePredicate for ValueRule {
    fn accepts(&self, value: &Value) -> bool {
        match self {
            ValueRule::Any => true,
            ValueRule::Digital => match value {
                Value::Bool(_) => true,
                other => matches!(other.as_u64(), Some(0 | 1)),
            },
            ValueRule::DutyCycle => value.as_u64().is_some_and(|duty| duty <= MAX_DUTY_CYCLE),
            ValueRule::Range { min, max } => value
                .as_f64()
                .is_some_and(|number| number >= *min && number <= *max),
        }
    }
}
