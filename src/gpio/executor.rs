//! Queue Executor Module
//!
//! Applies a validated operation queue to a pin driver, in order, and collects
//! one outcome per operation. The executor is only handed queues that passed
//! validation as a whole, and converts the whole queue before the first pin is
//! touched.

use super::driver::{DriverError, PinDriver};
use crate::{OperationKind, OperationOutcome, QueuedOperation};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, error};

/// Errors raised while applying a queue
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExecutionError {
    #[error("value {value} cannot be applied as {operation} on pin {pin}")]
    InvalidValue {
        pin: u8,
        operation: OperationKind,
        value: Value,
    },
    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// Serialises queue execution against a single pin driver
pub struct Executor {
    /// Pin driver, locked for the duration of one queue
    driver: Mutex<Box<dyn PinDriver>>,
}

impl Executor {
    /// Creates an executor that owns `driver`
    pub fn new(driver: impl PinDriver + 'static) -> Self {
        Self {
            driver: Mutex::new(Box::new(driver)),
        }
    }

    /// Apply every operation of `queue`, in order
    ///
    /// Every queued value is converted to a pin command before the driver is
    /// touched, so a value that can't be applied rejects the queue with no pin
    /// changed. The driver stays locked for the whole queue so operations from
    /// two batches never interleave.
    ///
    /// # Returns
    /// * `Ok(outcomes)` with one entry per queued operation
    /// * `Err(ExecutionError)` if a value can't be converted or the driver fails
    pub async fn apply(
        &self,
        queue: &[QueuedOperation],
    ) -> Result<Vec<OperationOutcome>, ExecutionError> {
        // Step 1: Convert the whole queue up front
        let commands = queue
            .iter()
            .map(PinCommand::from_queued)
            .collect::<Result<Vec<_>, _>>()
            .inspect_err(|e| error!("Rejected queue before applying: {}", e))?;

        // Step 2: Apply under a single lock
        let mut driver = self.driver.lock().await;
        let mut outcomes = Vec::with_capacity(commands.len());

        for command in commands {
            let outcome = command.apply(&mut **driver).inspect_err(|e| {
                error!("Failed to apply {:?}: {}", command, e);
            })?;
            debug!(
                "Applied {} on pin {} -> {}",
                outcome.operation, outcome.pin, outcome.value
            );
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }
}

/// Queued operation with its value converted for the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PinCommand {
    Read { pin: u8 },
    DigitalWrite { pin: u8, high: bool },
    PwmWrite { pin: u8, duty_cycle: u8 },
}

impl PinCommand {
    fn from_queued(op: &QueuedOperation) -> Result<Self, ExecutionError> {
        let invalid = || ExecutionError::InvalidValue {
            pin: op.pin,
            operation: op.operation,
            value: op.value.clone().unwrap_or(Value::Null),
        };
        let pin = op.pin;

        match op.operation {
            OperationKind::Read => Ok(Self::Read { pin }),
            OperationKind::DigitalWrite => {
                let high = op.value.as_ref().and_then(digital_level).ok_or_else(invalid)?;
                Ok(Self::DigitalWrite { pin, high })
            }
            OperationKind::PwmWrite => {
                let duty = op.value.as_ref().and_then(duty_cycle).ok_or_else(invalid)?;
                Ok(Self::PwmWrite {
                    pin,
                    duty_cycle: duty,
                })
            }
        }
    }

    fn apply(self, driver: &mut dyn PinDriver) -> Result<OperationOutcome, ExecutionError> {
        let (pin, operation, value) = match self {
            Self::Read { pin } => (pin, OperationKind::Read, driver.read(pin)?),
            Self::DigitalWrite { pin, high } => {
                driver.digital_write(pin, high)?;
                (pin, OperationKind::DigitalWrite, u8::from(high))
            }
            Self::PwmWrite { pin, duty_cycle } => {
                driver.pwm_write(pin, duty_cycle)?;
                (pin, OperationKind::PwmWrite, duty_cycle)
            }
        };

        Ok(OperationOutcome {
            pin,
            operation,
            value: Value::from(value),
        })
    }
}

/// `0`/`1`/`false`/`true` as a pin level
fn digital_level(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(high) => Some(*high),
        other => match other.as_u64()? {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        },
    }
}

/// Integer in `0..=255` as a PWM duty cycle
fn duty_cycle(value: &Value) -> Option<u8> {
    value.as_u64().and_then(|duty| u8::try_from(duty).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpio::SimulatedPins;
    use serde_json::json;

    fn queued(pin: u8, operation: OperationKind, value: Option<Value>) -> QueuedOperation {
        QueuedOperation { pin, operation, value }
    }

    #[tokio::test]
    async fn test_apply_writes_then_reads() {
        let executor = Executor::new(SimulatedPins::new());

        let outcomes = executor
            .apply(&[
                queued(17, OperationKind::PwmWrite, Some(json!(200))),
                queued(22, OperationKind::DigitalWrite, Some(json!(true))),
                queued(17, OperationKind::Read, None),
                queued(22, OperationKind::Read, None),
                queued(24, OperationKind::Read, None),
            ])
            .await
            .unwrap();

        let values: Vec<_> = outcomes.iter().map(|o| o.value.clone()).collect();
        assert_eq!(values, vec![json!(200), json!(1), json!(200), json!(1), json!(0)]);
        assert_eq!(outcomes[2].pin, 17);
        assert_eq!(outcomes[2].operation, OperationKind::Read);
    }

    #[tokio::test]
    async fn test_state_persists_between_queues() {
        let executor = Executor::new(SimulatedPins::new());
        executor
            .apply(&[queued(5, OperationKind::DigitalWrite, Some(json!(1)))])
            .await
            .unwrap();

        let outcomes = executor.apply(&[queued(5, OperationKind::Read, None)]).await.unwrap();
        assert_eq!(outcomes[0].value, json!(1));
    }

    #[tokio::test]
    async fn test_unconvertible_value_touches_no_pin() {
        let executor = Executor::new(SimulatedPins::new());

        let err = executor
            .apply(&[
                queued(6, OperationKind::DigitalWrite, Some(json!(1))),
                queued(7, OperationKind::PwmWrite, Some(json!("bright"))),
                queued(8, OperationKind::DigitalWrite, Some(json!(1))),
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::InvalidValue { pin: 7, .. }));

        // Neither the write before nor the write after the bad value was applied
        let outcomes = executor
            .apply(&[
                queued(6, OperationKind::Read, None),
                queued(8, OperationKind::Read, None),
            ])
            .await
            .unwrap();
        assert_eq!(outcomes[0].value, json!(0));
        assert_eq!(outcomes[1].value, json!(0));
    }

    #[test]
    fn test_commands_are_converted_from_queue() {
        assert_eq!(
            PinCommand::from_queued(&queued(4, OperationKind::DigitalWrite, Some(json!(true)))),
            Ok(PinCommand::DigitalWrite { pin: 4, high: true })
        );
        assert_eq!(
            PinCommand::from_queued(&queued(17, OperationKind::PwmWrite, Some(json!(64)))),
            Ok(PinCommand::PwmWrite { pin: 17, duty_cycle: 64 })
        );
        // Reads never look at the value
        assert_eq!(
            PinCommand::from_queued(&queued(23, OperationKind::Read, Some(json!("junk")))),
            Ok(PinCommand::Read { pin: 23 })
        );
        assert!(matches!(
            PinCommand::from_queued(&queued(4, OperationKind::DigitalWrite, Some(json!(200)))),
            Err(ExecutionError::InvalidValue { pin: 4, .. })
        ));
        assert!(matches!(
            PinCommand::from_queued(&queued(17, OperationKind::PwmWrite, None)),
            Err(ExecutionError::InvalidValue { pin: 17, .. })
        ));
    }

    #[tokio::test]
    async fn test_driver_errors_are_propagated() {
        let executor = Executor::new(SimulatedPins::new());
        let err = executor.apply(&[queued(99, OperationKind::Read, None)]).await.unwrap_err();
        assert_eq!(err, ExecutionError::Driver(DriverError::PinUnavailable { pin: 99 }));
    }

    #[test]
    fn test_value_conversions() {
        assert_eq!(digital_level(&json!(0)), Some(false));
        assert_eq!(digital_level(&json!(true)), Some(true));
        assert_eq!(digital_level(&json!(2)), None);
        assert_eq!(duty_cycle(&json!(255)), Some(255));
        assert_eq!(duty_cycle(&json!(256)), None);
        assert_eq!(duty_cycle(&json!(-1)), None);
    }
}
