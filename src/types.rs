use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Operation a client may request on an aliased pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    #[serde(rename = "read")]
    Read,
    #[serde(rename = "digitalWrite")]
    DigitalWrite,
    #[serde(rename = "pwmWrite")]
    PwmWrite,
}

impl OperationKind {
    /// Wire name of the deprecated catch-all write kind.
    ///
    /// It was split into `digitalWrite` and `pwmWrite` and is only recognised
    /// so that it can be rejected with a useful log line.
    pub const LEGACY_WRITE: &'static str = "write";

    /// Parse a canonical wire name (`read`, `digitalWrite`, `pwmWrite`)
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "read" => Some(Self::Read),
            "digitalWrite" => Some(Self::DigitalWrite),
            "pwmWrite" => Some(Self::PwmWrite),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::DigitalWrite => "digitalWrite",
            Self::PwmWrite => "pwmWrite",
        }
    }

    /// Write kinds carry a value that must pass the alias' validator
    pub fn is_write(&self) -> bool {
        matches!(self, Self::DigitalWrite | Self::PwmWrite)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One element of an incoming batch, viewed without any validation
///
/// The body is attacker-controlled JSON, so every field is optional here.
/// A field that is present but has the wrong JSON type is kept as `None`
/// for `alias`/`operation`; `value` is kept verbatim (including `null`).
#[derive(Debug, Clone, Copy)]
pub struct RequestItem<'a> {
    pub alias: Option<&'a str>,
    pub operation: Option<&'a str>,
    pub value: Option<&'a Value>,
}

impl<'a> RequestItem<'a> {
    /// Returns `None` when the item is not a JSON object
    pub fn from_json(item: &'a Value) -> Option<Self> {
        item.as_object().map(Self::from_object)
    }

    fn from_object(object: &'a Map<String, Value>) -> Self {
        Self {
            alias: object.get("alias").and_then(Value::as_str),
            operation: object.get("operation").and_then(Value::as_str),
            value: object.get("value"),
        }
    }
}

/// Validated low-level operation, ready to be applied to a pin
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueuedOperation {
    pub pin: u8,
    pub operation: OperationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// Result of applying one queued operation
///
/// For writes `value` is the value written, for reads it is the level read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationOutcome {
    pub pin: u8,
    pub operation: OperationKind,
    pub value: Value,
}

/// Reasons a batch is rejected
///
/// The display strings are part of the HTTP contract and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Failed to validate request body.")]
    MalformedBody,
    #[error("Aborted validation due to empty body.")]
    EmptyBody,
    #[error("Failed to validate alias.")]
    UnknownAlias,
    #[error("Failed to validate alias' operation.")]
    OperationNotAllowed,
    #[error("Failed to validate alias' value.")]
    ValueValidationFailed,
}

impl ValidationError {
    /// HTTP status reported for every validation failure
    pub fn status(&self) -> u16 {
        500
    }
}
