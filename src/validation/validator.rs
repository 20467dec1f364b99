use crate::{
    registry::{AliasEntry, AliasRegistry},
    OperationKind, QueuedOperation, RequestItem, ValidationError,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Validates pin-operation batches against an injected alias registry
#[derive(Debug, Clone)]
pub struct Validator {
    registry: Arc<AliasRegistry>,
}

impl Validator {
    pub fn new(registry: Arc<AliasRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &AliasRegistry {
        &self.registry
    }

    /// Validate a decoded request body
    /// Returns the operation queue if every item is valid, or the first failure
    pub fn validate(&self, batch: &Value) -> Result<Vec<QueuedOperation>, ValidationError> {
        validate(batch, &self.registry)
    }
}

/// Validate a batch and build the operation queue
///
/// Items are checked left to right; the first failing check aborts the whole
/// batch and later items are never looked at. On success the queue has one
/// entry per item, in batch order.
pub fn validate(
    batch: &Value,
    registry: &AliasRegistry,
) -> Result<Vec<QueuedOperation>, ValidationError> {
    let items = batch.as_array().ok_or(ValidationError::MalformedBody)?;
    if items.is_empty() {
        return Err(ValidationError::EmptyBody);
    }

    let mut queue = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let queued = check_item(item, registry).inspect_err(|err| {
            warn!("Batch item {} rejected: {}", index, err);
        })?;
        debug!("Batch item {} queued: {} on pin {}", index, queued.operation, queued.pin);
        queue.push(queued);
    }

    Ok(queue)
}

fn check_item(item: &Value, registry: &AliasRegistry) -> Result<QueuedOperation, ValidationError> {
    let request = RequestItem::from_json(item).ok_or(ValidationError::UnknownAlias)?;

    // 1. Alias must be registered
    let entry = resolve_alias(&request, registry)?;

    // 2. Operation must be allowed for the alias
    let operation = check_operation(&request, entry)?;

    // 3. Writes must carry a value the alias accepts
    let value = if operation.is_write() {
        Some(check_value(&request, entry)?.clone())
    } else {
        None
    };

    Ok(QueuedOperation {
        pin: entry.pin(),
        operation,
        value,
    })
}

fn resolve_alias<'r>(
    request: &RequestItem<'_>,
    registry: &'r AliasRegistry,
) -> Result<&'r AliasEntry, ValidationError> {
    request
        .alias
        .and_then(|alias| registry.get(alias))
        .ok_or(ValidationError::UnknownAlias)
}

fn check_operation(
    request: &RequestItem<'_>,
    entry: &AliasEntry,
) -> Result<OperationKind, ValidationError> {
    let name = request.operation.ok_or(ValidationError::OperationNotAllowed)?;

    if name == OperationKind::LEGACY_WRITE {
        warn!("Deprecated `write` operation requested; use `digitalWrite` or `pwmWrite`");
        return Err(ValidationError::OperationNotAllowed);
    }

    OperationKind::parse(name)
        .filter(|kind| entry.allows(*kind))
        .ok_or(ValidationError::OperationNotAllowed)
}

fn check_value<'a>(
    request: &RequestItem<'a>,
    entry: &AliasEntry,
) -> Result<&'a Value, ValidationError> {
    let value = request.value.ok_or(ValidationError::ValueValidationFailed)?;
    let validator = entry.validator().ok_or(ValidationError::ValueValidationFailed)?;

    if !validator.accepts(value) {
        return Err(ValidationError::ValueValidationFailed);
    }

    Ok(value)
}
