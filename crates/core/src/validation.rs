//! Input validation helpers shared by the use cases.

use hms_types::NonEmptyText;
use uuid::Uuid;

use crate::{ServiceError, ServiceResult};

/// Returns `value` as `NonEmptyText`, or `InvalidInput(message)` when it is blank.
pub fn require_text(value: &str, message: &str) -> ServiceResult<NonEmptyText> {
    NonEmptyText::new(value).map_err(|_| ServiceError::InvalidInput(message.to_owned()))
}

/// Rejects the nil UUID, which callers send when an id field was left empty.
pub fn require_id(id: Uuid, what: &str) -> ServiceResult<Uuid> {
    if id.is_nil() {
        return Err(ServiceError::InvalidInput(format!("{what} ID is required")));
    }
    Ok(id)
}

/// Partial-update rule for required text: blank input keeps the current value.
///
/// Returns true when the stored value changed.
pub fn replace_text(current: &mut NonEmptyText, incoming: &str) -> bool {
    match NonEmptyText::new(incoming) {
        Ok(value) if value != *current => {
            *current = value;
            true
        }
        _ => false,
    }
}

/// Partial-update rule for optional text: blank input keeps the current value.
pub fn replace_string(current: &mut String, incoming: &str) -> bool {
    let incoming = incoming.trim();
    if incoming.is_empty() || incoming == current {
        return false;
    }
    *current = incoming.to_owned();
    true
}

/// Partial-update rule for values that are either supplied or absent.
pub fn replace_value<T: PartialEq>(current: &mut T, incoming: Option<T>) -> bool {
    match incoming {
        Some(value) if value != *current => {
            *current = value;
            true
        }
        _ => false,
    }
}
