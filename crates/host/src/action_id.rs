//! Dotted action-id parsing for inbound `action` messages.
//!
//! An action id is a dot-separated path; the 7th segment (index 6)
//! selects the handler (`script` vs `plugin`), the 8th (index 7) selects
//! the operation within that handler. Action data arrives as a list of
//! `{id, value}` pairs whose `id` is folded down to its final dotted
//! segment to become a map key — confirmed against
//! `TPClientQt::actionDataToMap`'s `split('.').last()` behavior in the
//! original plugin.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    Script,
    Plugin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionId {
    pub handler: Handler,
    pub operation: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionIdError {
    TooShort,
    UnknownHandler(String),
}

impl std::fmt::Display for ActionIdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionIdError::TooShort => write!(f, "action id has fewer than 8 dotted segments"),
            ActionIdError::UnknownHandler(h) => write!(f, "unknown action handler {h:?}"),
        }
    }
}

impl std::error::Error for ActionIdError {}

/// Parse a dotted action id into its handler and operation segments.
pub fn parse(action_id: &str) -> Result<ActionId, ActionIdError> {
    let segments: Vec<&str> = action_id.split('.').collect();
    if segments.len() < 8 {
        return Err(ActionIdError::TooShort);
    }
    let handler = match segments[6] {
        "script" => Handler::Script,
        "plugin" => Handler::Plugin,
        other => return Err(ActionIdError::UnknownHandler(other.to_string())),
    };
    Ok(ActionId { handler, operation: segments[7].to_string() })
}

/// Fold `{id, value}` action data into a map keyed by each `id`'s final
/// dotted segment. An `id` with no `.` folds to itself. Entries missing
/// `id` or `value` are skipped rather than failing the whole action.
pub fn fold_action_data(data: &[(String, String)]) -> HashMap<String, String> {
    data.iter()
        .map(|(id, value)| {
            let key = id.rsplit('.').next().unwrap_or(id.as_str()).to_string();
            (key, value.clone())
        })
        .collect()
}

#[cfg(test)]
#[path = "action_id_tests.rs"]
mod tests;
