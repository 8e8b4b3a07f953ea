//! Gatekeeper error types

use thiserror::Error;

/// One or more fields of an enabled policy are invalid
///
/// The policy is simply not activated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid policy fields: {}", fields.join(", "))]
pub struct ValidationFailure {
    /// Names of the rejected fields, in reporting order
    pub fields: Vec<String>,
}
