use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation failures raised by the addressing, reconciliation and translation layers.
///
/// Every variant carries the offending input so callers can surface it to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddressError {
    /// A cell, column or row string fails the A1 grammar or exceeds the sheet bounds
    #[error("Invalid cell reference: {0}")]
    InvalidReference(String),

    /// A range whose start exceeds its end, or a range string missing the sheet qualifier
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// A sheet title that cannot be resolved to a numeric sheet id
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),
}

impl AddressError {
    /// Stable machine-readable code for host bindings
    pub fn code(&self) -> &'static str {
        match self {
            AddressError::InvalidReference(_) => "INVALID_REFERENCE",
            AddressError::InvalidRange(_) => "INVALID_RANGE",
            AddressError::SheetNotFound(_) => "SHEET_NOT_FOUND",
        }
    }
}
