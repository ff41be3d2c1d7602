//! Error types for the `access_control` module.

use crate::models::DenyReason;

/// Errors surfaced through [`AccessControlClient`](crate::AccessControlClient)
/// and the PEP helper.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessControlError {
    /// The permission matrix is malformed. Fatal at startup.
    #[error("access control configuration error: {0}")]
    Configuration(String),

    /// The caller may not perform the action.
    ///
    /// Displays a generic message; the reason is for logs only.
    #[error("you do not have permission to perform this action")]
    Denied(DenyReason),
}

impl AccessControlError {
    /// The internal deny reason, if this is a denial.
    #[must_use]
    pub fn deny_reason(&self) -> Option<DenyReason> {
        match self {
            Self::Denied(reason) => Some(*reason),
            Self::Configuration(_) => None,
        }
    }
}
