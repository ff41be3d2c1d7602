//! Domain errors for the scheduling module.

use access_control_sdk::{AccessControlError, DenyReason};
use uuid::Uuid;

use super::models::EntityKind;
use super::repos::RepositoryError;

/// Generic text shown for every denial, whatever the internal reason.
pub const ACCESS_DENIED_MESSAGE: &str = "you do not have permission to perform this action";

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    /// The reason is for logs; [`user_message`](Self::user_message) hides it.
    #[error("access denied: {0}")]
    AccessDenied(DenyReason),

    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: Uuid },

    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("{kind} cannot move from {from} to {to}")]
    InvalidTransition {
        kind: EntityKind,
        from: &'static str,
        to: &'static str,
    },

    #[error("access control misconfigured: {0}")]
    Configuration(String),

    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl DomainError {
    #[must_use]
    pub fn not_found(kind: EntityKind, id: Uuid) -> Self {
        Self::NotFound { kind, id }
    }

    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn invalid_transition(kind: EntityKind, from: &'static str, to: &'static str) -> Self {
        Self::InvalidTransition { kind, from, to }
    }

    /// Text safe to show the caller.
    ///
    /// Denials never reveal which scope failed, and storage failures never
    /// reveal their cause.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::AccessDenied(_) => ACCESS_DENIED_MESSAGE.to_owned(),
            Self::NotFound { kind, .. } => format!("{kind} not found"),
            Self::Validation { .. } | Self::InvalidTransition { .. } => self.to_string(),
            Self::Configuration(_) | Self::Repository(_) => {
                "the request could not be completed".to_owned()
            }
        }
    }

    /// The internal deny reason, if this is a denial.
    #[must_use]
    pub fn deny_reason(&self) -> Option<DenyReason> {
        match self {
            Self::AccessDenied(reason) => Some(*reason),
            _ => None,
        }
    }
}

impl From<AccessControlError> for DomainError {
    fn from(e: AccessControlError) -> Self {
        match e {
            AccessControlError::Denied(reason) => Self::AccessDenied(reason),
            AccessControlError::Configuration(msg) => Self::Configuration(msg),
        }
    }
}
