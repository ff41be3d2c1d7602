#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Access Control SDK
//!
//! This crate provides the public API for the `access_control` module:
//!
//! - [`AccessControlClient`] - Public API trait for consumers
//! - [`Resource`], [`Action`] - Closed resource and action sets
//! - [`ResourceTarget`] - Scope attributes of the instance being accessed
//! - [`AccessDecision`], [`DenyReason`] - Check outcome
//! - [`AccessControlError`] - Error types
//! - [`pep`] - PEP helper
//!
//! ## Usage
//!
//! ```ignore
//! use access_control_sdk::{Action, Resource, ResourceTarget, pep::PolicyEnforcer};
//!
//! let enforcer = PolicyEnforcer::new(access_client.clone());
//!
//! // Gate a mutation on one instance
//! enforcer
//!     .authorize(&principal, Resource::Booking, Action::CheckInPatient, Some(&target))
//!     .await?;
//!
//! // Restrict a list query
//! let scope = enforcer.access_scope(&principal, Resource::Patient).await?;
//! ```

pub mod api;
pub mod error;
pub mod models;
pub mod pep;

pub use api::AccessControlClient;
pub use error::AccessControlError;
pub use models::{AccessDecision, Action, DenyReason, Resource, ResourceTarget, UnknownName};
