#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Security primitives shared by the access-control engine, the list-query
//! engine and the scheduling services.
//!
//! - [`Principal`] - the acting identity for one request
//! - [`RoleId`] - the closed set of roles
//! - [`AccessScope`] - row-level restriction compiled from a principal

pub mod access_scope;
pub mod principal;

pub use access_scope::{AccessScope, FilterOp, ScopeConstraint, ScopeFilter, properties};
pub use principal::{OrganizationType, Principal, PrincipalBuilder, PrincipalError, RoleId};
