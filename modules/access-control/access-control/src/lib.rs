#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Access-control engine.
//!
//! A single decision point answering "may this principal perform this action
//! on this resource instance?". Decisions consult only the immutable
//! [`PermissionMatrix`] and the scoping attributes carried by the
//! [`Principal`](carepath_security::Principal); nothing here performs I/O or
//! reads ambient state, so one engine is shared by every request.
//!
//! The engine implements [`access_control_sdk::AccessControlClient`] for
//! in-process consumers.

pub mod config;
pub mod domain;

pub use config::{AccessControlConfig, PermissionMatrixConfig};
pub use domain::engine::AccessControlEngine;
pub use domain::matrix::PermissionMatrix;
