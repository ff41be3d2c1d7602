#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Scheduling module.
//!
//! Organizations, staff, patients and the appointment -> booking ->
//! interpretation workflow, gated by the access-control engine and listed
//! through the list-query engine.
//!
//! ## Usage
//!
//! ```ignore
//! use scheduling::{App, AppConfig};
//!
//! let app = App::from_config(&AppConfig::default())?;
//! let page = app.services().lists.patients.list(&principal, &params).await?;
//! app.services().bookings.check_in_patient(&principal, booking_id).await?;
//! ```

pub mod config;
pub mod domain;
pub mod infra;
pub mod module;

pub use config::{AppConfig, SchedulingConfig};
pub use domain::error::DomainError;
pub use domain::registry::ListQueryRegistry;
pub use domain::service::{AppServices, Repositories};
pub use infra::InMemoryRepository;
pub use module::App;
