//! PEP (Policy Enforcement Point) helpers.
//!
//! - [`PolicyEnforcer`] turns decisions into `Result`s and fetches list scopes

pub mod enforcer;

pub use enforcer::PolicyEnforcer;
