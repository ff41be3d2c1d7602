//! Domain layer for the access-control module.

pub mod client;
pub mod engine;
pub mod helpers;
pub mod matrix;
