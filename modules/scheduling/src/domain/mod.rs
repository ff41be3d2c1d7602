pub mod error;
pub mod models;
pub mod registry;
pub mod repos;
pub mod service;
