//! Data-access ports.
//!
//! The scheduling services depend on these traits only; storage backends
//! translate a [`QueryPlan`] into their own query language.

use async_trait::async_trait;
use carepath_listing::QueryPlan;
use uuid::Uuid;

use super::models::Entity;

/// Failure reported by a data-access collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Storage for one entity type.
#[async_trait]
pub trait EntityRepository<T: Entity>: Send + Sync {
    /// Fetch by id, including soft-deleted rows.
    async fn get(&self, id: Uuid) -> Result<Option<T>, RepositoryError>;

    /// Execute `plan`, returning the requested page and the total match count.
    async fn list(&self, plan: &QueryPlan) -> Result<(Vec<T>, u64), RepositoryError>;

    /// Insert or replace by id.
    async fn save(&self, entity: T) -> Result<T, RepositoryError>;
}
