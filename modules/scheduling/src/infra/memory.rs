//! In-process repository.
//!
//! Rows live in a `parking_lot::RwLock<HashMap>`; plans are evaluated with
//! [`carepath_listing::eval`]. Used by tests and for small fixed data sets.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use carepath_listing::QueryPlan;
use carepath_listing::eval;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::domain::models::Entity;
use crate::domain::repos::{EntityRepository, RepositoryError};
use crate::domain::service::Repositories;

pub struct InMemoryRepository<T> {
    rows: RwLock<HashMap<Uuid, T>>,
}

impl<T: Entity> InMemoryRepository<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }

    /// Repository pre-filled with `rows`.
    #[must_use]
    pub fn with_rows(rows: impl IntoIterator<Item = T>) -> Self {
        let rows = rows.into_iter().map(|row| (row.id(), row)).collect();
        Self {
            rows: RwLock::new(rows),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}

impl<T: Entity> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for InMemoryRepository<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRepository")
            .field("rows", &self.rows.read().len())
            .finish()
    }
}

#[async_trait]
impl<T: Entity> EntityRepository<T> for InMemoryRepository<T> {
    async fn get(&self, id: Uuid) -> Result<Option<T>, RepositoryError> {
        Ok(self.rows.read().get(&id).cloned())
    }

    async fn list(&self, plan: &QueryPlan) -> Result<(Vec<T>, u64), RepositoryError> {
        let rows = self.rows.read();
        Ok(eval::execute(rows.values(), plan))
    }

    async fn save(&self, entity: T) -> Result<T, RepositoryError> {
        self.rows.write().insert(entity.id(), entity.clone());
        Ok(entity)
    }
}

impl Repositories {
    /// An empty in-memory store for every entity.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            organizations: Arc::new(InMemoryRepository::new()),
            members: Arc::new(InMemoryRepository::new()),
            users: Arc::new(InMemoryRepository::new()),
            technicians: Arc::new(InMemoryRepository::new()),
            interpreting_doctors: Arc::new(InMemoryRepository::new()),
            patients: Arc::new(InMemoryRepository::new()),
            appointments: Arc::new(InMemoryRepository::new()),
            bookings: Arc::new(InMemoryRepository::new()),
            interpretations: Arc::new(InMemoryRepository::new()),
        }
    }
}
