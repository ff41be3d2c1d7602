//! Process assembly.

use std::path::Path;
use std::sync::Arc;

use access_control::AccessControlEngine;
use access_control_sdk::AccessControlClient;
use anyhow::Context;

use crate::config::AppConfig;
use crate::domain::registry::ListQueryRegistry;
use crate::domain::service::{AppServices, Repositories};

/// The assembled scheduling application: one engine, one spec registry and
/// the services built on them. Everything here is read-only after startup.
#[derive(Debug)]
pub struct App {
    engine: Arc<AccessControlEngine>,
    registry: ListQueryRegistry,
    services: AppServices,
}

impl App {
    /// Load configuration from `path` (plus environment) and assemble over an
    /// in-memory store.
    ///
    /// # Errors
    ///
    /// Fails if the configuration cannot be read or is inconsistent.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let config = AppConfig::load(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?;
        Self::from_config(&config)
    }

    /// Assemble over an in-memory store.
    ///
    /// # Errors
    ///
    /// Fails if the permission matrix or a list spec is malformed.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        Self::with_repositories(config, &Repositories::in_memory())
    }

    /// Assemble over caller-supplied repositories.
    ///
    /// # Errors
    ///
    /// Fails if the permission matrix or a list spec is malformed.
    pub fn with_repositories(config: &AppConfig, repos: &Repositories) -> anyhow::Result<Self> {
        let engine = AccessControlEngine::from_config(&config.access_control)
            .context("invalid access-control permission matrix")?;
        let engine = Arc::new(engine);

        let registry = ListQueryRegistry::builtin(&config.scheduling)
            .context("invalid list query configuration")?;

        let access: Arc<dyn AccessControlClient> = engine.clone();
        let services = AppServices::new(repos, access, &registry)
            .context("failed to assemble scheduling services")?;

        tracing::info!(
            matrix_override = config.access_control.matrix.is_some(),
            default_page_size = config.scheduling.default_page_size,
            max_page_size = config.scheduling.max_page_size,
            "scheduling module initialized"
        );
        Ok(Self {
            engine,
            registry,
            services,
        })
    }

    #[must_use]
    pub fn engine(&self) -> &AccessControlEngine {
        &self.engine
    }

    #[must_use]
    pub fn registry(&self) -> &ListQueryRegistry {
        &self.registry
    }

    #[must_use]
    pub fn services(&self) -> &AppServices {
        &self.services
    }
}
