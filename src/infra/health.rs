//! Readiness probes for the backing stores.

use async_trait::async_trait;
use std::sync::Arc;

use super::{Cache, Database};
use crate::errors::AppResult;

/// Connectivity checks reported by the health endpoint.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn database(&self) -> AppResult<()>;

    async fn cache(&self) -> AppResult<()>;
}

/// Probes against the live Postgres and Redis connections
pub struct Probes {
    database: Arc<Database>,
    cache: Arc<Cache>,
}

impl Probes {
    pub fn new(database: Arc<Database>, cache: Arc<Cache>) -> Self {
        Self { database, cache }
    }
}

#[async_trait]
impl HealthCheck for Probes {
    async fn database(&self) -> AppResult<()> {
        Ok(self.database.ping().await?)
    }

    async fn cache(&self) -> AppResult<()> {
        self.cache.ping().await
    }
}
