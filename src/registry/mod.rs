//! Taxpayer registry lookups with a time-bounded cache in front of the remote
//! registry.

pub mod cache;
pub mod http;

use std::sync::Arc;

use crate::domain::{Clock, Error, RegistryCache, RegistryClient, RegistryRecord};

pub use cache::MemoryRegistryCache;
pub use http::HttpRegistryClient;

pub const RUC_LENGTH: usize = 11;
pub const DEFAULT_CACHE_DAYS: i64 = 7;

pub struct RegistryService {
    client: Arc<dyn RegistryClient>,
    cache: Arc<dyn RegistryCache>,
    clock: Arc<dyn Clock>,
    ttl: chrono::Duration,
}

impl RegistryService {
    pub fn new(
        client: Arc<dyn RegistryClient>,
        cache: Arc<dyn RegistryCache>,
        clock: Arc<dyn Clock>,
        ttl: chrono::Duration,
    ) -> Self {
        Self {
            client,
            cache,
            clock,
            ttl,
        }
    }

    pub async fn lookup(&self, ruc: &str) -> Result<RegistryRecord, Error> {
        let ruc = validate_ruc(ruc)?;

        match self.cache.get(ruc).await {
            Ok(Some(record)) if record.is_fresh(self.clock.now(), self.ttl) => {
                tracing::info!(ruc, "Returning RUC from cache");
                return Ok(record);
            }
            Ok(Some(_)) => tracing::info!(ruc, "Cached RUC expired, calling registry"),
            Ok(None) => tracing::info!(ruc, "RUC not in cache, calling registry"),
            Err(e) => tracing::warn!(ruc, error = %e, "RUC cache read failed, calling registry"),
        }

        let profile = self.client.fetch(ruc).await?;
        let record = RegistryRecord {
            profile,
            timestamp: self.clock.now(),
        };
        if let Err(e) = self.cache.put(record.clone()).await {
            tracing::warn!(ruc, error = %e, "Failed to cache RUC lookup");
        }
        Ok(record)
    }
}

/// A RUC is exactly eleven ASCII digits.
pub fn validate_ruc(raw: &str) -> Result<&str, Error> {
    let ruc = raw.trim();
    if ruc.is_empty() {
        return Err(Error::validation("The 'numero' parameter is required"));
    }
    if ruc.len() != RUC_LENGTH || !ruc.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::validation(format!(
            "RUC must be exactly {} digits, got '{}'",
            RUC_LENGTH, ruc
        )));
    }
    Ok(ruc)
}
