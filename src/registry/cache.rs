use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::{Error, RegistryCache, RegistryRecord};

/// Process-local registry cache.
#[derive(Debug, Default)]
pub struct MemoryRegistryCache {
    entries: DashMap<String, RegistryRecord>,
}

impl MemoryRegistryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl RegistryCache for MemoryRegistryCache {
    async fn get(&self, ruc: &str) -> Result<Option<RegistryRecord>, Error> {
        Ok(self.entries.get(ruc).map(|entry| entry.value().clone()))
    }

    async fn put(&self, record: RegistryRecord) -> Result<(), Error> {
        self.entries.insert(record.profile.ruc.clone(), record);
        Ok(())
    }
}
