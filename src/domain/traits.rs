use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Error, FixedHoliday, RegistryRecord, TaxpayerProfile};

/// Persisted store of year-less holidays.
#[async_trait]
pub trait FixedHolidaySource: Send + Sync {
    async fn load(&self) -> Result<Vec<FixedHoliday>, Error>;
}

/// Remote taxpayer registry.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    async fn fetch(&self, ruc: &str) -> Result<TaxpayerProfile, Error>;
}

/// Key-value store for registry lookups. Freshness is decided by the caller.
#[async_trait]
pub trait RegistryCache: Send + Sync {
    async fn get(&self, ruc: &str) -> Result<Option<RegistryRecord>, Error>;
    async fn put(&self, record: RegistryRecord) -> Result<(), Error>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
