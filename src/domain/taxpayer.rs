use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Taxpayer data as returned by the remote registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxpayerProfile {
    pub ruc: String,
    pub razon_social: String,
    pub estado: Option<String>,
    pub condicion: Option<String>,
}

/// Cached registry entry, stamped with the instant it was stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryRecord {
    #[serde(flatten)]
    pub profile: TaxpayerProfile,
    pub timestamp: DateTime<Utc>,
}

impl RegistryRecord {
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: chrono::Duration) -> bool {
        now.signed_duration_since(self.timestamp) < ttl
    }
}
