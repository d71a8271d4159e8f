use std::path::PathBuf;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::domain::Error;
use crate::registry::{DEFAULT_CACHE_DAYS, http::DEFAULT_BASE_URL};

/// Runtime settings, read from an optional `configuration` file and then from
/// `APP__*` environment variables (e.g. `APP__SERVER__PORT=9000`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub log: LogSettings,
    pub registry: RegistrySettings,
    pub calendar: CalendarSettings,
    pub rate_limit: RateLimitSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub level: String,
    pub json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegistrySettings {
    pub base_url: String,
    pub token: Option<String>,
    pub cache_days: i64,
    pub timeout_secs: u64,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            cache_days: DEFAULT_CACHE_DAYS,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CalendarSettings {
    /// JSON array of `{day, month, name}`; built-in holidays when unset.
    pub holidays_file: Option<PathBuf>,
    pub reject_saturdays: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    pub holidays_per_minute: u32,
    pub registry_per_minute: u32,
    /// Applied to every route without a limit of its own.
    pub default_per_hour: u32,
    pub default_per_day: u32,
    /// Key clients by `x-forwarded-for`. Only safe behind a proxy that sets it.
    pub trust_forwarded_for: bool,
    pub prune_interval_secs: u64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            holidays_per_minute: 30,
            registry_per_minute: 10,
            default_per_hour: 50,
            default_per_day: 200,
            trust_forwarded_for: false,
            prune_interval_secs: 60,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self, Error> {
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        let mut settings: Settings = config.try_deserialize()?;
        if settings.registry.token.is_none() {
            settings.registry.token = std::env::var("SUNAT_API_TOKEN").ok();
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_limits() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.registry.cache_days, 7);
        assert_eq!(settings.registry.timeout_secs, 10);
        assert_eq!(settings.rate_limit.holidays_per_minute, 30);
        assert_eq!(settings.rate_limit.registry_per_minute, 10);
        assert_eq!(settings.rate_limit.default_per_hour, 50);
        assert_eq!(settings.rate_limit.default_per_day, 200);
        assert!(!settings.rate_limit.trust_forwarded_for);
        assert!(!settings.calendar.reject_saturdays);
    }

    #[test]
    fn partial_sources_fill_in_defaults() {
        let config = Config::builder()
            .set_override("server.port", 9000)
            .unwrap()
            .set_override("registry.token", "secret")
            .unwrap()
            .build()
            .unwrap();
        let settings: Settings = config.try_deserialize().unwrap();

        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.registry.token.as_deref(), Some("secret"));
        assert_eq!(settings.registry.base_url, DEFAULT_BASE_URL);
    }
}
