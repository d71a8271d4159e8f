//! HTTP surface of the planner.

pub mod error;
pub mod handlers;
pub mod rate_limit;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use chrono::NaiveDate;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::calendar::{HolidayCalendar, JsonFileHolidays, StaticFixedHolidays};
use crate::config::Settings;
use crate::domain::{Clock, Error, FixedHolidaySource, SystemClock};
use crate::registry::{HttpRegistryClient, MemoryRegistryCache, RegistryService};

pub use error::ApiError;
pub use rate_limit::{IpLimit, RateLimits};

/// Collaborators shared by every request, built once per process.
#[derive(Clone)]
pub struct AppState {
    pub calendar: Arc<HolidayCalendar>,
    pub registry: Arc<RegistryService>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(
        calendar: Arc<HolidayCalendar>,
        registry: Arc<RegistryService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            calendar,
            registry,
            clock,
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, Error> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let source = holiday_source(settings);
        let calendar = HolidayCalendar::new(source)
            .with_reject_saturdays(settings.calendar.reject_saturdays);

        let client = HttpRegistryClient::new(
            settings.registry.base_url.clone(),
            settings.registry.token.clone(),
            Duration::from_secs(settings.registry.timeout_secs),
        )?;
        if settings.registry.token.is_none() {
            tracing::warn!("Registry API token not configured; RUC lookups will fail");
        }
        let registry = RegistryService::new(
            Arc::new(client),
            Arc::new(MemoryRegistryCache::new()),
            Arc::clone(&clock),
            chrono::Duration::days(settings.registry.cache_days),
        );

        Ok(Self::new(Arc::new(calendar), Arc::new(registry), clock))
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.now().date_naive()
    }
}

pub fn holiday_source(settings: &Settings) -> Arc<dyn FixedHolidaySource> {
    match &settings.calendar.holidays_file {
        Some(path) => Arc::new(JsonFileHolidays::new(path.clone())),
        None => Arc::new(StaticFixedHolidays::default()),
    }
}

pub fn build_router(state: AppState, limits: &RateLimits) -> Router {
    let holidays = Router::new()
        .route("/getHolidays", get(handlers::get_holidays))
        .route_layer(middleware::from_fn_with_state(
            limits.holidays.clone(),
            rate_limit::ip_rate_limit,
        ));

    let registry = Router::new()
        .route("/consultar-ruc", get(handlers::consultar_ruc))
        .route_layer(middleware::from_fn_with_state(
            limits.registry.clone(),
            rate_limit::ip_rate_limit,
        ));

    let documents = Router::new()
        .route("/calculate", post(handlers::calculate))
        .route("/generate-report", post(handlers::generate_report))
        .route("/generate-excel", post(handlers::generate_report))
        .route("/generate-json", post(handlers::generate_json))
        .route("/restore-backup", post(handlers::restore_backup))
        .route_layer(middleware::from_fn_with_state(
            limits.default_daily.clone(),
            rate_limit::ip_rate_limit,
        ))
        .route_layer(middleware::from_fn_with_state(
            limits.default_hourly.clone(),
            rate_limit::ip_rate_limit,
        ));

    let api = Router::new().merge(documents).merge(holidays).merge(registry);

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
