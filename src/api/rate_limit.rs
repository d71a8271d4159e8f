use std::{
    net::{IpAddr, SocketAddr},
    num::NonZeroU32,
    sync::Arc,
    time::Duration,
};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use governor::{
    Quota, RateLimiter,
    clock::{Clock, DefaultClock},
    state::keyed::DashMapStateStore,
};
use tokio::task::JoinHandle;

use crate::api::error::ApiError;
use crate::config::RateLimitSettings;

const MINUTE: Duration = Duration::from_secs(60);
const HOUR: Duration = Duration::from_secs(60 * 60);
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Rate limiter keyed by client IP address.
pub type IpRateLimiter = Arc<RateLimiter<IpAddr, DashMapStateStore<IpAddr>, DefaultClock>>;

/// A keyed limiter together with how the client address is determined.
///
/// `x-forwarded-for` is only honored when `trust_forwarded_for` is set, i.e.
/// when a proxy in front of the service overwrites it. Otherwise the socket
/// peer address is the key.
#[derive(Clone)]
pub struct IpLimit {
    limiter: IpRateLimiter,
    trust_forwarded_for: bool,
}

impl IpLimit {
    /// At most `max` requests per client within `window`, all available as burst.
    pub fn new(max: u32, window: Duration, trust_forwarded_for: bool) -> Self {
        let max = NonZeroU32::new(max).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::with_period(window / max.get())
            .unwrap_or_else(|| Quota::per_second(max))
            .allow_burst(max);
        Self {
            limiter: Arc::new(RateLimiter::dashmap(quota)),
            trust_forwarded_for,
        }
    }

    /// Number of client addresses currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }

    /// Forgets clients whose quota has fully replenished.
    pub fn prune(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }
}

/// Every limiter the router installs.
#[derive(Clone)]
pub struct RateLimits {
    pub holidays: IpLimit,
    pub registry: IpLimit,
    pub default_hourly: IpLimit,
    pub default_daily: IpLimit,
}

impl RateLimits {
    pub fn from_settings(settings: &RateLimitSettings) -> Self {
        let trust = settings.trust_forwarded_for;
        Self {
            holidays: IpLimit::new(settings.holidays_per_minute, MINUTE, trust),
            registry: IpLimit::new(settings.registry_per_minute, MINUTE, trust),
            default_hourly: IpLimit::new(settings.default_per_hour, HOUR, trust),
            default_daily: IpLimit::new(settings.default_per_day, DAY, trust),
        }
    }

    fn all(&self) -> [&IpLimit; 4] {
        [
            &self.holidays,
            &self.registry,
            &self.default_hourly,
            &self.default_daily,
        ]
    }

    pub fn prune(&self) {
        for limit in self.all() {
            limit.prune();
        }
    }

    /// Prunes every limiter on a fixed interval so idle addresses do not
    /// accumulate.
    pub fn spawn_pruning(&self, every: Duration) -> JoinHandle<()> {
        let limits = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                limits.prune();
                let tracked: usize = limits.all().iter().map(|l| l.tracked_clients()).sum();
                tracing::debug!(tracked, "Pruned rate limiter state");
            }
        })
    }
}

fn client_ip(request: &Request, trust_forwarded_for: bool) -> Option<IpAddr> {
    let forwarded = trust_forwarded_for
        .then(|| {
            request
                .headers()
                .get("x-forwarded-for")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.split(',').next())
                .and_then(|s| s.trim().parse::<IpAddr>().ok())
        })
        .flatten();

    forwarded.or_else(|| {
        request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
    })
}

pub async fn ip_rate_limit(
    State(limit): State<IpLimit>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(ip) = client_ip(&request, limit.trust_forwarded_for) else {
        tracing::warn!("Could not determine client IP for rate limiting");
        return Ok(next.run(request).await);
    };

    match limit.limiter.check_key(&ip) {
        Ok(_) => Ok(next.run(request).await),
        Err(negative) => {
            let wait_time = negative.wait_time_from(DefaultClock::default().now());
            tracing::warn!(%ip, wait_secs = wait_time.as_secs(), "Rate limit exceeded");
            Err(ApiError::TooManyRequests {
                retry_after_secs: wait_time.as_secs().max(1),
            })
        }
    }
}
