pub mod error;
pub mod limit;
pub mod metrics;
pub mod proxy;
pub mod routes;
pub mod server;
pub mod validate;

pub use error::ApiError;
pub use server::Server;

use crate::cache::TtlCache;
use crate::config::Settings;
use crate::context::WeatherService;
use crate::registry::Registry;
use crate::store::Store;
use actix_web::HttpRequest;
use limit::RateLimiter;
use metrics::Metrics;
use std::net::IpAddr;
use std::sync::Arc;
use std::sync::Mutex;

const QUERY_CACHE_CAPACITY: usize = 1_024;

/// shared application state for every handler
pub struct Gateway {
    pub settings: Settings,
    pub registry: Arc<Registry>,
    pub store: Store,
    pub weather: Arc<WeatherService>,
    pub metrics: Metrics,
    pub limiter: RateLimiter,
    pub cache: Mutex<TtlCache<String, String>>,
    pub http: reqwest::Client,
}

impl Gateway {
    pub fn new(
        settings: Settings,
        registry: Arc<Registry>,
        store: Store,
        weather: Arc<WeatherService>,
    ) -> anyhow::Result<Self> {
        let limiter = RateLimiter::new(
            settings.rate_limit_requests,
            settings.rate_limit_window,
            settings.rate_limit_burst(),
        );
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()?;
        Ok(Self {
            settings,
            registry,
            store,
            weather,
            metrics: Metrics::default(),
            limiter,
            cache: Mutex::new(TtlCache::new(QUERY_CACHE_CAPACITY)),
            http,
        })
    }

    /// count the request and charge the caller's token bucket
    pub fn admit(&self, req: &HttpRequest) -> Result<(), ApiError> {
        Metrics::bump(&self.metrics.requests);
        let source = req
            .peer_addr()
            .map(|addr| addr.ip())
            .unwrap_or(IpAddr::from([0, 0, 0, 0]));
        self.limiter.try_acquire(source).map_err(|retry_after| {
            Metrics::bump(&self.metrics.rate_limited);
            ApiError::RateLimited { retry_after }
        })
    }
}
