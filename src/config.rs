use std::time::Duration;

/// process configuration, read once from the environment at startup.
/// unparseable values are initialization failures, absent values fall
/// back to defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    pub bind: String,
    pub db_url: String,
    pub data_service_url: String,
    pub weather_url: String,
    pub sim_workers: usize,
    pub simulation_runs: usize,
    pub request_timeout: Duration,
    pub run_budget: Duration,
    pub rate_limit_requests: u32,
    pub rate_limit_window: Duration,
    pub cache_ttl: Duration,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            bind: var("BIND_ADDR", defaults.bind),
            db_url: var("DB_URL", defaults.db_url),
            data_service_url: var("DATA_SERVICE_URL", defaults.data_service_url),
            weather_url: var("WEATHER_URL", defaults.weather_url),
            sim_workers: parsed("SIM_WORKERS", defaults.sim_workers)?,
            simulation_runs: parsed("SIMULATION_RUNS", defaults.simulation_runs)?,
            request_timeout: Duration::from_secs(parsed("REQUEST_TIMEOUT", 30)?),
            run_budget: Duration::from_secs(parsed("RUN_BUDGET", 600)?),
            rate_limit_requests: parsed("RATE_LIMIT_REQUESTS", 100)?,
            rate_limit_window: Duration::from_secs(parsed("RATE_LIMIT_WINDOW", 60)?),
            cache_ttl: Duration::from_secs(parsed("CACHE_TTL", 300)?),
        })
    }

    /// burst allowance for the gateway token bucket
    pub fn rate_limit_burst(&self) -> u32 {
        self.rate_limit_requests.saturating_mul(2)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            db_url: "postgres://localhost/dugout".to_string(),
            data_service_url: "http://127.0.0.1:8081".to_string(),
            weather_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            sim_workers: num_cpus::get(),
            simulation_runs: crate::DEFAULT_SIMULATIONS,
            request_timeout: Duration::from_secs(30),
            run_budget: Duration::from_secs(600),
            rate_limit_requests: 100,
            rate_limit_window: Duration::from_secs(60),
            cache_ttl: Duration::from_secs(300),
        }
    }
}

fn var(key: &str, fallback: String) -> String {
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => value,
        _ => fallback,
    }
}

fn parsed<T>(key: &str, fallback: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => value
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("invalid {}: {}", key, e)),
        _ => Ok(fallback),
    }
}
