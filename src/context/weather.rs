use crate::cache::TtlCache;
use crate::model::Stadium;
use crate::model::Weather;
use crate::model::WindDir;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;
use uuid::Uuid;

const CACHE_CAPACITY: usize = 1_024;
const CACHE_TTL: Duration = Duration::from_secs(3_600);

/// the upstream forecast call, behind a trait so tests can stub it
#[async_trait::async_trait]
pub trait Forecast: Send + Sync {
    async fn fetch(&self, lat: f64, lon: f64, time: DateTime<Utc>) -> anyhow::Result<Weather>;
}

/// open-meteo-shaped HTTP upstream
pub struct HttpForecast {
    http: reqwest::Client,
    url: String,
}

impl HttpForecast {
    pub fn new(url: String, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, url })
    }
}

#[derive(Debug, Deserialize)]
struct ForecastBody {
    current: CurrentBody,
}

#[derive(Debug, Deserialize)]
struct CurrentBody {
    #[serde(default)]
    temperature_2m: f64,
    #[serde(default)]
    wind_speed_10m: f64,
    #[serde(default)]
    wind_direction_10m: f64,
    #[serde(default)]
    relative_humidity_2m: f64,
    #[serde(default)]
    surface_pressure: f64,
}

#[async_trait::async_trait]
impl Forecast for HttpForecast {
    async fn fetch(&self, lat: f64, lon: f64, _time: DateTime<Utc>) -> anyhow::Result<Weather> {
        let response = self
            .http
            .get(&self.url)
            .query(&[
                ("latitude", lat.to_string()),
                ("longitude", lon.to_string()),
                (
                    "current",
                    String::from(
                        "temperature_2m,wind_speed_10m,wind_direction_10m,\
                         relative_humidity_2m,surface_pressure",
                    ),
                ),
                ("temperature_unit", String::from("fahrenheit")),
                ("wind_speed_unit", String::from("mph")),
            ])
            .send()
            .await?
            .error_for_status()?;
        let body: ForecastBody = response.json().await?;
        Ok(Weather {
            temp_f: body.current.temperature_2m,
            wind_mph: body.current.wind_speed_10m,
            wind_dir: cardinal(body.current.wind_direction_10m),
            humidity_pct: body.current.relative_humidity_2m,
            // hPa to inHg
            pressure_inhg: body.current.surface_pressure * 0.02953,
        })
    }
}

/// map a meteorological bearing onto the ballpark's axes; most parks
/// face roughly northeast, so a southwest wind blows out
fn cardinal(degrees: f64) -> WindDir {
    match degrees.rem_euclid(360.0) {
        d if !(22.5..337.5).contains(&d) => WindDir::In,
        d if d < 112.5 => WindDir::Right,
        d if d < 202.5 => WindDir::Out,
        d if d < 292.5 => WindDir::Left,
        _ => WindDir::In,
    }
}

/// weather provider with a bounded per-hour cache. any upstream error
/// degrades to neutral conditions with a warning logged once per key.
pub struct WeatherService {
    upstream: Box<dyn Forecast>,
    cache: Mutex<TtlCache<(Uuid, i64), Weather>>,
    warned: Mutex<HashSet<(Uuid, i64)>>,
}

impl WeatherService {
    pub fn new(upstream: Box<dyn Forecast>) -> Self {
        Self {
            upstream,
            cache: Mutex::new(TtlCache::new(CACHE_CAPACITY)),
            warned: Mutex::new(HashSet::new()),
        }
    }

    pub async fn get(&self, stadium: &Stadium, game_time: DateTime<Utc>) -> Weather {
        let key = (stadium.id, hour_bucket(game_time));
        if let Some(cached) = self.cache.lock().expect("weather cache lock").get(&key) {
            return cached;
        }
        match self
            .upstream
            .fetch(stadium.latitude, stadium.longitude, game_time)
            .await
        {
            Ok(weather) => {
                self.cache
                    .lock()
                    .expect("weather cache lock")
                    .insert(key, weather.clone(), CACHE_TTL);
                weather
            }
            Err(e) => {
                if self.warned.lock().expect("weather warn lock").insert(key) {
                    log::warn!("weather upstream failed for {}: {}", stadium.name, e);
                }
                Weather::default()
            }
        }
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.lock().expect("weather cache lock").len()
    }
}

fn hour_bucket(time: DateTime<Utc>) -> i64 {
    time.timestamp() / 3_600
}
