use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindDir {
    In,
    Out,
    Left,
    Right,
    Calm,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weather {
    pub temp_f: f64,
    pub wind_mph: f64,
    pub wind_dir: WindDir,
    pub humidity_pct: f64,
    pub pressure_inhg: f64,
}

/// neutral conditions substituted when the upstream is unavailable
impl Default for Weather {
    fn default() -> Self {
        Self {
            temp_f: 72.0,
            wind_mph: 0.0,
            wind_dir: WindDir::Calm,
            humidity_pct: 50.0,
            pressure_inhg: 29.92,
        }
    }
}

impl Weather {
    /// signed wOBA adjustment from wind, temperature, and humidity
    pub fn woba_shift(&self) -> f64 {
        let mut shift = match self.wind_dir {
            WindDir::Out => 0.001 * self.wind_mph,
            WindDir::In => -0.001 * self.wind_mph,
            _ => 0.0,
        };
        if self.temp_f < 50.0 {
            shift -= 0.010;
        } else if self.temp_f > 80.0 {
            shift += 0.005;
        }
        if self.humidity_pct > 80.0 {
            shift -= 0.005;
        }
        shift
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_weather_shifts_nothing() {
        assert_eq!(Weather::default().woba_shift(), 0.0);
    }

    #[test]
    fn wind_out_helps_and_cold_hurts() {
        let blown_out = Weather { wind_dir: WindDir::Out, wind_mph: 20.0, ..Weather::default() };
        assert!((blown_out.woba_shift() - 0.020).abs() < 1e-12);
        let frozen = Weather { temp_f: 40.0, ..Weather::default() };
        assert_eq!(frozen.woba_shift(), -0.010);
        let swamp = Weather { humidity_pct: 90.0, temp_f: 85.0, ..Weather::default() };
        assert_eq!(swamp.woba_shift(), 0.000);
    }
}
