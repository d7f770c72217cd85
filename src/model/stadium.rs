use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    Natural,
    Artificial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Roof {
    Open,
    Closed,
    Retractable,
}

/// outfield distances run left field line to right field line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stadium {
    pub id: Uuid,
    pub name: String,
    pub distances: [u16; 5],
    pub wall_heights: [u16; 5],
    pub altitude_ft: f64,
    pub surface: Surface,
    pub roof: Roof,
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for Stadium {
    fn default() -> Self {
        Self {
            id: Uuid::nil(),
            name: String::from("neutral grounds"),
            distances: [330, 375, 404, 375, 330],
            wall_heights: [8, 8, 8, 8, 8],
            altitude_ft: 500.0,
            surface: Surface::Natural,
            roof: Roof::Open,
            latitude: 39.0,
            longitude: -94.5,
        }
    }
}

impl Stadium {
    /// home runs carry farther in thin air; up to +20% above 1000 ft
    pub fn altitude_factor(&self) -> f64 {
        if self.altitude_ft > 1000.0 {
            1.0 + (0.02 * (self.altitude_ft - 1000.0) / 1000.0).min(0.20)
        } else {
            1.0
        }
    }
}
