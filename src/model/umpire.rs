use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// scheduled umpire tendencies; zone size 100 = neutral, rate
/// adjustments in percentage points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UmpireTendencies {
    pub id: Uuid,
    pub name: String,
    pub strike_zone_size: f64,
    pub edge_tendency: f64,
    pub k_rate_adj: f64,
    pub bb_rate_adj: f64,
    pub consistency: f64,
    pub count_tendency: f64,
    pub high_leverage_tendency: f64,
    pub experience: u8,
}

impl Default for UmpireTendencies {
    fn default() -> Self {
        Self {
            id: Uuid::nil(),
            name: String::from("neutral umpire"),
            strike_zone_size: 100.0,
            edge_tendency: 0.0,
            k_rate_adj: 0.0,
            bb_rate_adj: 0.0,
            consistency: 85.0,
            count_tendency: 0.0,
            high_leverage_tendency: 0.0,
            experience: 8,
        }
    }
}

impl UmpireTendencies {
    /// zone deviation from neutral as a signed fraction
    pub fn zone_dev(&self) -> f64 {
        if self.strike_zone_size.is_finite() {
            (self.strike_zone_size.clamp(50.0, 150.0) - 100.0) / 100.0
        } else {
            0.0
        }
    }
}
