use crate::model::Hand;
use serde::Deserialize;
use serde::Serialize;

/// per-stadium outcome multipliers, 100 = league neutral.
/// values are clamped into [50, 200] on construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParkFactors {
    pub runs: f64,
    pub hr: f64,
    pub hits: f64,
    pub doubles: f64,
    pub triples: f64,
    pub babip: f64,
    pub k: f64,
    pub bb: f64,
    pub lhb_hr: f64,
    pub rhb_hr: f64,
}

impl Default for ParkFactors {
    fn default() -> Self {
        Self {
            runs: 100.0,
            hr: 100.0,
            hits: 100.0,
            doubles: 100.0,
            triples: 100.0,
            babip: 100.0,
            k: 100.0,
            bb: 100.0,
            lhb_hr: 100.0,
            rhb_hr: 100.0,
        }
    }
}

impl ParkFactors {
    pub fn clamped(mut self) -> Self {
        for factor in [
            &mut self.runs,
            &mut self.hr,
            &mut self.hits,
            &mut self.doubles,
            &mut self.triples,
            &mut self.babip,
            &mut self.k,
            &mut self.bb,
            &mut self.lhb_hr,
            &mut self.rhb_hr,
        ] {
            *factor = if factor.is_finite() {
                factor.clamp(50.0, 200.0)
            } else {
                100.0
            };
        }
        self
    }

    pub fn hr_factor(&self, batting_side: Hand) -> f64 {
        let hand = match batting_side {
            Hand::L => self.lhb_hr,
            _ => self.rhb_hr,
        };
        (self.hr / 100.0) * (hand / 100.0)
    }

    pub fn doubles_factor(&self) -> f64 {
        self.doubles / 100.0
    }

    pub fn triples_factor(&self) -> f64 {
        self.triples / 100.0
    }
}
