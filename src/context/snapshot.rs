use crate::model::ParkFactors;
use crate::model::Stadium;
use crate::model::UmpireTendencies;
use crate::model::Weather;

/// immutable environment snapshot captured at run creation and shared
/// read-only across every worker of the run
#[derive(Debug, Clone, PartialEq)]
pub struct GameContext {
    pub weather: Weather,
    pub park: ParkFactors,
    pub umpire: UmpireTendencies,
    pub stadium: Stadium,
}

impl Default for GameContext {
    fn default() -> Self {
        Self::neutral()
    }
}

impl GameContext {
    pub fn neutral() -> Self {
        Self {
            weather: Weather::default(),
            park: ParkFactors::default(),
            umpire: UmpireTendencies::default(),
            stadium: Stadium::default(),
        }
    }
}
