use crate::registry::RunConfig;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateSimulation {
    pub game_id: String,
    pub simulation_runs: Option<usize>,
    #[serde(default)]
    pub config: Option<RunConfig>,
}

/// common query parameters on proxied reference listings
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListQuery {
    pub season: Option<i32>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub q: Option<String>,
}
