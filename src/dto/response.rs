use crate::registry::RunStatus;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct Created {
    pub run_id: Uuid,
    pub status: RunStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusBody {
    pub run_id: Uuid,
    pub status: RunStatus,
    pub completed: usize,
    pub total: usize,
    pub progress_pct: f64,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub database: String,
    pub time: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Cancelled {
    pub run_id: Uuid,
    pub status: RunStatus,
}

/// the uniform error envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
