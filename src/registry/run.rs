use crate::montecarlo::Aggregate;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
        }
    }

    pub fn terminal(self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Failed)
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// why a run ended in `Failed`; kept machine-readable so the boundary
/// can tell a cancellation from a timeout from a genuine error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Cancelled,
    Timeout,
    Internal,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::Cancelled => "cancelled",
            FailureKind::Timeout => "timeout",
            FailureKind::Internal => "internal",
        }
    }
}

impl From<&str> for FailureKind {
    fn from(s: &str) -> Self {
        match s {
            "cancelled" => FailureKind::Cancelled,
            "timeout" => FailureKind::Timeout,
            _ => FailureKind::Internal,
        }
    }
}

/// the caller-visible knobs of a run, snapshotted at creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RunConfig {
    pub workers: Option<usize>,
    pub seed: Option<u64>,
    pub budget_secs: Option<u64>,
}

/// one run's lifecycle record. the cancellation flag is shared with the
/// worker pool; the aggregate is cached here after completion.
#[derive(Debug, Clone)]
pub struct SimulationRun {
    pub id: Uuid,
    pub game_id: Uuid,
    pub total: usize,
    pub completed: usize,
    pub status: RunStatus,
    pub reason: Option<String>,
    pub failure: Option<FailureKind>,
    pub config: RunConfig,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancel: Arc<AtomicBool>,
    pub aggregate: Option<Arc<Aggregate>>,
}

impl SimulationRun {
    pub fn new(game_id: Uuid, total: usize, config: RunConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            game_id,
            total,
            completed: 0,
            status: RunStatus::Queued,
            reason: None,
            failure: None,
            config,
            created_at: Utc::now(),
            completed_at: None,
            cancel: Arc::new(AtomicBool::new(false)),
            aggregate: None,
        }
    }
}
