pub mod run;

pub use run::FailureKind;
pub use run::RunConfig;
pub use run::RunStatus;
pub use run::SimulationRun;

use crate::montecarlo::Aggregate;
use crate::store::RUNS;
use crate::store::Store;
use chrono::DateTime;
use chrono::Duration as ChronoDuration;
use chrono::Utc;
use const_format::concatcp;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::RwLock;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use uuid::Uuid;

const RETENTION_HOURS: i64 = 24;

#[rustfmt::skip]
const INSERT_RUN: &str = concatcp!(
    "INSERT INTO ", RUNS, " ",
    "(id, game_id, total, completed, status, config, created_at) ",
    "VALUES ($1, $2, $3, $4, $5, $6, $7)"
);
#[rustfmt::skip]
const TRANSITION_RUN: &str = concatcp!(
    "UPDATE ", RUNS, " ",
    "SET    status = $3, completed = $4, reason = $5, failure_kind = $6, ",
    "       aggregate = $7, completed_at = $8 ",
    "WHERE  id = $1 AND status = $2"
);
#[rustfmt::skip]
const SELECT_RUN_RESULT: &str = concatcp!(
    "SELECT status, reason, failure_kind, aggregate ",
    "FROM   ", RUNS, " ",
    "WHERE  id = $1"
);
#[rustfmt::skip]
const SELECT_RUN_STATUS: &str = concatcp!(
    "SELECT id, status, completed, total, reason, created_at, completed_at ",
    "FROM   ", RUNS, " ",
    "WHERE  id = $1"
);

/// whether a game id is actually on the league schedule. the registry
/// refuses to queue runs for games nobody scheduled.
#[async_trait::async_trait]
pub trait Schedule: Send + Sync {
    async fn scheduled(&self, game_id: Uuid) -> anyhow::Result<bool>;
}

#[async_trait::async_trait]
impl Schedule for Store {
    async fn scheduled(&self, game_id: Uuid) -> anyhow::Result<bool> {
        Ok(self.game(game_id).await?.is_some())
    }
}

/// storeless registries (offline exhibitions) have no schedule to
/// consult and accept any game id
struct OpenSchedule;

#[async_trait::async_trait]
impl Schedule for OpenSchedule {
    async fn scheduled(&self, _: Uuid) -> anyhow::Result<bool> {
        Ok(true)
    }
}

/// admission failures from `create`
#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    #[error("simulation count must be between 1 and {}", crate::MAX_SIMULATIONS)]
    InvalidCount(usize),
    #[error("game {0} is not on the schedule")]
    UnknownGame(Uuid),
    #[error("reference store unavailable: {0}")]
    Store(anyhow::Error),
}

/// outcome of a result lookup
#[derive(Debug)]
pub enum Lookup {
    Ready(Arc<Aggregate>),
    NotReady,
    Failed { kind: FailureKind, reason: Option<String> },
    Missing,
}

/// a snapshot of a run's lifecycle for the status endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct StatusView {
    pub id: Uuid,
    pub status: RunStatus,
    pub completed: usize,
    pub total: usize,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub reason: Option<String>,
}

/// run lifecycle owner: an RwLocked in-memory index for fast lookups
/// and conditional single-row updates for durability. durable writes
/// are guarded by the expected prior status so concurrent completion
/// attempts cannot clobber each other.
pub struct Registry {
    runs: RwLock<HashMap<Uuid, SimulationRun>>,
    store: Option<Store>,
    schedule: Box<dyn Schedule>,
}

impl Registry {
    /// a store-backed registry checks game existence against that
    /// store and persists run rows through it
    pub fn new(store: Option<Store>) -> Self {
        let schedule: Box<dyn Schedule> = match &store {
            Some(store) => Box::new(store.clone()),
            None => Box::new(OpenSchedule),
        };
        Self::with_schedule(store, schedule)
    }

    pub fn with_schedule(store: Option<Store>, schedule: Box<dyn Schedule>) -> Self {
        Self { runs: RwLock::new(HashMap::new()), store, schedule }
    }

    /// validate the run size, verify the game is scheduled, and record
    /// the queued run
    pub async fn create(
        &self,
        game_id: Uuid,
        total: usize,
        config: RunConfig,
    ) -> Result<Uuid, CreateError> {
        if total == 0 || total > crate::MAX_SIMULATIONS {
            return Err(CreateError::InvalidCount(total));
        }
        match self.schedule.scheduled(game_id).await {
            Ok(true) => {}
            Ok(false) => return Err(CreateError::UnknownGame(game_id)),
            Err(e) => return Err(CreateError::Store(e)),
        }
        let run = SimulationRun::new(game_id, total, config);
        let id = run.id;
        if let Some(store) = &self.store {
            store
                .client()
                .execute(
                    INSERT_RUN,
                    &[
                        &run.id,
                        &run.game_id,
                        &(run.total as i64),
                        &0_i64,
                        &run.status.as_str(),
                        &serde_json::to_value(&run.config)
                            .map_err(|e| CreateError::Store(e.into()))?,
                        &run.created_at,
                    ],
                )
                .await
                .map_err(|e| CreateError::Store(e.into()))?;
        }
        self.write().insert(id, run);
        log::info!("run {} queued", id);
        Ok(id)
    }

    /// queued -> running; idempotent when already running
    pub async fn start(&self, id: Uuid) -> anyhow::Result<()> {
        let status = self.status_of(id)?;
        match status {
            RunStatus::Running => return Ok(()),
            RunStatus::Queued => {}
            terminal => anyhow::bail!("cannot start a {} run", terminal),
        }
        self.persist_transition(id, RunStatus::Queued, RunStatus::Running, 0, None, None, None)
            .await?;
        if let Some(run) = self.write().get_mut(&id) {
            run.status = RunStatus::Running;
        }
        Ok(())
    }

    /// monotonic in-memory progress; regressions are rejected
    pub fn update_progress(&self, id: Uuid, completed: usize) -> bool {
        let mut runs = self.write();
        match runs.get_mut(&id) {
            Some(run) if run.status == RunStatus::Running && completed >= run.completed => {
                run.completed = completed.min(run.total);
                true
            }
            _ => false,
        }
    }

    /// running -> completed; the aggregate rides the same conditional
    /// write as the status flip
    pub async fn complete(&self, id: Uuid, aggregate: Aggregate) -> anyhow::Result<()> {
        match self.status_of(id)? {
            RunStatus::Running => {}
            status => anyhow::bail!("cannot complete a {} run", status),
        }
        let finished = Utc::now();
        let completed = aggregate.total_simulations as usize;
        self.persist_transition(
            id,
            RunStatus::Running,
            RunStatus::Completed,
            completed as i64,
            None,
            None,
            Some(&aggregate),
        )
        .await?;
        if let Some(run) = self.write().get_mut(&id) {
            run.status = RunStatus::Completed;
            run.completed = completed;
            run.completed_at = Some(finished);
            run.aggregate = Some(Arc::new(aggregate));
        }
        log::info!("run {} completed", id);
        Ok(())
    }

    /// any -> failed, with a persisted kind and reason; partial
    /// aggregates are discarded
    pub async fn fail(&self, id: Uuid, kind: FailureKind, reason: &str) -> anyhow::Result<()> {
        let status = self.status_of(id)?;
        if status == RunStatus::Failed {
            return Ok(());
        }
        self.persist_transition(id, status, RunStatus::Failed, 0, Some(reason), Some(kind), None)
            .await?;
        if let Some(run) = self.write().get_mut(&id) {
            run.status = RunStatus::Failed;
            run.reason = Some(reason.to_string());
            run.failure = Some(kind);
            run.completed_at = Some(Utc::now());
            run.aggregate = None;
        }
        log::warn!("run {} failed ({}): {}", id, kind.as_str(), reason);
        Ok(())
    }

    pub fn status(&self, id: Uuid) -> Option<StatusView> {
        self.read().get(&id).map(|run| StatusView {
            id: run.id,
            status: run.status,
            completed: run.completed,
            total: run.total,
            created_at: run.created_at,
            completed_at: run.completed_at,
            reason: run.reason.clone(),
        })
    }

    /// status from memory, falling back to the durable row for runs
    /// already evicted by the retention sweep
    pub async fn status_lookup(&self, id: Uuid) -> Option<StatusView> {
        if let Some(view) = self.status(id) {
            return Some(view);
        }
        let store = self.store.as_ref()?;
        let row = store.client().query_opt(SELECT_RUN_STATUS, &[&id]).await.ok()??;
        let status = match row.get::<_, String>("status").as_str() {
            "queued" => RunStatus::Queued,
            "running" => RunStatus::Running,
            "completed" => RunStatus::Completed,
            _ => RunStatus::Failed,
        };
        Some(StatusView {
            id: row.get("id"),
            status,
            completed: row.get::<_, i64>("completed").max(0) as usize,
            total: row.get::<_, i64>("total").max(0) as usize,
            created_at: row.get("created_at"),
            completed_at: row.try_get("completed_at").ok(),
            reason: row.try_get("reason").ok(),
        })
    }

    pub async fn result(&self, id: Uuid) -> Lookup {
        let cached = {
            let runs = self.read();
            match runs.get(&id) {
                Some(run) => match run.status {
                    RunStatus::Completed => run.aggregate.clone().map(Lookup::Ready),
                    RunStatus::Failed => Some(Lookup::Failed {
                        kind: run.failure.unwrap_or(FailureKind::Internal),
                        reason: run.reason.clone(),
                    }),
                    _ => Some(Lookup::NotReady),
                },
                None => None,
            }
        };
        if let Some(found) = cached {
            return found;
        }
        // evicted from memory; persisted rows outlive the 24 h window
        if let Some(store) = &self.store {
            if let Ok(Some(row)) = store.client().query_opt(SELECT_RUN_RESULT, &[&id]).await {
                let status: String = row.get("status");
                return match status.as_str() {
                    "completed" => row
                        .try_get::<_, serde_json::Value>("aggregate")
                        .ok()
                        .and_then(|value| serde_json::from_value(value).ok())
                        .map(|aggregate| Lookup::Ready(Arc::new(aggregate)))
                        .unwrap_or(Lookup::Missing),
                    "failed" => Lookup::Failed {
                        kind: row
                            .try_get::<_, String>("failure_kind")
                            .map(|kind| FailureKind::from(kind.as_str()))
                            .unwrap_or(FailureKind::Internal),
                        reason: row.try_get("reason").ok(),
                    },
                    _ => Lookup::NotReady,
                };
            }
        }
        Lookup::Missing
    }

    /// raise the cancellation flag; a queued run fails immediately,
    /// a running one is failed by its orchestrator when the workers
    /// observe the flag
    pub async fn cancel(&self, id: Uuid) -> Option<RunStatus> {
        let (status, flag) = {
            let runs = self.read();
            let run = runs.get(&id)?;
            (run.status, run.cancel.clone())
        };
        flag.store(true, Ordering::Relaxed);
        if status == RunStatus::Queued {
            let _ = self
                .fail(id, FailureKind::Cancelled, "cancelled before start")
                .await;
        }
        Some(status)
    }

    pub fn cancel_flag(&self, id: Uuid) -> Option<Arc<AtomicBool>> {
        self.read().get(&id).map(|run| run.cancel.clone())
    }

    /// drop terminal runs older than the retention window from memory;
    /// their rows remain in the store
    pub fn sweep(&self) -> usize {
        let horizon = Utc::now() - ChronoDuration::hours(RETENTION_HOURS);
        let mut runs = self.write();
        let before = runs.len();
        runs.retain(|_, run| {
            !run.status.terminal() || run.completed_at.map(|at| at > horizon).unwrap_or(true)
        });
        before - runs.len()
    }

    pub fn in_memory(&self) -> usize {
        self.read().len()
    }

    fn status_of(&self, id: Uuid) -> anyhow::Result<RunStatus> {
        self.read()
            .get(&id)
            .map(|run| run.status)
            .ok_or_else(|| anyhow::anyhow!("unknown run {}", id))
    }

    #[allow(clippy::too_many_arguments)]
    async fn persist_transition(
        &self,
        id: Uuid,
        from: RunStatus,
        to: RunStatus,
        completed: i64,
        reason: Option<&str>,
        kind: Option<FailureKind>,
        aggregate: Option<&Aggregate>,
    ) -> anyhow::Result<()> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        let payload = match aggregate {
            Some(aggregate) => Some(serde_json::to_value(aggregate)?),
            None => None,
        };
        let finished = to.terminal().then(Utc::now);
        let updated = store
            .client()
            .execute(
                TRANSITION_RUN,
                &[
                    &id,
                    &from.as_str(),
                    &to.as_str(),
                    &completed,
                    &reason,
                    &kind.map(|kind| kind.as_str()),
                    &payload,
                    &finished,
                ],
            )
            .await?;
        if updated == 0 {
            anyhow::bail!("run {} was not in status {} (lost update prevented)", id, from);
        }
        Ok(())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<Uuid, SimulationRun>> {
        self.runs.read().expect("registry lock")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<Uuid, SimulationRun>> {
        self.runs.write().expect("registry lock")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::montecarlo::AggregateBuilder;

    struct FixedSchedule(Vec<Uuid>);

    #[async_trait::async_trait]
    impl Schedule for FixedSchedule {
        async fn scheduled(&self, game_id: Uuid) -> anyhow::Result<bool> {
            Ok(self.0.contains(&game_id))
        }
    }

    fn registry_for(game: Uuid) -> Registry {
        Registry::with_schedule(None, Box::new(FixedSchedule(vec![game])))
    }

    fn aggregate(run_id: Uuid) -> Aggregate {
        AggregateBuilder::new(run_id).finish()
    }

    #[tokio::test]
    async fn lifecycle_happy_path() {
        let game = Uuid::new_v4();
        let registry = registry_for(game);
        let id = registry.create(game, 100, RunConfig::default()).await.unwrap();
        assert_eq!(registry.status(id).unwrap().status, RunStatus::Queued);
        registry.start(id).await.unwrap();
        registry.start(id).await.unwrap(); // idempotent
        assert!(registry.update_progress(id, 50));
        registry.complete(id, aggregate(id)).await.unwrap();
        let view = registry.status(id).unwrap();
        assert_eq!(view.status, RunStatus::Completed);
        assert!(view.completed_at.is_some());
        match registry.result(id).await {
            Lookup::Ready(_) => {}
            other => panic!("expected result, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn create_rejects_out_of_range_counts() {
        let game = Uuid::new_v4();
        let registry = registry_for(game);
        match registry.create(game, 0, RunConfig::default()).await {
            Err(CreateError::InvalidCount(0)) => {}
            other => panic!("expected count rejection, got {:?}", other.map(|_| ())),
        }
        assert!(
            registry
                .create(game, crate::MAX_SIMULATIONS + 1, RunConfig::default())
                .await
                .is_err()
        );
        assert!(
            registry
                .create(game, crate::MAX_SIMULATIONS, RunConfig::default())
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn create_rejects_unscheduled_games() {
        let game = Uuid::new_v4();
        let registry = registry_for(game);
        match registry.create(Uuid::new_v4(), 10, RunConfig::default()).await {
            Err(CreateError::UnknownGame(_)) => {}
            other => panic!("expected unknown game, got {:?}", other.map(|_| ())),
        }
        assert!(registry.create(game, 10, RunConfig::default()).await.is_ok());
    }

    #[tokio::test]
    async fn progress_rejects_regressions() {
        let game = Uuid::new_v4();
        let registry = registry_for(game);
        let id = registry.create(game, 100, RunConfig::default()).await.unwrap();
        assert!(!registry.update_progress(id, 10), "not running yet");
        registry.start(id).await.unwrap();
        assert!(registry.update_progress(id, 40));
        assert!(!registry.update_progress(id, 30));
        assert_eq!(registry.status(id).unwrap().completed, 40);
    }

    #[tokio::test]
    async fn completed_runs_cannot_restart() {
        let game = Uuid::new_v4();
        let registry = registry_for(game);
        let id = registry.create(game, 10, RunConfig::default()).await.unwrap();
        registry.start(id).await.unwrap();
        registry.complete(id, aggregate(id)).await.unwrap();
        assert!(registry.start(id).await.is_err());
        assert!(registry.complete(id, aggregate(id)).await.is_err());
    }

    #[tokio::test]
    async fn cancelling_a_queued_run_fails_it_immediately() {
        let game = Uuid::new_v4();
        let registry = registry_for(game);
        let id = registry.create(game, 10, RunConfig::default()).await.unwrap();
        registry.cancel(id).await.unwrap();
        let view = registry.status(id).unwrap();
        assert_eq!(view.status, RunStatus::Failed);
        match registry.result(id).await {
            Lookup::Failed { kind, reason } => {
                assert_eq!(kind, FailureKind::Cancelled);
                assert!(reason.unwrap().contains("cancelled"));
            }
            other => panic!("expected failed lookup, got {:?}", other),
        }
        // no aggregate was persisted
        assert!(registry.cancel_flag(id).unwrap().load(Ordering::Relaxed));
    }

    #[tokio::test]
    async fn failed_runs_keep_their_kind_and_discard_partials() {
        let game = Uuid::new_v4();
        let registry = registry_for(game);
        let id = registry.create(game, 10, RunConfig::default()).await.unwrap();
        registry.start(id).await.unwrap();
        registry.update_progress(id, 5);
        registry
            .fail(id, FailureKind::Timeout, "worker pool exceeded budget")
            .await
            .unwrap();
        match registry.result(id).await {
            Lookup::Failed { kind, reason } => {
                assert_eq!(kind, FailureKind::Timeout);
                assert!(reason.unwrap().contains("budget"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn sweep_keeps_active_and_recent_runs() {
        let game = Uuid::new_v4();
        let registry = registry_for(game);
        let active = registry.create(game, 10, RunConfig::default()).await.unwrap();
        let stale = registry.create(game, 10, RunConfig::default()).await.unwrap();
        registry.start(stale).await.unwrap();
        registry.fail(stale, FailureKind::Internal, "boom").await.unwrap();
        // age the failed run past the retention window
        registry
            .write()
            .get_mut(&stale)
            .unwrap()
            .completed_at = Some(Utc::now() - ChronoDuration::hours(25));
        assert_eq!(registry.sweep(), 1);
        assert!(registry.status(active).is_some());
        assert!(registry.status(stale).is_none());
    }
}
