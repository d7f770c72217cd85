use super::Gateway;
use super::error::ApiError;
use super::metrics::Metrics;
use super::validate;
use crate::dto::request::CreateSimulation;
use crate::dto::response::Cancelled;
use crate::dto::response::Created;
use crate::dto::response::Health;
use crate::dto::response::StatusBody;
use crate::model::Game;
use crate::montecarlo::RunError;
use crate::montecarlo::RunSpec;
use crate::montecarlo::Runner;
use crate::registry::FailureKind;
use crate::registry::Lookup;
use crate::registry::RunConfig;
use crate::registry::RunStatus;
use crate::roster::loader::RosterLoader;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::web;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub async fn create_simulation(
    gateway: web::Data<Gateway>,
    req: HttpRequest,
    body: web::Json<CreateSimulation>,
) -> Result<HttpResponse, ApiError> {
    gateway.admit(&req)?;
    let body = body.into_inner();
    let game_id = validate::uuid(&body.game_id)?;
    let total = body.simulation_runs.unwrap_or(gateway.settings.simulation_runs);
    if total == 0 || total > crate::MAX_SIMULATIONS {
        return Err(ApiError::InvalidInput(format!(
            "simulation_runs must be between 1 and {}",
            crate::MAX_SIMULATIONS
        )));
    }
    let game = gateway
        .store
        .game(game_id)
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?
        .ok_or(ApiError::NotFound)?;
    let config = body.config.unwrap_or_default();
    let run_id = gateway
        .registry
        .create(game_id, total, config.clone())
        .await?;
    Metrics::bump(&gateway.metrics.runs_created);
    tokio::spawn(execute(gateway.clone(), run_id, game, total, config));
    Ok(HttpResponse::Accepted().json(Created { run_id, status: RunStatus::Queued }))
}

/// the run orchestration: load snapshots, hand them to the worker
/// pool on the blocking pool, persist the outcome
async fn execute(
    gateway: web::Data<Gateway>,
    run_id: Uuid,
    game: Game,
    total: usize,
    config: RunConfig,
) {
    if let Err(e) = drive(&gateway, run_id, &game, total, config).await {
        Metrics::bump(&gateway.metrics.runs_failed);
        let kind = match e.downcast_ref::<RunError>() {
            Some(RunError::Cancelled) => FailureKind::Cancelled,
            Some(RunError::Timeout) => FailureKind::Timeout,
            _ => FailureKind::Internal,
        };
        let _ = gateway.registry.fail(run_id, kind, &format!("{:#}", e)).await;
    }
}

async fn drive(
    gateway: &Gateway,
    run_id: Uuid,
    game: &Game,
    total: usize,
    config: RunConfig,
) -> anyhow::Result<()> {
    let loader = RosterLoader::from(&gateway.store);
    let (home, away) = loader.load(game).await?;
    let ctx = crate::context::capture(&gateway.store, &gateway.weather, game).await;
    gateway.registry.start(run_id).await?;
    let cancel = gateway
        .registry
        .cancel_flag(run_id)
        .ok_or_else(|| anyhow::anyhow!("run {} vanished before start", run_id))?;
    let spec = RunSpec {
        run_id,
        home: Arc::new(home),
        away: Arc::new(away),
        ctx: Arc::new(ctx),
        n: total,
        workers: config
            .workers
            .unwrap_or(gateway.settings.sim_workers)
            .clamp(1, 256),
        seed: config.seed.unwrap_or_else(rand::random),
        budget: config
            .budget_secs
            .map(Duration::from_secs)
            .unwrap_or(gateway.settings.run_budget),
        cancel,
    };
    let registry = gateway.registry.clone();
    let aggregate = tokio::task::spawn_blocking(move || {
        let progress = |done: usize| {
            registry.update_progress(run_id, done);
        };
        Runner::run(&spec, &progress)
    })
    .await??;
    Metrics::add(&gateway.metrics.sims_completed, aggregate.total_simulations);
    gateway.registry.complete(run_id, aggregate).await?;
    Ok(())
}

pub async fn run_status(
    gateway: web::Data<Gateway>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    gateway.admit(&req)?;
    let id = validate::uuid(&path)?;
    let view = gateway
        .registry
        .status_lookup(id)
        .await
        .ok_or(ApiError::NotFound)?;
    let progress_pct = if view.total > 0 {
        100.0 * view.completed as f64 / view.total as f64
    } else {
        0.0
    };
    Ok(HttpResponse::Ok().json(StatusBody {
        run_id: view.id,
        status: view.status,
        completed: view.completed,
        total: view.total,
        progress_pct,
        created_at: view.created_at,
        completed_at: view.completed_at,
        reason: view.reason,
    }))
}

pub async fn run_result(
    gateway: web::Data<Gateway>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    gateway.admit(&req)?;
    let id = validate::uuid(&path)?;
    match gateway.registry.result(id).await {
        Lookup::Ready(aggregate) => Ok(HttpResponse::Ok().json(&*aggregate)),
        Lookup::NotReady => Err(ApiError::NotReady),
        Lookup::Failed { kind, reason } => Err(match kind {
            FailureKind::Cancelled => ApiError::Cancelled { reason },
            FailureKind::Timeout => ApiError::Timeout { reason },
            FailureKind::Internal => ApiError::RunFailed { reason },
        }),
        Lookup::Missing => Err(ApiError::NotFound),
    }
}

pub async fn cancel_run(
    gateway: web::Data<Gateway>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    gateway.admit(&req)?;
    let id = validate::uuid(&path)?;
    gateway.registry.cancel(id).await.ok_or(ApiError::NotFound)?;
    let status = gateway
        .registry
        .status(id)
        .map(|view| view.status)
        .unwrap_or(RunStatus::Failed);
    Ok(HttpResponse::Accepted().json(Cancelled { run_id: id, status }))
}

pub async fn health(gateway: web::Data<Gateway>) -> HttpResponse {
    let up = gateway.store.ping().await;
    let body = Health {
        status: String::from(if up { "ok" } else { "degraded" }),
        database: String::from(if up { "up" } else { "down" }),
        time: chrono::Utc::now(),
    };
    if up {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}

pub async fn metrics(gateway: web::Data<Gateway>) -> HttpResponse {
    let up = gateway.store.ping().await;
    HttpResponse::Ok().json(serde_json::json!({
        "counters": gateway.metrics.snapshot(),
        "cache": {
            "entries": gateway.cache.lock().expect("query cache lock").len(),
            "weather_entries": gateway.weather.cached_entries(),
        },
        "registry": { "runs_in_memory": gateway.registry.in_memory() },
        "database": { "reachable": up },
    }))
}
