//! Simulate Binary
//!
//! One-shot Monte Carlo run from the command line. Loads a scheduled
//! game from the reference store, or plays a league-average exhibition
//! offline, and prints the aggregate as JSON.

use clap::Parser;
use dugout::config::Settings;
use dugout::context;
use dugout::context::GameContext;
use dugout::montecarlo::RunSpec;
use dugout::montecarlo::Runner;
use dugout::roster::Roster;
use dugout::roster::loader::RosterLoader;
use dugout::store::Store;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;
use uuid::Uuid;

#[derive(Parser)]
#[command(about = "run a Monte Carlo simulation of one game")]
struct Args {
    /// game id in the reference store; omitted, plays a league-average
    /// exhibition with no database
    #[arg(long)]
    game: Option<Uuid>,
    /// number of independent simulations
    #[arg(long)]
    runs: Option<usize>,
    /// worker threads
    #[arg(long)]
    workers: Option<usize>,
    /// run-level seed for reproducible aggregates
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dugout::log();
    let args = Args::parse();
    let settings = Settings::from_env()?;
    let (home, away, ctx) = match args.game {
        Some(game_id) => {
            let store = Store::from(dugout::db(&settings.db_url).await?);
            let game = store
                .game(game_id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("game {} not found", game_id))?;
            let (home, away) = RosterLoader::from(&store).load(&game).await?;
            let forecast = context::HttpForecast::new(
                settings.weather_url.clone(),
                settings.request_timeout,
            )?;
            let weather = context::WeatherService::new(Box::new(forecast));
            let ctx = context::capture(&store, &weather, &game).await;
            (home, away, ctx)
        }
        None => {
            log::info!("no game id given, playing a league-average exhibition");
            (
                Roster::league_average("home"),
                Roster::league_average("away"),
                GameContext::neutral(),
            )
        }
    };
    let spec = RunSpec {
        run_id: Uuid::new_v4(),
        home: Arc::new(home),
        away: Arc::new(away),
        ctx: Arc::new(ctx),
        n: args.runs.unwrap_or(settings.simulation_runs),
        workers: args.workers.unwrap_or(settings.sim_workers),
        seed: args.seed,
        budget: Duration::from_secs(3_600),
        cancel: Arc::new(AtomicBool::new(false)),
    };
    log::info!("simulating {} games on {} workers", spec.n, spec.workers);
    let aggregate = tokio::task::spawn_blocking(move || {
        Runner::run(&spec, &|done| {
            if done % 1_000 == 0 {
                log::info!("{} simulations complete", done);
            }
        })
    })
    .await??;
    println!("{}", serde_json::to_string_pretty(&aggregate)?);
    Ok(())
}
