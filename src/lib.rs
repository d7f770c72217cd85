pub mod cache;
pub mod config;
pub mod context;
pub mod dto;
pub mod gameplay;
pub mod gateway;
pub mod model;
pub mod montecarlo;
pub mod registry;
pub mod resolver;
pub mod roster;
pub mod store;

/// dimensional analysis types
type Probability = f64;
type Woba = f64;
type Leverage = f64;
type Score = u16;

// league-average anchors, calibrated so neutral rosters in neutral parks
// score ~4.6 runs per team per game
const LEAGUE_WOBA: Woba = 0.320;
const LEAGUE_AVG: f64 = 0.248;
const LEAGUE_OBP: f64 = 0.317;
const LEAGUE_SLG: f64 = 0.411;
const LEAGUE_ISO: f64 = 0.163;
const LEAGUE_BABIP: f64 = 0.291;
const LEAGUE_BB_RATE: Probability = 0.085;
const LEAGUE_K_RATE: Probability = 0.214;
const LEAGUE_ERA: f64 = 4.30;
const LEAGUE_WHIP: f64 = 1.31;
const LEAGUE_FIP: f64 = 4.20;
const LEAGUE_K9: f64 = 8.2;
const LEAGUE_BB9: f64 = 3.1;
const LEAGUE_HR9: f64 = 1.25;
const PA_PER_NINE: f64 = 38.0;
const HBP_RATE: Probability = 0.009;

// at-bat resolver parameters
const WOBA_FLOOR: Woba = 0.200;
const WOBA_CEILING: Woba = 0.500;
const POWER_PER_ISO: f64 = 1000.0;
const POWER_CAP: f64 = 150.0;
const MIN_SPLIT_PA: u32 = 20;
const RISP_BLEND_CAP: f64 = 0.30;
const CLUTCH_BLEND_CAP: f64 = 0.20;
const CLUTCH_LEVERAGE: Leverage = 1.5;
const ZONE_RATE_SWING: f64 = 0.5;

// monte carlo parameters
const MAX_SIMULATIONS: usize = 100_000;
const DEFAULT_SIMULATIONS: usize = 1_000;
const PROGRESS_STRIDE: usize = 100;
const TOP_EVENTS: usize = 50;
const KEY_EVENT_LEVERAGE: Leverage = 2.5;
const MAX_DISCARD_RATIO: f64 = 0.10;
const MAX_INNINGS: u8 = 25;

/// log at Info to the terminal and at Debug to a timestamped file
/// under logs/, so every process leaves a replayable trace of its runs
pub fn log() {
    let config = simplelog::ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%SZ");
    std::fs::create_dir_all("logs").expect("logs directory is writable");
    let trace = std::fs::File::create(format!("logs/dugout-{}.log", stamp))
        .expect("log file is writable");
    simplelog::CombinedLogger::init(vec![
        simplelog::TermLogger::new(
            log::LevelFilter::Info,
            config.clone(),
            simplelog::TerminalMode::Mixed,
            simplelog::ColorChoice::Auto,
        ),
        simplelog::WriteLogger::new(log::LevelFilter::Debug, config, trace),
    ])
    .expect("no logger installed yet");
}

/// get a database connection and return the client
pub async fn db(url: &str) -> anyhow::Result<std::sync::Arc<tokio_postgres::Client>> {
    log::info!("connecting to database");
    let tls = tokio_postgres::tls::NoTls;
    let (client, connection) = tokio_postgres::connect(url, tls).await?;
    tokio::spawn(connection);
    Ok(std::sync::Arc::new(client))
}
