//! Gateway Binary
//!
//! Runs the HTTP gateway: simulation lifecycle endpoints, reference
//! proxying, and the embedded run orchestration.

use dugout::config::Settings;
use dugout::gateway::Server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dugout::log();
    let settings = Settings::from_env()?;
    Server::run(settings).await
}
