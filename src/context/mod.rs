pub mod snapshot;
pub mod weather;

pub use snapshot::GameContext;
pub use weather::Forecast;
pub use weather::HttpForecast;
pub use weather::WeatherService;

use crate::model::Game;
use crate::store::Store;

/// capture the immutable environment snapshot for a run: stadium
/// dimensions, park factors, umpire tendencies, and a weather reading.
/// every lookup degrades to its neutral default when absent.
pub async fn capture(store: &Store, weather: &WeatherService, game: &Game) -> GameContext {
    let stadium = match game.stadium_id {
        Some(id) => store.stadium(id).await.ok().flatten().unwrap_or_default(),
        None => Default::default(),
    };
    let park = store
        .park_factors(stadium.id)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
        .clamped();
    let umpire = match game.umpire_id {
        Some(id) => store.umpire(id).await.ok().flatten().unwrap_or_default(),
        None => Default::default(),
    };
    let weather = weather.get(&stadium, game.date).await;
    GameContext { weather, park, umpire, stadium }
}
