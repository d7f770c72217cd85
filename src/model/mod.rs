pub mod game;
pub mod park;
pub mod player;
pub mod profile;
pub mod stadium;
pub mod team;
pub mod umpire;
pub mod weather;

pub use game::Game;
pub use park::ParkFactors;
pub use player::Hand;
pub use player::Player;
pub use player::Position;
pub use profile::BattingProfile;
pub use profile::BattingSplit;
pub use profile::PitchingProfile;
pub use profile::PitchingSplit;
pub use stadium::Stadium;
pub use team::Team;
pub use umpire::UmpireTendencies;
pub use weather::Weather;
pub use weather::WindDir;
