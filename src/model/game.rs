use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// a scheduled game as the reference store describes it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub season: i32,
    pub home_team_id: Uuid,
    pub away_team_id: Uuid,
    pub stadium_id: Option<Uuid>,
    pub umpire_id: Option<Uuid>,
}

impl Game {
    pub fn exhibition(home: Uuid, away: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            date: Utc::now(),
            season: 2025,
            home_team_id: home,
            away_team_id: away,
            stadium_id: None,
            umpire_id: None,
        }
    }
}
