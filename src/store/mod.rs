use crate::model::BattingProfile;
use crate::model::Game;
use crate::model::Hand;
use crate::model::ParkFactors;
use crate::model::PitchingProfile;
use crate::model::Player;
use crate::model::Position;
use crate::model::Stadium;
use crate::model::Team;
use crate::model::UmpireTendencies;
use crate::model::stadium::Roof;
use crate::model::stadium::Surface;
use const_format::concatcp;
use std::sync::Arc;
use tokio_postgres::Client;
use tokio_postgres::Row;
use uuid::Uuid;

pub const GAMES: &str = "games";
pub const TEAMS: &str = "teams";
pub const PLAYERS: &str = "players";
pub const ROSTERS: &str = "rosters";
pub const PLAYER_STATS: &str = "player_season_stats";
pub const STADIUMS: &str = "stadiums";
pub const PARK_FACTORS: &str = "park_factors";
pub const UMPIRES: &str = "umpire_tendencies";
pub const RUNS: &str = "simulation_runs";

#[rustfmt::skip]
const SELECT_GAME: &str = concatcp!(
    "SELECT id, date, season, home_team_id, away_team_id, stadium_id, umpire_id ",
    "FROM   ", GAMES, " ",
    "WHERE  id = $1"
);
#[rustfmt::skip]
const SELECT_TEAM: &str = concatcp!(
    "SELECT id, name, league, division, stadium_id ",
    "FROM   ", TEAMS, " ",
    "WHERE  id = $1"
);
#[rustfmt::skip]
const SELECT_ROSTER: &str = concatcp!(
    "SELECT p.id, p.name, p.position, p.bats, p.throws, p.age ",
    "FROM   ", ROSTERS, " r ",
    "JOIN   ", PLAYERS, " p ON p.id = r.player_id ",
    "WHERE  r.team_id = $1 AND r.season = $2"
);
#[rustfmt::skip]
const SELECT_STATS: &str = concatcp!(
    "SELECT stats ",
    "FROM   ", PLAYER_STATS, " ",
    "WHERE  player_id = $1 AND season = $2 AND stats_type = $3"
);
#[rustfmt::skip]
const SELECT_STADIUM: &str = concatcp!(
    "SELECT id, name, distances, wall_heights, altitude_ft, surface, roof, ",
    "       latitude, longitude ",
    "FROM   ", STADIUMS, " ",
    "WHERE  id = $1"
);
#[rustfmt::skip]
const SELECT_PARK: &str = concatcp!(
    "SELECT runs, hr, hits, doubles, triples, babip, k, bb, lhb_hr, rhb_hr ",
    "FROM   ", PARK_FACTORS, " ",
    "WHERE  stadium_id = $1"
);
#[rustfmt::skip]
const SELECT_UMPIRE: &str = concatcp!(
    "SELECT id, name, strike_zone_size, edge_tendency, k_rate_adj, bb_rate_adj, ",
    "       consistency, count_tendency, high_leverage_tendency, experience ",
    "FROM   ", UMPIRES, " ",
    "WHERE  id = $1"
);

/// read access to the reference entities the ingest pipeline maintains,
/// plus ownership of the simulation-run table. a single pipelined
/// client serves the whole process.
#[derive(Clone)]
pub struct Store(Arc<Client>);

impl From<Arc<Client>> for Store {
    fn from(client: Arc<Client>) -> Self {
        Self(client)
    }
}

impl Store {
    pub fn client(&self) -> &Client {
        &self.0
    }

    /// create the tables this service owns; reference tables belong to
    /// the ingest service and are never created here
    pub async fn bootstrap(&self) -> anyhow::Result<()> {
        log::info!("ensuring simulation tables exist");
        self.0
            .batch_execute(concatcp!(
                "CREATE TABLE IF NOT EXISTS ", RUNS, " (
                    id           UUID PRIMARY KEY,
                    game_id      UUID NOT NULL,
                    total        BIGINT NOT NULL,
                    completed    BIGINT NOT NULL DEFAULT 0,
                    status       TEXT NOT NULL,
                    reason       TEXT,
                    failure_kind TEXT,
                    config       JSONB NOT NULL,
                    aggregate    JSONB,
                    created_at   TIMESTAMPTZ NOT NULL,
                    completed_at TIMESTAMPTZ
                );
                CREATE INDEX IF NOT EXISTS simulation_runs_game_idx
                    ON ", RUNS, " (game_id);"
            ))
            .await?;
        Ok(())
    }

    pub async fn ping(&self) -> bool {
        self.0.query_one("SELECT 1", &[]).await.is_ok()
    }

    pub async fn game(&self, id: Uuid) -> anyhow::Result<Option<Game>> {
        let row = self.0.query_opt(SELECT_GAME, &[&id]).await?;
        Ok(row.map(|row| Game {
            id: row.get("id"),
            date: row.get("date"),
            season: row.get("season"),
            home_team_id: row.get("home_team_id"),
            away_team_id: row.get("away_team_id"),
            stadium_id: row.try_get("stadium_id").ok(),
            umpire_id: row.try_get("umpire_id").ok(),
        }))
    }

    pub async fn team(&self, id: Uuid) -> anyhow::Result<Option<Team>> {
        let row = self.0.query_opt(SELECT_TEAM, &[&id]).await?;
        Ok(row.map(|row| Team {
            id: row.get("id"),
            name: row.get("name"),
            league: row.try_get("league").unwrap_or_default(),
            division: row.try_get("division").unwrap_or_default(),
            stadium_id: row.try_get("stadium_id").ok(),
        }))
    }

    pub async fn roster_players(&self, team_id: Uuid, season: i32) -> anyhow::Result<Vec<Player>> {
        let rows = self.0.query(SELECT_ROSTER, &[&team_id, &season]).await?;
        Ok(rows.iter().map(player_from_row).collect())
    }

    pub async fn batting(
        &self,
        player_id: Uuid,
        season: i32,
    ) -> anyhow::Result<Option<BattingProfile>> {
        let row = self
            .0
            .query_opt(SELECT_STATS, &[&player_id, &season, &"batting"])
            .await?;
        Ok(row.and_then(|row| {
            let stats: serde_json::Value = row.get("stats");
            serde_json::from_value(stats).ok()
        }))
    }

    pub async fn pitching(
        &self,
        player_id: Uuid,
        season: i32,
    ) -> anyhow::Result<Option<PitchingProfile>> {
        let row = self
            .0
            .query_opt(SELECT_STATS, &[&player_id, &season, &"pitching"])
            .await?;
        Ok(row.and_then(|row| {
            let stats: serde_json::Value = row.get("stats");
            serde_json::from_value(stats).ok()
        }))
    }

    pub async fn stadium(&self, id: Uuid) -> anyhow::Result<Option<Stadium>> {
        let row = self.0.query_opt(SELECT_STADIUM, &[&id]).await?;
        Ok(row.map(|row| stadium_from_row(&row)))
    }

    pub async fn park_factors(&self, stadium_id: Uuid) -> anyhow::Result<Option<ParkFactors>> {
        let row = self.0.query_opt(SELECT_PARK, &[&stadium_id]).await?;
        Ok(row.map(|row| {
            ParkFactors {
                runs: factor(&row, "runs"),
                hr: factor(&row, "hr"),
                hits: factor(&row, "hits"),
                doubles: factor(&row, "doubles"),
                triples: factor(&row, "triples"),
                babip: factor(&row, "babip"),
                k: factor(&row, "k"),
                bb: factor(&row, "bb"),
                lhb_hr: factor(&row, "lhb_hr"),
                rhb_hr: factor(&row, "rhb_hr"),
            }
            .clamped()
        }))
    }

    pub async fn umpire(&self, id: Uuid) -> anyhow::Result<Option<UmpireTendencies>> {
        let row = self.0.query_opt(SELECT_UMPIRE, &[&id]).await?;
        Ok(row.map(|row| {
            let neutral = UmpireTendencies::default();
            UmpireTendencies {
                id: row.get("id"),
                name: row.try_get("name").unwrap_or_else(|_| neutral.name.clone()),
                strike_zone_size: row
                    .try_get("strike_zone_size")
                    .unwrap_or(neutral.strike_zone_size),
                edge_tendency: row.try_get("edge_tendency").unwrap_or(neutral.edge_tendency),
                k_rate_adj: row.try_get("k_rate_adj").unwrap_or(neutral.k_rate_adj),
                bb_rate_adj: row.try_get("bb_rate_adj").unwrap_or(neutral.bb_rate_adj),
                consistency: row.try_get("consistency").unwrap_or(neutral.consistency),
                count_tendency: row.try_get("count_tendency").unwrap_or(neutral.count_tendency),
                high_leverage_tendency: row
                    .try_get("high_leverage_tendency")
                    .unwrap_or(neutral.high_leverage_tendency),
                experience: row
                    .try_get::<_, i32>("experience")
                    .map(|years| years.clamp(0, 60) as u8)
                    .unwrap_or(neutral.experience),
            }
        }))
    }
}

fn player_from_row(row: &Row) -> Player {
    Player {
        id: row.get("id"),
        name: row.get("name"),
        position: row
            .try_get::<_, String>("position")
            .ok()
            .and_then(|p| Position::try_from(p.as_str()).ok())
            .unwrap_or(Position::DH),
        bats: hand(row, "bats", Hand::R),
        throws: hand(row, "throws", Hand::R),
        age: row
            .try_get::<_, i32>("age")
            .map(|age| age.clamp(16, 60) as u8)
            .unwrap_or(27),
    }
}

fn stadium_from_row(row: &Row) -> Stadium {
    let neutral = Stadium::default();
    let distances = dimensions(row, "distances", neutral.distances);
    let wall_heights = dimensions(row, "wall_heights", neutral.wall_heights);
    Stadium {
        id: row.get("id"),
        name: row.try_get("name").unwrap_or(neutral.name),
        distances,
        wall_heights,
        altitude_ft: row.try_get("altitude_ft").unwrap_or(neutral.altitude_ft),
        surface: match row.try_get::<_, String>("surface").as_deref() {
            Ok("artificial") => Surface::Artificial,
            _ => Surface::Natural,
        },
        roof: match row.try_get::<_, String>("roof").as_deref() {
            Ok("closed") => Roof::Closed,
            Ok("retractable") => Roof::Retractable,
            _ => Roof::Open,
        },
        latitude: row.try_get("latitude").unwrap_or(neutral.latitude),
        longitude: row.try_get("longitude").unwrap_or(neutral.longitude),
    }
}

fn dimensions(row: &Row, column: &str, fallback: [u16; 5]) -> [u16; 5] {
    row.try_get::<_, Vec<i32>>(column)
        .ok()
        .filter(|values| values.len() == 5)
        .map(|values| {
            let mut out = fallback;
            for (slot, value) in out.iter_mut().zip(values) {
                *slot = value.clamp(0, 1_000) as u16;
            }
            out
        })
        .unwrap_or(fallback)
}

fn hand(row: &Row, column: &str, fallback: Hand) -> Hand {
    row.try_get::<_, String>(column)
        .ok()
        .and_then(|h| Hand::try_from(h.as_str()).ok())
        .unwrap_or(fallback)
}

fn factor(row: &Row, column: &str) -> f64 {
    row.try_get(column).unwrap_or(100.0)
}
