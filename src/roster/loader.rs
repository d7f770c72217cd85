use super::Batter;
use super::Pitcher;
use super::Roster;
use crate::model::BattingProfile;
use crate::model::Game;
use crate::model::PitchingProfile;
use crate::model::Player;
use crate::model::Team;
use crate::store::Store;
use uuid::Uuid;

/// materialize both rosters for a game as immutable snapshots. missing
/// players, stats, or splits substitute league-neutral values; malformed
/// profiles are repaired and warned about once per load.
pub struct RosterLoader<'a> {
    store: &'a Store,
}

impl<'a> From<&'a Store> for RosterLoader<'a> {
    fn from(store: &'a Store) -> Self {
        Self { store }
    }
}

impl RosterLoader<'_> {
    pub async fn load(&self, game: &Game) -> anyhow::Result<(Roster, Roster)> {
        let (home, away) = tokio::try_join!(
            self.side(game.home_team_id, game.season),
            self.side(game.away_team_id, game.season),
        )?;
        Ok((home, away))
    }

    async fn side(&self, team_id: Uuid, season: i32) -> anyhow::Result<Roster> {
        let team = self
            .store
            .team(team_id)
            .await?
            .unwrap_or_else(|| Team { id: team_id, ..Team::placeholder("unknown team") });
        let players = self.store.roster_players(team_id, season).await?;
        let mut repaired = 0_u32;
        let mut batters = Vec::new();
        let mut pitchers = Vec::new();
        let stats = futures::future::join_all(
            players
                .iter()
                .map(|player| self.profile_for(player, season)),
        )
        .await;
        for (player, loaded) in players.into_iter().zip(stats) {
            match loaded {
                Loaded::Batting(mut profile) => {
                    if profile.repair() {
                        repaired += 1;
                    }
                    batters.push(Batter { player, profile });
                }
                Loaded::Pitching(mut profile) => {
                    if profile.repair() {
                        repaired += 1;
                    }
                    pitchers.push(Pitcher { player, profile });
                }
            }
        }
        if repaired > 0 {
            log::warn!(
                "{}: replaced or repaired {} malformed profiles with league-neutral values",
                team.name,
                repaired
            );
        }
        Ok(Roster::assemble(team, batters, pitchers))
    }

    async fn profile_for(&self, player: &Player, season: i32) -> Loaded {
        if player.position.is_pitcher() {
            let profile = self
                .store
                .pitching(player.id, season)
                .await
                .ok()
                .flatten()
                .unwrap_or_else(PitchingProfile::league_average);
            Loaded::Pitching(profile)
        } else {
            let profile = self
                .store
                .batting(player.id, season)
                .await
                .ok()
                .flatten()
                .unwrap_or_else(BattingProfile::league_average);
            Loaded::Batting(profile)
        }
    }
}

enum Loaded {
    Batting(BattingProfile),
    Pitching(PitchingProfile),
}
