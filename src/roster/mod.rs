pub mod loader;

use crate::gameplay::Runner;
use crate::model::BattingProfile;
use crate::model::PitchingProfile;
use crate::model::Player;
use crate::model::Position;
use crate::model::Team;

/// a lineup slot: the player and the batting rates the resolver reads
#[derive(Debug, Clone, PartialEq)]
pub struct Batter {
    pub player: Player,
    pub profile: BattingProfile,
}

impl Batter {
    pub fn runner(&self) -> Runner {
        Runner { id: self.player.id, speed: self.profile.speed() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pitcher {
    pub player: Player,
    pub profile: PitchingProfile,
}

/// an immutable team snapshot for one run: nine-deep lineup by OPS,
/// rotation by FIP, remaining arms in the bullpen. upstream changes
/// after materialization do not affect in-flight runs.
#[derive(Debug, Clone, PartialEq)]
pub struct Roster {
    pub team: Team,
    pub lineup: Vec<Batter>,
    pub rotation: Vec<Pitcher>,
    pub bullpen: Vec<Pitcher>,
}

impl Roster {
    pub const LINEUP_DEPTH: usize = 9;
    pub const ROTATION_DEPTH: usize = 5;

    /// assemble a roster from loaded players, padding shortfalls with
    /// league-neutral replacements
    pub fn assemble(team: Team, mut batters: Vec<Batter>, mut pitchers: Vec<Pitcher>) -> Self {
        batters.sort_by(|a, b| {
            b.profile
                .ops
                .partial_cmp(&a.profile.ops)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        batters.truncate(Self::LINEUP_DEPTH);
        while batters.len() < Self::LINEUP_DEPTH {
            batters.push(Batter {
                player: Player::generic(Position::DH),
                profile: BattingProfile::league_average(),
            });
        }
        let batters = traditional_order(batters);
        pitchers.sort_by(|a, b| {
            a.profile
                .fip
                .partial_cmp(&b.profile.fip)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        if pitchers.is_empty() {
            pitchers.push(Pitcher {
                player: Player::generic(Position::P),
                profile: PitchingProfile::league_average(),
            });
        }
        let bullpen = pitchers.split_off(pitchers.len().min(Self::ROTATION_DEPTH));
        Self { team, lineup: batters, rotation: pitchers, bullpen }
    }

    /// a nine-man league-average side; the baseline for calibration
    /// tests and offline exhibition runs
    pub fn league_average(name: &str) -> Self {
        let team = Team::placeholder(name);
        let batters = (0..Self::LINEUP_DEPTH)
            .map(|slot| Batter {
                player: Player::generic(position_for_slot(slot)),
                profile: BattingProfile::league_average(),
            })
            .collect();
        let pitchers = (0..Self::ROTATION_DEPTH + 4)
            .map(|_| Pitcher {
                player: Player::generic(Position::P),
                profile: PitchingProfile::league_average(),
            })
            .collect();
        Self::assemble(team, batters, pitchers)
    }

    pub fn starter(&self) -> &Pitcher {
        &self.rotation[0]
    }
}

/// traditional batting order from an OPS ranking: the two best bats
/// hit third and fourth, the next two set the table, the rest follow
/// in descending order
fn traditional_order(ranked: Vec<Batter>) -> Vec<Batter> {
    const SLOTS: [usize; 9] = [2, 3, 0, 1, 4, 5, 6, 7, 8];
    if ranked.len() != SLOTS.len() {
        return ranked;
    }
    let mut lineup: Vec<Option<Batter>> = vec![None; ranked.len()];
    for (rank, batter) in ranked.into_iter().enumerate() {
        lineup[SLOTS[rank]] = Some(batter);
    }
    lineup.into_iter().flatten().collect()
}

fn position_for_slot(slot: usize) -> Position {
    [
        Position::CF,
        Position::SS,
        Position::RF,
        Position::First,
        Position::DH,
        Position::Third,
        Position::LF,
        Position::C,
        Position::Second,
    ][slot % 9]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn best_bats_take_the_heart_of_the_order() {
        let team = Team::placeholder("testers");
        let mut weak = BattingProfile::league_average();
        weak.ops = 0.600;
        let mut strong = BattingProfile::league_average();
        strong.ops = 0.950;
        let mut second = BattingProfile::league_average();
        second.ops = 0.900;
        let batters = vec![
            Batter { player: Player::generic(Position::C), profile: weak },
            Batter { player: Player::generic(Position::CF), profile: strong },
            Batter { player: Player::generic(Position::RF), profile: second },
        ];
        let roster = Roster::assemble(team, batters, vec![]);
        assert_eq!(roster.lineup.len(), Roster::LINEUP_DEPTH);
        // best bat hits third, second best cleans up
        assert_eq!(roster.lineup[2].profile.ops, 0.950);
        assert_eq!(roster.lineup[3].profile.ops, 0.900);
        // the weakest of the nine hits last
        assert_eq!(roster.lineup[8].profile.ops, 0.600);
        // padded slots are league average
        assert_eq!(roster.lineup[4].profile, BattingProfile::league_average());
    }

    #[test]
    fn rotation_sorts_by_fip_ascending() {
        let team = Team::placeholder("testers");
        let mut ace = PitchingProfile::league_average();
        ace.fip = 2.80;
        let mut swingman = PitchingProfile::league_average();
        swingman.fip = 5.10;
        let pitchers = vec![
            Pitcher { player: Player::generic(Position::P), profile: swingman },
            Pitcher { player: Player::generic(Position::P), profile: ace },
        ];
        let roster = Roster::assemble(team, vec![], pitchers);
        assert!((roster.starter().profile.fip - 2.80).abs() < 1e-12);
        assert!(roster.bullpen.is_empty());
    }

    #[test]
    fn league_average_roster_is_full_strength() {
        let roster = Roster::league_average("baseline");
        assert_eq!(roster.lineup.len(), 9);
        assert_eq!(roster.rotation.len(), 5);
        assert_eq!(roster.bullpen.len(), 4);
    }
}
