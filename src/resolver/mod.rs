pub mod blend;
pub mod rates;

use crate::Woba;
use crate::context::snapshot::GameContext;
use crate::gameplay::Count;
use crate::gameplay::GameState;
use crate::gameplay::Outcome;
use crate::roster::Batter;
use crate::roster::Pitcher;
use rand::Rng;
use rand::rngs::SmallRng;
use rates::OutcomeRates;

/// decisive-count distribution: the count the plate appearance is
/// settled on, sampled rather than simulated pitch by pitch
const COUNTS: [(Count, u32); 12] = [
    (Count { balls: 0, strikes: 0 }, 6),
    (Count { balls: 0, strikes: 1 }, 6),
    (Count { balls: 1, strikes: 0 }, 6),
    (Count { balls: 0, strikes: 2 }, 4),
    (Count { balls: 1, strikes: 1 }, 9),
    (Count { balls: 2, strikes: 0 }, 4),
    (Count { balls: 1, strikes: 2 }, 9),
    (Count { balls: 2, strikes: 1 }, 7),
    (Count { balls: 2, strikes: 2 }, 9),
    (Count { balls: 3, strikes: 0 }, 1),
    (Count { balls: 3, strikes: 1 }, 4),
    (Count { balls: 3, strikes: 2 }, 10),
];

/// a resolved plate appearance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub outcome: Outcome,
    pub count: Count,
    pub pitches: u8,
}

/// produces one categorical outcome from (batter, pitcher, situation,
/// environment). infallible: malformed inputs were already replaced
/// with league-neutral defaults at roster materialization.
pub struct Resolver<'a> {
    ctx: &'a GameContext,
}

impl<'a> From<&'a GameContext> for Resolver<'a> {
    fn from(ctx: &'a GameContext) -> Self {
        Self { ctx }
    }
}

impl Resolver<'_> {
    pub fn resolve(
        &self,
        batter: &Batter,
        pitcher: &Pitcher,
        state: &GameState,
        rng: &mut SmallRng,
    ) -> Resolution {
        let leverage = state.leverage_index();
        let risp = state.bases.risp();
        let side = batter.player.bats.batting_side(pitcher.player.throws);
        let bat = blend::batter_view(&batter.profile, pitcher.player.throws, risp, leverage);
        let pit = blend::pitcher_view(&pitcher.profile, side, risp, leverage);
        let count = self.decisive_count(rng);
        let woba = self.expected_woba(bat.woba, pit.woba_against, count, leverage);
        let rates = OutcomeRates::build(&bat, &pit, woba, side, self.ctx);
        let outcome = rates.sample(rng);
        let pitches = pitch_count(outcome, count, rng);
        Resolution { outcome, count, pitches }
    }

    fn decisive_count(&self, rng: &mut SmallRng) -> Count {
        let total: u32 = COUNTS.iter().map(|(_, weight)| weight).sum();
        let mut roll = rng.random_range(0..total);
        for (count, weight) in COUNTS {
            if roll < weight {
                return count;
            }
            roll -= weight;
        }
        Count::default()
    }

    /// matchup midpoint against the league anchor, then the additive
    /// contextual adjustments, clamped into the modeled range
    fn expected_woba(&self, batter: Woba, pitcher: Woba, count: Count, leverage: f64) -> Woba {
        let mut woba = (batter + (2.0 * crate::LEAGUE_WOBA - pitcher)) / 2.0;
        woba += count_adjustment(count);
        woba += self.ctx.weather.woba_shift();
        woba += self.umpire_shift(count, leverage);
        woba.clamp(crate::WOBA_FLOOR, crate::WOBA_CEILING)
    }

    fn umpire_shift(&self, count: Count, leverage: f64) -> f64 {
        let ref umpire = self.ctx.umpire;
        let mut shift = -umpire.zone_dev() * 0.05;
        if hitter_count(count) {
            shift += umpire.count_tendency * 0.01;
        } else if pitcher_count(count) {
            shift -= umpire.count_tendency * 0.01;
        }
        if leverage >= 2.0 {
            shift += umpire.high_leverage_tendency * 0.01;
        }
        shift
    }
}

fn hitter_count(count: Count) -> bool {
    count.balls >= 2 && count.balls as i8 - count.strikes as i8 >= 2
}

fn pitcher_count(count: Count) -> bool {
    count.strikes == 2 && count.balls < 3
}

fn count_adjustment(count: Count) -> f64 {
    match (count.balls, count.strikes) {
        (3, 0) => 0.080,
        (3, 1) => 0.060,
        (2, 0) => 0.040,
        (0, 2) => -0.060,
        (1, 2) => -0.040,
        (2, 2) => -0.020,
        _ => 0.0,
    }
}

/// decisive count plus the pitches it implies, with a foul allowance
fn pitch_count(outcome: Outcome, count: Count, rng: &mut SmallRng) -> u8 {
    let balls = match outcome {
        Outcome::Walk => 3,
        _ => count.balls,
    };
    let strikes = match outcome {
        Outcome::Strikeout => 2,
        _ => count.strikes,
    };
    let mut pitches = balls + strikes + 1;
    if rng.random::<f64>() < 0.35 {
        pitches += 1;
    }
    if rng.random::<f64>() < 0.15 {
        pitches += 1;
    }
    pitches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BattingProfile;
    use crate::model::PitchingProfile;
    use crate::model::Player;
    use crate::model::Position;
    use rand::SeedableRng;

    fn fixture() -> (Batter, Pitcher) {
        let batter = Batter {
            player: Player::generic(Position::CF),
            profile: BattingProfile::league_average(),
        };
        let pitcher = Pitcher {
            player: Player::generic(Position::P),
            profile: PitchingProfile::league_average(),
        };
        (batter, pitcher)
    }

    #[test]
    fn count_adjustments_match_the_table() {
        assert_eq!(count_adjustment(Count { balls: 3, strikes: 0 }), 0.080);
        assert_eq!(count_adjustment(Count { balls: 0, strikes: 2 }), -0.060);
        assert_eq!(count_adjustment(Count { balls: 1, strikes: 1 }), 0.0);
    }

    #[test]
    fn resolver_always_produces_an_outcome() {
        let ctx = GameContext::neutral();
        let resolver = Resolver::from(&ctx);
        let (batter, pitcher) = fixture();
        let state = GameState::new();
        let mut rng = SmallRng::seed_from_u64(99);
        for _ in 0..10_000 {
            let resolution = resolver.resolve(&batter, &pitcher, &state, &mut rng);
            assert!(resolution.pitches >= 1 && resolution.pitches <= 9);
        }
    }

    #[test]
    fn neutral_matchup_outcome_rates_look_league_average() {
        let ctx = GameContext::neutral();
        let resolver = Resolver::from(&ctx);
        let (batter, pitcher) = fixture();
        let state = GameState::new();
        let mut rng = SmallRng::seed_from_u64(4242);
        let n = 200_000;
        let (mut walks, mut strikeouts, mut hits) = (0, 0, 0);
        for _ in 0..n {
            let resolution = resolver.resolve(&batter, &pitcher, &state, &mut rng);
            match resolution.outcome {
                Outcome::Walk => walks += 1,
                Outcome::Strikeout => strikeouts += 1,
                outcome if outcome.is_hit() => hits += 1,
                _ => {}
            }
        }
        let walk_rate = walks as f64 / n as f64;
        let k_rate = strikeouts as f64 / n as f64;
        let hit_rate = hits as f64 / n as f64;
        assert!((0.06..=0.11).contains(&walk_rate), "walk rate {}", walk_rate);
        assert!((0.18..=0.26).contains(&k_rate), "k rate {}", k_rate);
        assert!((0.22..=0.31).contains(&hit_rate), "hit rate {}", hit_rate);
    }

    #[test]
    fn bigger_zone_trades_walks_for_strikeouts() {
        let neutral = GameContext::neutral();
        let mut squeezed = GameContext::neutral();
        squeezed.umpire.strike_zone_size = 115.0;
        let (batter, pitcher) = fixture();
        let state = GameState::new();
        let tally = |ctx: &GameContext, seed: u64| {
            let resolver = Resolver::from(ctx);
            let mut rng = SmallRng::seed_from_u64(seed);
            let (mut walks, mut strikeouts) = (0_u32, 0_u32);
            for _ in 0..100_000 {
                match resolver.resolve(&batter, &pitcher, &state, &mut rng).outcome {
                    Outcome::Walk => walks += 1,
                    Outcome::Strikeout => strikeouts += 1,
                    _ => {}
                }
            }
            (walks, strikeouts)
        };
        let (neutral_walks, neutral_ks) = tally(&neutral, 5);
        let (zone_walks, zone_ks) = tally(&squeezed, 5);
        assert!(zone_ks > neutral_ks);
        assert!(zone_walks < neutral_walks);
    }
}
