use super::result::BattingLine;
use super::result::KeyEvent;
use super::result::PitchingLine;
use super::result::SimResult;
use super::result::Winner;
use crate::context::snapshot::GameContext;
use crate::gameplay::GameState;
use crate::gameplay::Half;
use crate::gameplay::Outcome;
use crate::resolver::Resolver;
use crate::roster::Pitcher;
use crate::roster::Roster;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::collections::HashMap;

const STARTER_PITCH_MIN: u32 = 85;
const STARTER_PITCH_MAX: u32 = 105;
const RELIEVER_PITCH_MIN: u32 = 20;
const RELIEVER_PITCH_MAX: u32 = 30;

/// one complete game simulation, exclusively owning its state and rng
pub struct GameSim<'a> {
    home: &'a Roster,
    away: &'a Roster,
    ctx: &'a GameContext,
    rng: SmallRng,
}

/// the defensive side's pitching situation: the current arm, how much
/// it has left, and the bullpen queue behind it
struct Mound<'a> {
    current: &'a Pitcher,
    bullpen: std::slice::Iter<'a, Pitcher>,
    thrown: u32,
    budget: u32,
}

impl<'a> Mound<'a> {
    fn new(roster: &'a Roster, rng: &mut SmallRng) -> Self {
        Self {
            current: roster.starter(),
            bullpen: roster.bullpen.iter(),
            thrown: 0,
            budget: rng.random_range(STARTER_PITCH_MIN..=STARTER_PITCH_MAX),
        }
    }

    /// charge pitches to the current arm; change pitchers between
    /// plate appearances once the budget is spent, last man stays in
    fn charge(&mut self, pitches: u32, rng: &mut SmallRng) {
        self.thrown += pitches;
        if self.thrown >= self.budget {
            if let Some(next) = self.bullpen.next() {
                self.current = next;
                self.thrown = 0;
                self.budget = rng.random_range(RELIEVER_PITCH_MIN..=RELIEVER_PITCH_MAX);
            }
        }
    }
}

impl<'a> GameSim<'a> {
    pub fn new(home: &'a Roster, away: &'a Roster, ctx: &'a GameContext, seed: u64) -> Self {
        Self { home, away, ctx, rng: SmallRng::seed_from_u64(seed) }
    }

    pub fn play(self, ordinal: usize) -> SimResult {
        let GameSim { home, away, ctx, mut rng } = self;
        let resolver = Resolver::from(ctx);
        let mut state = GameState::new();
        let mut slots = [0_usize; 2];
        let mut home_mound = Mound::new(home, &mut rng);
        let mut away_mound = Mound::new(away, &mut rng);
        let mut batting: HashMap<_, BattingLine> = HashMap::new();
        let mut pitching: HashMap<_, PitchingLine> = HashMap::new();
        let mut events = Vec::new();
        let mut pitches_total = 0_u32;

        while !state.game_over() {
            let (order, slot, mound) = match state.half {
                Half::Top => (&away.lineup, &mut slots[0], &mut home_mound),
                Half::Bottom => (&home.lineup, &mut slots[1], &mut away_mound),
            };
            let batter = &order[*slot % Roster::LINEUP_DEPTH];
            *slot += 1;
            let leverage = state.leverage_index();
            let resolution = resolver.resolve(batter, mound.current, &state, &mut rng);
            let advance = state.apply(resolution.outcome, batter.runner(), &mut rng);
            pitches_total += resolution.pitches as u32;

            let line = batting.entry(batter.player.id).or_default();
            line.pa += 1;
            match resolution.outcome {
                Outcome::Walk | Outcome::HitByPitch => line.walks += 1,
                Outcome::Strikeout => {
                    line.ab += 1;
                    line.strikeouts += 1;
                }
                Outcome::Single => {
                    line.ab += 1;
                    line.hits += 1;
                }
                Outcome::Double => {
                    line.ab += 1;
                    line.hits += 1;
                    line.doubles += 1;
                }
                Outcome::Triple => {
                    line.ab += 1;
                    line.hits += 1;
                    line.triples += 1;
                }
                Outcome::HomeRun => {
                    line.ab += 1;
                    line.hits += 1;
                    line.homers += 1;
                }
                Outcome::Groundout | Outcome::Flyout | Outcome::Lineout => line.ab += 1,
            }
            line.rbi += advance.runs as u32;
            for runner in &advance.scored {
                batting.entry(runner.id).or_default().runs += 1;
            }

            let arm = pitching.entry(mound.current.player.id).or_default();
            arm.batters_faced += 1;
            arm.pitches += resolution.pitches as u32;
            arm.outs_recorded += advance.outs as u32;
            arm.runs += advance.runs as u32;
            match resolution.outcome {
                Outcome::Walk | Outcome::HitByPitch => arm.walks += 1,
                Outcome::Strikeout => arm.strikeouts += 1,
                Outcome::HomeRun => {
                    arm.hits += 1;
                    arm.homers += 1;
                }
                outcome if outcome.is_hit() => arm.hits += 1,
                _ => {}
            }

            if leverage >= crate::KEY_EVENT_LEVERAGE && advance.runs > 0 {
                events.push(KeyEvent {
                    kind: String::from("scoring_play"),
                    inning: state.inning,
                    inning_half: state.half.word().to_string(),
                    batter_id: batter.player.id,
                    pitcher_id: mound.current.player.id,
                    result: resolution.outcome.to_string(),
                    runs: advance.runs,
                    outs: advance.outs,
                    leverage,
                    timestamp: chrono::Utc::now(),
                });
            }

            mound.charge(resolution.pitches as u32, &mut rng);
        }

        let winner = match state.home.cmp(&state.away) {
            std::cmp::Ordering::Greater => Winner::Home,
            std::cmp::Ordering::Less => Winner::Away,
            std::cmp::Ordering::Equal => Winner::Tie,
        };
        let total_runs = state.home as f64 + state.away as f64;
        SimResult {
            ordinal,
            home_score: state.home,
            away_score: state.away,
            winner,
            innings: state.inning,
            pitches: pitches_total,
            duration_minutes: 58.0 + 0.31 * pitches_total as f64 + 1.1 * total_runs,
            batting,
            pitching,
            events,
        }
    }
}
