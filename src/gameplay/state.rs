use super::bases::Bases;
use super::bases::Runner;
use super::outcome::Outcome;
use crate::Leverage;
use crate::Score;
use rand::rngs::SmallRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Half {
    Top,
    Bottom,
}

impl Half {
    pub fn word(self) -> &'static str {
        match self {
            Half::Top => "top",
            Half::Bottom => "bottom",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Count {
    pub balls: u8,
    pub strikes: u8,
}

/// what one plate appearance did to the game
#[derive(Debug, Clone, PartialEq)]
pub struct Advance {
    pub runs: u16,
    pub outs: u8,
    pub scored: Vec<Runner>,
}

/// per-simulation game state, exclusively owned by one worker
#[derive(Debug, Clone)]
pub struct GameState {
    pub inning: u8,
    pub half: Half,
    pub outs: u8,
    pub home: Score,
    pub away: Score,
    pub bases: Bases,
    pub count: Count,
    over: bool,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    pub fn new() -> Self {
        Self {
            inning: 1,
            half: Half::Top,
            outs: 0,
            home: 0,
            away: 0,
            bases: Bases::default(),
            count: Count::default(),
            over: false,
        }
    }

    pub fn game_over(&self) -> bool {
        self.over
    }

    pub fn half_inning_over(&self) -> bool {
        self.outs >= 3
    }

    pub fn batting_score(&self) -> Score {
        match self.half {
            Half::Top => self.away,
            Half::Bottom => self.home,
        }
    }

    pub fn fielding_score(&self) -> Score {
        match self.half {
            Half::Top => self.home,
            Half::Bottom => self.away,
        }
    }

    /// apply a plate appearance. the extra-base advancement rolls are
    /// part of outcome application and consume the simulation's rng.
    pub fn apply(&mut self, outcome: Outcome, batter: Runner, rng: &mut SmallRng) -> Advance {
        debug_assert!(!self.over && self.outs < 3);
        let mut outs = 0;
        let scored = match outcome {
            Outcome::Walk | Outcome::HitByPitch => self.bases.force(batter),
            Outcome::Single => self.bases.single(batter, rng),
            Outcome::Double => self.bases.double(batter, rng),
            Outcome::Triple => self.bases.triple(batter),
            Outcome::HomeRun => self.bases.homer(batter),
            Outcome::Strikeout | Outcome::Groundout | Outcome::Flyout | Outcome::Lineout => {
                outs = 1;
                Vec::new()
            }
        };
        let runs = scored.len() as u16;
        match self.half {
            Half::Top => self.away += runs,
            Half::Bottom => self.home += runs,
        }
        self.outs += outs;
        self.count = Count::default();
        if self.half == Half::Bottom && self.inning >= 9 && self.home > self.away {
            // walk-off
            self.over = true;
        } else if self.outs >= 3 {
            self.advance_half_inning();
        }
        Advance { runs, outs, scored }
    }

    /// reset outs, count, and bases; flip the half; decide whether the
    /// game is over under regulation and extra-inning rules
    pub fn advance_half_inning(&mut self) {
        self.outs = 0;
        self.count = Count::default();
        self.bases.clear();
        match self.half {
            Half::Top => {
                if self.inning >= 9 && self.home > self.away {
                    // home leads after the top; its turn to bat is moot
                    self.over = true;
                } else {
                    self.half = Half::Bottom;
                }
            }
            Half::Bottom => {
                if self.inning >= 9 && self.home != self.away {
                    self.over = true;
                } else if self.inning >= crate::MAX_INNINGS {
                    // runaway-extras valve; the sim records a tie
                    self.over = true;
                } else {
                    self.half = Half::Top;
                    self.inning += 1;
                }
            }
        }
    }

    /// heuristic leverage index, bounded to [0.1, 10]
    pub fn leverage_index(&self) -> Leverage {
        let inning = self.inning as f64;
        let diff = (self.home as i32 - self.away as i32).abs() as f64;
        let mut li = 1.0;
        if self.inning >= 7 {
            li += 0.3 * (inning - 6.0);
        }
        if diff <= 3.0 {
            li += 0.2 * (4.0 - diff);
        }
        li += 0.1 * self.bases.runners_on() as f64;
        if self.outs == 2 {
            li += 0.3;
        }
        if self.inning >= 9 {
            li += 0.5;
        }
        li.clamp(0.1, 10.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use uuid::Uuid;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(7)
    }

    fn batter() -> Runner {
        Runner { id: Uuid::new_v4(), speed: 50 }
    }

    #[test]
    fn three_outs_advance_the_half() {
        let mut state = GameState::new();
        let mut rng = rng();
        for _ in 0..3 {
            state.apply(Outcome::Strikeout, batter(), &mut rng);
        }
        assert_eq!(state.half, Half::Bottom);
        assert_eq!(state.inning, 1);
        assert_eq!(state.outs, 0);
        assert_eq!(state.bases.runners_on(), 0);
    }

    #[test]
    fn bottom_half_flip_increments_inning() {
        let mut state = GameState::new();
        state.half = Half::Bottom;
        state.outs = 2;
        let mut rng = rng();
        state.apply(Outcome::Groundout, batter(), &mut rng);
        assert_eq!(state.half, Half::Top);
        assert_eq!(state.inning, 2);
    }

    #[test]
    fn home_lead_after_top_nine_ends_the_game() {
        let mut state = GameState::new();
        state.inning = 9;
        state.home = 5;
        state.away = 3;
        state.outs = 2;
        let mut rng = rng();
        state.apply(Outcome::Flyout, batter(), &mut rng);
        assert!(state.game_over());
    }

    #[test]
    fn walkoff_ends_mid_half() {
        let mut state = GameState::new();
        state.inning = 9;
        state.half = Half::Bottom;
        state.home = 3;
        state.away = 3;
        let mut rng = rng();
        state.apply(Outcome::HomeRun, batter(), &mut rng);
        assert!(state.game_over());
        assert_eq!(state.home, 4);
    }

    #[test]
    fn tied_after_nine_goes_to_extras() {
        let mut state = GameState::new();
        state.inning = 9;
        state.half = Half::Bottom;
        state.home = 2;
        state.away = 2;
        state.outs = 2;
        let mut rng = rng();
        state.apply(Outcome::Strikeout, batter(), &mut rng);
        assert!(!state.game_over());
        assert_eq!(state.inning, 10);
        assert_eq!(state.half, Half::Top);
    }

    #[test]
    fn extras_end_when_a_full_inning_is_unequal() {
        let mut state = GameState::new();
        state.inning = 11;
        state.half = Half::Bottom;
        state.home = 4;
        state.away = 6;
        state.outs = 2;
        let mut rng = rng();
        state.apply(Outcome::Lineout, batter(), &mut rng);
        assert!(state.game_over());
    }

    #[test]
    fn scores_never_decrease() {
        let mut state = GameState::new();
        let mut rng = rng();
        let (mut last_home, mut last_away) = (0, 0);
        let outcomes = [
            Outcome::Single,
            Outcome::Walk,
            Outcome::HomeRun,
            Outcome::Strikeout,
            Outcome::Double,
            Outcome::Groundout,
            Outcome::Triple,
            Outcome::Flyout,
        ];
        for outcome in outcomes.iter().cycle().take(200) {
            if state.game_over() {
                break;
            }
            state.apply(*outcome, batter(), &mut rng);
            assert!(state.home >= last_home && state.away >= last_away);
            assert!(state.outs < 3);
            last_home = state.home;
            last_away = state.away;
        }
    }

    #[test]
    fn leverage_matches_the_formula() {
        let state = GameState::new();
        // inning 1, tied, empty bases, no outs: 1.0 + 0.2 * 4
        assert!((state.leverage_index() - 1.8).abs() < 1e-12);

        let mut late = GameState::new();
        late.inning = 9;
        late.half = Half::Bottom;
        late.home = 3;
        late.away = 4;
        late.outs = 2;
        late.bases.first = Some(Runner { id: Uuid::nil(), speed: 50 });
        late.bases.second = Some(Runner { id: Uuid::nil(), speed: 50 });
        // 1.0 + 0.3*3 + 0.2*3 + 0.1*2 + 0.3 + 0.5
        assert!((late.leverage_index() - 3.5).abs() < 1e-12);
    }

    #[test]
    fn leverage_is_bounded() {
        let mut state = GameState::new();
        state.inning = 40;
        assert!(state.leverage_index() <= 10.0);
    }
}
