use rand::Rng;
use rand::rngs::SmallRng;
use uuid::Uuid;

/// a baserunner; speed is carried for reporting, the advancement odds
/// themselves are fixed league-wide
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Runner {
    pub id: Uuid,
    pub speed: u8,
}

/// three-slot base model. at most one runner per slot; transitions are
/// closed-form, processed lead runner first so nobody is overwritten.
/// each transition returns the runners who crossed the plate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bases {
    pub first: Option<Runner>,
    pub second: Option<Runner>,
    pub third: Option<Runner>,
}

const EXTRA_BASE_ON_SINGLE: f64 = 0.15;
const SCORE_FROM_SECOND: f64 = 0.85;
const SCORE_FROM_FIRST_ON_DOUBLE: f64 = 0.75;

impl Bases {
    pub fn clear(&mut self) {
        *self = Bases::default();
    }

    pub fn runners_on(&self) -> u8 {
        [&self.first, &self.second, &self.third]
            .into_iter()
            .filter(|base| base.is_some())
            .count() as u8
    }

    /// runners in scoring position
    pub fn risp(&self) -> bool {
        self.second.is_some() || self.third.is_some()
    }

    /// walk or hit by pitch: only forced runners move
    pub fn force(&mut self, batter: Runner) -> Vec<Runner> {
        let mut scored = Vec::new();
        if self.first.is_some() {
            if self.second.is_some() {
                if let Some(runner) = self.third {
                    scored.push(runner);
                    self.third = None;
                }
                self.third = self.second.take();
            }
            self.second = self.first.take();
        }
        self.first = Some(batter);
        scored
    }

    /// single: third scores; second scores 85% else holds at third;
    /// first takes second 85% else third when it is open
    pub fn single(&mut self, batter: Runner, rng: &mut SmallRng) -> Vec<Runner> {
        let mut scored = Vec::new();
        if let Some(runner) = self.third.take() {
            scored.push(runner);
        }
        if let Some(runner) = self.second.take() {
            if rng.random::<f64>() < SCORE_FROM_SECOND {
                scored.push(runner);
            } else {
                self.third = Some(runner);
            }
        }
        if let Some(runner) = self.first.take() {
            if rng.random::<f64>() < EXTRA_BASE_ON_SINGLE && self.third.is_none() {
                self.third = Some(runner);
            } else {
                self.second = Some(runner);
            }
        }
        self.first = Some(batter);
        scored
    }

    /// double: second and third score; first scores 75% else holds at third
    pub fn double(&mut self, batter: Runner, rng: &mut SmallRng) -> Vec<Runner> {
        let mut scored = Vec::new();
        if let Some(runner) = self.third.take() {
            scored.push(runner);
        }
        if let Some(runner) = self.second.take() {
            scored.push(runner);
        }
        if let Some(runner) = self.first.take() {
            if rng.random::<f64>() < SCORE_FROM_FIRST_ON_DOUBLE {
                scored.push(runner);
            } else {
                self.third = Some(runner);
            }
        }
        self.second = Some(batter);
        scored
    }

    /// triple: everyone scores, batter to third
    pub fn triple(&mut self, batter: Runner) -> Vec<Runner> {
        let scored = self.drain();
        self.third = Some(batter);
        scored
    }

    /// home run: everyone scores including the batter
    pub fn homer(&mut self, batter: Runner) -> Vec<Runner> {
        let mut scored = self.drain();
        scored.push(batter);
        scored
    }

    fn drain(&mut self) -> Vec<Runner> {
        [self.first.take(), self.second.take(), self.third.take()]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn runner() -> Runner {
        Runner { id: Uuid::new_v4(), speed: 50 }
    }

    #[test]
    fn walk_forces_only_forced_runners() {
        let mut bases = Bases::default();
        bases.first = Some(runner());
        bases.third = Some(runner());
        let third = bases.third;
        assert!(bases.force(runner()).is_empty());
        assert!(bases.first.is_some());
        assert!(bases.second.is_some());
        assert_eq!(bases.third, third);
    }

    #[test]
    fn bases_loaded_walk_scores_the_lead_runner() {
        let mut bases = Bases::default();
        let lead = runner();
        bases.first = Some(runner());
        bases.second = Some(runner());
        bases.third = Some(lead);
        let scored = bases.force(runner());
        assert_eq!(scored, vec![lead]);
        assert_eq!(bases.runners_on(), 3);
    }

    #[test]
    fn single_scores_runner_from_third() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut bases = Bases::default();
        let lead = runner();
        bases.third = Some(lead);
        assert_eq!(bases.single(runner(), &mut rng), vec![lead]);
        assert!(bases.first.is_some());
        assert_eq!(bases.runners_on(), 1);
    }

    #[test]
    fn double_clears_scoring_position() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut bases = Bases::default();
        bases.second = Some(runner());
        bases.third = Some(runner());
        assert_eq!(bases.double(runner(), &mut rng).len(), 2);
        assert!(bases.second.is_some());
        assert!(bases.first.is_none());
    }

    #[test]
    fn triple_scores_everyone_batter_to_third() {
        let mut bases = Bases::default();
        bases.first = Some(runner());
        bases.second = Some(runner());
        assert_eq!(bases.triple(runner()).len(), 2);
        assert!(bases.third.is_some());
        assert_eq!(bases.runners_on(), 1);
    }

    #[test]
    fn homer_scores_the_batter_too() {
        let mut bases = Bases::default();
        let batter = runner();
        bases.first = Some(runner());
        bases.second = Some(runner());
        bases.third = Some(runner());
        let scored = bases.homer(batter);
        assert_eq!(scored.len(), 4);
        assert_eq!(*scored.last().unwrap(), batter);
        assert_eq!(bases.runners_on(), 0);
    }

    #[test]
    fn occupancy_invariant_over_many_rolls() {
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..2_000 {
            let mut bases = Bases::default();
            bases.first = Some(runner());
            bases.second = Some(runner());
            let scored = bases.single(runner(), &mut rng);
            // batter on first, no more than one runner per base, and
            // runner count plus runs is conserved
            assert!(bases.first.is_some());
            assert_eq!(bases.runners_on() as usize + scored.len(), 3);
            assert!(scored.len() <= 1);
        }
    }
}
