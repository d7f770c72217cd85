use super::aggregate::Aggregate;
use super::aggregate::AggregateBuilder;
use super::sim::GameSim;
use crate::context::snapshot::GameContext;
use crate::roster::Roster;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::mpsc;
use std::time::Duration;
use std::time::Instant;
use uuid::Uuid;

/// how a run ends early
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("run cancelled")]
    Cancelled,
    #[error("run exceeded its wall-clock budget")]
    Timeout,
    #[error("{discarded} of {total} simulations discarded")]
    Discards { discarded: usize, total: usize },
}

/// everything one run needs: immutable snapshots, the work size, and
/// the cooperative cancellation flag
pub struct RunSpec {
    pub run_id: Uuid,
    pub home: Arc<Roster>,
    pub away: Arc<Roster>,
    pub ctx: Arc<GameContext>,
    pub n: usize,
    pub workers: usize,
    pub seed: u64,
    pub budget: Duration,
    pub cancel: Arc<AtomicBool>,
}

pub struct Runner;

impl Runner {
    /// fan N independent simulations out over scoped worker threads.
    /// workers pop ordinals from a shared counter; the calling thread
    /// folds results as they arrive and reports progress every 100
    /// completions. panics inside a simulation discard that simulation
    /// only; cancellation and timeout are observed between simulations.
    pub fn run(spec: &RunSpec, progress: &dyn Fn(usize)) -> Result<Aggregate, RunError> {
        let workers = spec.workers.clamp(1, spec.n.max(1));
        let next = AtomicUsize::new(0);
        let discarded = AtomicUsize::new(0);
        let timed_out = AtomicBool::new(false);
        let deadline = Instant::now() + spec.budget;
        let (tx, rx) = mpsc::channel();
        log::debug!(
            "run {} fanning out {} simulations across {} workers",
            spec.run_id,
            spec.n,
            workers
        );

        let mut builder = AggregateBuilder::new(spec.run_id);
        std::thread::scope(|scope| {
            for _ in 0..workers {
                let tx = tx.clone();
                let next = &next;
                let discarded = &discarded;
                let timed_out = &timed_out;
                scope.spawn(move || {
                    loop {
                        if spec.cancel.load(Ordering::Relaxed) {
                            break;
                        }
                        if Instant::now() >= deadline {
                            timed_out.store(true, Ordering::Relaxed);
                            spec.cancel.store(true, Ordering::Relaxed);
                            break;
                        }
                        let ordinal = next.fetch_add(1, Ordering::Relaxed);
                        if ordinal >= spec.n {
                            break;
                        }
                        let seed = spec.seed.wrapping_add(ordinal as u64);
                        let game = std::panic::catch_unwind(AssertUnwindSafe(|| {
                            GameSim::new(&spec.home, &spec.away, &spec.ctx, seed).play(ordinal)
                        }));
                        match game {
                            Ok(result) => {
                                if tx.send(result).is_err() {
                                    break;
                                }
                            }
                            Err(_) => {
                                discarded.fetch_add(1, Ordering::Relaxed);
                            }
                        }
                    }
                });
            }
            drop(tx);
            for result in rx {
                builder.fold(result);
                let done = builder.completed() as usize;
                if done % crate::PROGRESS_STRIDE == 0 {
                    progress(done);
                }
            }
        });
        progress(builder.completed() as usize);

        if timed_out.load(Ordering::Relaxed) {
            return Err(RunError::Timeout);
        }
        if spec.cancel.load(Ordering::Relaxed) {
            return Err(RunError::Cancelled);
        }
        let lost = discarded.load(Ordering::Relaxed);
        if (lost as f64) > crate::MAX_DISCARD_RATIO * spec.n as f64 {
            return Err(RunError::Discards { discarded: lost, total: spec.n });
        }
        Ok(builder.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ParkFactors;
    use crate::model::WindDir;

    fn spec(n: usize, seed: u64, ctx: GameContext) -> RunSpec {
        RunSpec {
            run_id: Uuid::new_v4(),
            home: Arc::new(Roster::league_average("home")),
            away: Arc::new(Roster::league_average("away")),
            ctx: Arc::new(ctx),
            n,
            workers: 4,
            seed,
            budget: Duration::from_secs(600),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    fn run(spec: &RunSpec) -> Aggregate {
        Runner::run(spec, &|_| {}).expect("run completes")
    }

    #[test]
    fn neutral_run_scores_near_league_average() {
        let aggregate = run(&spec(2_000, 42, GameContext::neutral()));
        assert_eq!(aggregate.total_simulations, 2_000);
        // both sides within half a run of the 4.6 league anchor
        assert!(
            (4.1..=5.1).contains(&aggregate.expected_home_score),
            "home {}",
            aggregate.expected_home_score
        );
        assert!(
            (4.1..=5.1).contains(&aggregate.expected_away_score),
            "away {}",
            aggregate.expected_away_score
        );
        // no built-in home-field bias
        assert!(
            (aggregate.expected_home_score - aggregate.expected_away_score).abs() < 0.8
        );
        let p = aggregate.home_win_probability
            + aggregate.away_win_probability
            + aggregate.tie_probability;
        assert!((p - 1.0).abs() < 1e-9);
        assert!(aggregate.tie_probability < 0.01);
        let home_mass: u64 = aggregate.home_score_distribution.values().sum();
        let away_mass: u64 = aggregate.away_score_distribution.values().sum();
        assert_eq!(home_mass, 2_000);
        assert_eq!(away_mass, 2_000);
        assert_eq!(
            aggregate.home_wins + aggregate.away_wins + aggregate.ties,
            2_000
        );
    }

    #[test]
    fn seeded_runs_reproduce_exactly() {
        let first = run(&spec(200, 1234, GameContext::neutral()));
        let second = run(&spec(200, 1234, GameContext::neutral()));
        assert_eq!(first.expected_home_score, second.expected_home_score);
        assert_eq!(first.home_score_distribution, second.home_score_distribution);
        assert_eq!(first.average_pitches, second.average_pitches);
    }

    #[test]
    fn homer_happy_park_adds_at_least_a_run() {
        let neutral = run(&spec(2_000, 42, GameContext::neutral()));
        let mut juiced = GameContext::neutral();
        juiced.park = ParkFactors { hr: 200.0, ..ParkFactors::default() };
        let park = run(&spec(2_000, 42, juiced));
        let neutral_total = neutral.expected_home_score + neutral.expected_away_score;
        let park_total = park.expected_home_score + park.expected_away_score;
        assert!(
            park_total - neutral_total >= 1.0,
            "neutral {} vs park {}",
            neutral_total,
            park_total
        );
    }

    #[test]
    fn big_zone_umpire_moves_strikeouts_and_walks() {
        let neutral = run(&spec(1_500, 42, GameContext::neutral()));
        let mut squeezed = GameContext::neutral();
        squeezed.umpire.strike_zone_size = 115.0;
        let zone = run(&spec(1_500, 42, squeezed));
        assert!(zone.statistics["strikeout_rate"] > neutral.statistics["strikeout_rate"]);
        assert!(zone.statistics["walk_rate"] < neutral.statistics["walk_rate"]);
    }

    #[test]
    fn wind_blowing_out_lifts_home_runs() {
        let neutral = run(&spec(1_000, 42, GameContext::neutral()));
        let mut gusty = GameContext::neutral();
        gusty.weather.wind_dir = WindDir::Out;
        gusty.weather.wind_mph = 20.0;
        let windy = run(&spec(1_000, 42, gusty));
        assert!(
            windy.statistics["home_runs_per_game"]
                > neutral.statistics["home_runs_per_game"] * 1.15
        );
    }

    #[test]
    fn stacked_lineup_dominates() {
        let mut strong = Roster::league_average("sluggers");
        for batter in strong.lineup.iter_mut() {
            batter.profile.obp = 0.380;
            batter.profile.slg = 0.520;
            batter.profile.ops = 0.900;
            batter.profile.woba = 0.396;
            batter.profile.iso = 0.230;
            batter.profile.bb_rate = 0.110;
            batter.profile.k_rate = 0.190;
        }
        let mut weak = Roster::league_average("slappers");
        for batter in weak.lineup.iter_mut() {
            batter.profile.obp = 0.285;
            batter.profile.slg = 0.365;
            batter.profile.ops = 0.650;
            batter.profile.woba = 0.286;
            batter.profile.iso = 0.145;
            batter.profile.bb_rate = 0.060;
            batter.profile.k_rate = 0.250;
        }
        let mut spec = spec(2_000, 42, GameContext::neutral());
        spec.home = Arc::new(strong);
        spec.away = Arc::new(weak);
        let aggregate = run(&spec);
        assert!(
            aggregate.home_win_probability > 0.70,
            "home win probability {}",
            aggregate.home_win_probability
        );
    }

    #[test]
    fn single_simulation_run_is_well_defined() {
        let aggregate = run(&spec(1, 9, GameContext::neutral()));
        assert_eq!(aggregate.total_simulations, 1);
        let mass: u64 = aggregate.home_score_distribution.values().sum();
        assert_eq!(mass, 1);
        assert_eq!(
            aggregate.home_win_probability
                + aggregate.away_win_probability
                + aggregate.tie_probability,
            1.0
        );
    }

    #[test]
    fn cancellation_stops_the_run() {
        let mut cancelled = spec(50_000, 42, GameContext::neutral());
        cancelled.cancel = Arc::new(AtomicBool::new(true));
        match Runner::run(&cancelled, &|_| {}) {
            Err(RunError::Cancelled) => {}
            other => panic!("expected cancellation, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn mid_run_cancellation_lands_between_simulations() {
        let big = spec(crate::MAX_SIMULATIONS, 42, GameContext::neutral());
        let cancel = big.cancel.clone();
        let handle = std::thread::spawn(move || Runner::run(&big, &|_| {}));
        std::thread::sleep(Duration::from_millis(50));
        cancel.store(true, std::sync::atomic::Ordering::Relaxed);
        match handle.join().expect("runner thread") {
            Err(RunError::Cancelled) => {}
            other => panic!("expected cancellation, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn exhausted_budget_times_out() {
        let mut instant = spec(50_000, 42, GameContext::neutral());
        instant.budget = Duration::from_secs(0);
        match Runner::run(&instant, &|_| {}) {
            Err(RunError::Timeout) => {}
            other => panic!("expected timeout, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn progress_lands_on_the_stride() {
        let spec = spec(500, 3, GameContext::neutral());
        let seen = std::sync::Mutex::new(Vec::new());
        Runner::run(&spec, &|done| seen.lock().unwrap().push(done)).unwrap();
        let seen = seen.into_inner().unwrap();
        assert!(seen.contains(&100));
        assert!(seen.contains(&500));
        assert_eq!(*seen.last().unwrap(), 500);
    }
}
