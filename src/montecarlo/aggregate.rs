use super::result::KeyEvent;
use super::result::SimResult;
use super::result::Winner;
use crate::Probability;
use crate::Score;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::BinaryHeap;
use std::collections::HashMap;
use std::cmp::Reverse;
use uuid::Uuid;

const OVER_UNDER_BANDS: [f64; 4] = [7.5, 8.5, 9.5, 10.5];
const BLOWOUT_MARGIN: u32 = 7;
const HIGH_SCORING_TOTAL: u32 = 12;

/// per-player batting averages over the whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BattingAverages {
    pub pa: f64,
    pub hits: f64,
    pub homers: f64,
    pub walks: f64,
    pub strikeouts: f64,
    pub runs: f64,
    pub rbi: f64,
}

/// per-player pitching averages; every run is treated as earned
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PitchingAverages {
    pub innings: f64,
    pub hits: f64,
    pub walks: f64,
    pub strikeouts: f64,
    pub runs: f64,
    pub era: f64,
}

/// the fold of every simulation in a run: win probabilities, expected
/// scores, distributions, and derived statistics. serializes with the
/// boundary's exact keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    pub run_id: Uuid,
    pub total_simulations: u64,
    pub home_wins: u64,
    pub away_wins: u64,
    pub ties: u64,
    pub home_win_probability: Probability,
    pub away_win_probability: Probability,
    pub tie_probability: Probability,
    pub expected_home_score: f64,
    pub expected_away_score: f64,
    pub home_score_distribution: BTreeMap<Score, u64>,
    pub away_score_distribution: BTreeMap<Score, u64>,
    pub average_game_duration: f64,
    pub average_pitches: f64,
    pub high_leverage_events: Vec<KeyEvent>,
    pub statistics: BTreeMap<String, f64>,
    pub player_batting: BTreeMap<Uuid, BattingAverages>,
    pub player_pitching: BTreeMap<Uuid, PitchingAverages>,
}

/// a key event ranked by leverage for the top-K min-heap
#[derive(Debug, Clone)]
struct Ranked(KeyEvent);

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.0.leverage == other.0.leverage
    }
}
impl Eq for Ranked {}
impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0
            .leverage
            .partial_cmp(&other.0.leverage)
            .unwrap_or(std::cmp::Ordering::Equal)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct BattingTotals {
    pa: u64,
    ab: u64,
    hits: u64,
    homers: u64,
    walks: u64,
    strikeouts: u64,
    runs: u64,
    rbi: u64,
}

#[derive(Debug, Clone, Copy, Default)]
struct PitchingTotals {
    outs: u64,
    hits: u64,
    walks: u64,
    strikeouts: u64,
    runs: u64,
}

/// incremental, commutative fold of simulation results. sums and
/// histograms only; derived statistics are computed once at the end.
#[derive(Debug)]
pub struct AggregateBuilder {
    run_id: Uuid,
    completed: u64,
    home_wins: u64,
    away_wins: u64,
    ties: u64,
    home_runs_sum: u64,
    away_runs_sum: u64,
    total_sq_sum: f64,
    duration_sum: f64,
    pitch_sum: u64,
    homers_sum: u64,
    blowouts: u64,
    one_run: u64,
    shutouts: u64,
    high_scoring: u64,
    extra_innings: u64,
    over_counts: [u64; 4],
    home_hist: BTreeMap<Score, u64>,
    away_hist: BTreeMap<Score, u64>,
    events: BinaryHeap<Reverse<Ranked>>,
    batting: HashMap<Uuid, BattingTotals>,
    pitching: HashMap<Uuid, PitchingTotals>,
}

impl AggregateBuilder {
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            completed: 0,
            home_wins: 0,
            away_wins: 0,
            ties: 0,
            home_runs_sum: 0,
            away_runs_sum: 0,
            total_sq_sum: 0.0,
            duration_sum: 0.0,
            pitch_sum: 0,
            homers_sum: 0,
            blowouts: 0,
            one_run: 0,
            shutouts: 0,
            high_scoring: 0,
            extra_innings: 0,
            over_counts: [0; 4],
            home_hist: BTreeMap::new(),
            away_hist: BTreeMap::new(),
            events: BinaryHeap::new(),
            batting: HashMap::new(),
            pitching: HashMap::new(),
        }
    }

    pub fn completed(&self) -> u64 {
        self.completed
    }

    pub fn fold(&mut self, result: SimResult) {
        self.completed += 1;
        match result.winner {
            Winner::Home => self.home_wins += 1,
            Winner::Away => self.away_wins += 1,
            Winner::Tie => self.ties += 1,
        }
        self.home_runs_sum += result.home_score as u64;
        self.away_runs_sum += result.away_score as u64;
        let total = result.total_score();
        self.total_sq_sum += (total as f64) * (total as f64);
        self.duration_sum += result.duration_minutes;
        self.pitch_sum += result.pitches as u64;
        if result.margin() >= BLOWOUT_MARGIN {
            self.blowouts += 1;
        }
        if result.margin() == 1 {
            self.one_run += 1;
        }
        if result.home_score == 0 || result.away_score == 0 {
            self.shutouts += 1;
        }
        if total >= HIGH_SCORING_TOTAL {
            self.high_scoring += 1;
        }
        if result.innings > 9 {
            self.extra_innings += 1;
        }
        for (band, count) in OVER_UNDER_BANDS.iter().zip(self.over_counts.iter_mut()) {
            if (total as f64) > *band {
                *count += 1;
            }
        }
        *self.home_hist.entry(result.home_score).or_insert(0) += 1;
        *self.away_hist.entry(result.away_score).or_insert(0) += 1;

        for event in result.events {
            self.events.push(Reverse(Ranked(event)));
            if self.events.len() > crate::TOP_EVENTS {
                self.events.pop();
            }
        }
        for (id, line) in result.batting {
            let sum = self.batting.entry(id).or_default();
            sum.pa += line.pa as u64;
            sum.ab += line.ab as u64;
            sum.hits += line.hits as u64;
            sum.homers += line.homers as u64;
            sum.walks += line.walks as u64;
            sum.strikeouts += line.strikeouts as u64;
            sum.runs += line.runs as u64;
            sum.rbi += line.rbi as u64;
            self.homers_sum += line.homers as u64;
        }
        for (id, line) in result.pitching {
            let sum = self.pitching.entry(id).or_default();
            sum.outs += line.outs_recorded as u64;
            sum.hits += line.hits as u64;
            sum.walks += line.walks as u64;
            sum.strikeouts += line.strikeouts as u64;
            sum.runs += line.runs as u64;
        }
    }

    pub fn finish(self) -> Aggregate {
        let n = self.completed.max(1) as f64;
        let expected_home = self.home_runs_sum as f64 / n;
        let expected_away = self.away_runs_sum as f64 / n;
        let expected_total = expected_home + expected_away;
        let variance = (self.total_sq_sum / n - expected_total * expected_total).max(0.0);

        let pa: u64 = self.batting.values().map(|b| b.pa).sum();
        let walks: u64 = self.batting.values().map(|b| b.walks).sum();
        let strikeouts: u64 = self.batting.values().map(|b| b.strikeouts).sum();

        let mut statistics = BTreeMap::new();
        for (band, count) in OVER_UNDER_BANDS.iter().zip(self.over_counts.iter()) {
            let over = *count as f64 / n;
            let label = format!("{}", band).replace('.', "_");
            statistics.insert(format!("over_{}", label), over);
            statistics.insert(format!("under_{}", label), 1.0 - over);
        }
        statistics.insert(String::from("score_variance"), variance);
        statistics.insert(String::from("blowout_pct"), self.blowouts as f64 / n);
        statistics.insert(String::from("one_run_pct"), self.one_run as f64 / n);
        statistics.insert(String::from("shutout_pct"), self.shutouts as f64 / n);
        statistics.insert(String::from("high_scoring_pct"), self.high_scoring as f64 / n);
        statistics.insert(String::from("extra_innings_pct"), self.extra_innings as f64 / n);
        statistics.insert(String::from("home_runs_per_game"), self.homers_sum as f64 / n);
        statistics.insert(
            String::from("strikeout_rate"),
            strikeouts as f64 / pa.max(1) as f64,
        );
        statistics.insert(String::from("walk_rate"), walks as f64 / pa.max(1) as f64);

        let mut events: Vec<KeyEvent> = self
            .events
            .into_iter()
            .map(|Reverse(Ranked(event))| event)
            .collect();
        events.sort_by(|a, b| {
            b.leverage
                .partial_cmp(&a.leverage)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let player_batting = self
            .batting
            .into_iter()
            .map(|(id, sum)| {
                (
                    id,
                    BattingAverages {
                        pa: sum.pa as f64 / n,
                        hits: sum.hits as f64 / n,
                        homers: sum.homers as f64 / n,
                        walks: sum.walks as f64 / n,
                        strikeouts: sum.strikeouts as f64 / n,
                        runs: sum.runs as f64 / n,
                        rbi: sum.rbi as f64 / n,
                    },
                )
            })
            .collect();
        let player_pitching = self
            .pitching
            .into_iter()
            .map(|(id, sum)| {
                let innings = sum.outs as f64 / 3.0;
                (
                    id,
                    PitchingAverages {
                        innings: innings / n,
                        hits: sum.hits as f64 / n,
                        walks: sum.walks as f64 / n,
                        strikeouts: sum.strikeouts as f64 / n,
                        runs: sum.runs as f64 / n,
                        era: if innings > 0.0 { 9.0 * sum.runs as f64 / innings } else { 0.0 },
                    },
                )
            })
            .collect();

        Aggregate {
            run_id: self.run_id,
            total_simulations: self.completed,
            home_wins: self.home_wins,
            away_wins: self.away_wins,
            ties: self.ties,
            home_win_probability: self.home_wins as f64 / n,
            away_win_probability: self.away_wins as f64 / n,
            tie_probability: self.ties as f64 / n,
            expected_home_score: expected_home,
            expected_away_score: expected_away,
            home_score_distribution: self.home_hist,
            away_score_distribution: self.away_hist,
            average_game_duration: self.duration_sum / n,
            average_pitches: self.pitch_sum as f64 / n,
            high_leverage_events: events,
            statistics,
            player_batting,
            player_pitching,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn result(ordinal: usize, home: Score, away: Score) -> SimResult {
        let winner = match home.cmp(&away) {
            std::cmp::Ordering::Greater => Winner::Home,
            std::cmp::Ordering::Less => Winner::Away,
            std::cmp::Ordering::Equal => Winner::Tie,
        };
        SimResult {
            ordinal,
            home_score: home,
            away_score: away,
            winner,
            innings: 9,
            pitches: 300,
            duration_minutes: 170.0,
            batting: HashMap::new(),
            pitching: HashMap::new(),
            events: Vec::new(),
        }
    }

    #[test]
    fn tallies_and_histograms_account_for_every_sim() {
        let mut builder = AggregateBuilder::new(Uuid::nil());
        builder.fold(result(0, 5, 3));
        builder.fold(result(1, 2, 6));
        builder.fold(result(2, 4, 4));
        builder.fold(result(3, 9, 1));
        let aggregate = builder.finish();
        assert_eq!(aggregate.total_simulations, 4);
        assert_eq!(aggregate.home_wins + aggregate.away_wins + aggregate.ties, 4);
        let home_total: u64 = aggregate.home_score_distribution.values().sum();
        let away_total: u64 = aggregate.away_score_distribution.values().sum();
        assert_eq!(home_total, 4);
        assert_eq!(away_total, 4);
        let p = aggregate.home_win_probability
            + aggregate.away_win_probability
            + aggregate.tie_probability;
        assert!((p - 1.0).abs() < 1e-9);
        assert!((aggregate.expected_home_score - 5.0).abs() < 1e-12);
    }

    #[test]
    fn derived_statistics_match_hand_counts() {
        let mut builder = AggregateBuilder::new(Uuid::nil());
        builder.fold(result(0, 9, 1)); // blowout, total 10
        builder.fold(result(1, 3, 2)); // one-run, total 5
        builder.fold(result(2, 0, 8)); // blowout and shutout, total 8
        builder.fold(result(3, 7, 6)); // one-run, high total 13
        let aggregate = builder.finish();
        let stats = &aggregate.statistics;
        assert_eq!(stats["blowout_pct"], 0.5);
        assert_eq!(stats["one_run_pct"], 0.5);
        assert_eq!(stats["shutout_pct"], 0.25);
        assert_eq!(stats["high_scoring_pct"], 0.25);
        assert_eq!(stats["over_7_5"], 0.75);
        assert_eq!(stats["over_10_5"], 0.25);
        assert_eq!(stats["under_8_5"], 0.5);
        assert_eq!(stats["extra_innings_pct"], 0.0);
    }

    #[test]
    fn top_events_keep_the_highest_leverage() {
        let mut builder = AggregateBuilder::new(Uuid::nil());
        for i in 0..200 {
            let mut sim = result(i, 1, 0);
            sim.events.push(KeyEvent {
                kind: String::from("scoring_play"),
                inning: 9,
                inning_half: String::from("bottom"),
                batter_id: Uuid::nil(),
                pitcher_id: Uuid::nil(),
                result: String::from("single"),
                runs: 1,
                outs: 0,
                leverage: i as f64 / 20.0,
                timestamp: chrono::Utc::now(),
            });
            builder.fold(sim);
        }
        let aggregate = builder.finish();
        assert_eq!(aggregate.high_leverage_events.len(), crate::TOP_EVENTS);
        // descending by leverage, and only the strongest survived
        let leverages: Vec<f64> = aggregate
            .high_leverage_events
            .iter()
            .map(|e| e.leverage)
            .collect();
        assert!(leverages.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(leverages[0], 199.0 / 20.0);
        assert_eq!(*leverages.last().unwrap(), 150.0 / 20.0);
    }

    #[test]
    fn aggregate_round_trips_through_json() {
        let mut builder = AggregateBuilder::new(Uuid::new_v4());
        for i in 0..10 {
            builder.fold(result(i, (i % 5) as Score, ((i + 2) % 4) as Score));
        }
        let aggregate = builder.finish();
        let json = serde_json::to_string(&aggregate).unwrap();
        let back: Aggregate = serde_json::from_str(&json).unwrap();
        assert_eq!(aggregate, back);
        // repeated serialization is byte-equivalent
        assert_eq!(json, serde_json::to_string(&back).unwrap());
    }

    #[test]
    fn single_sample_aggregate_is_degenerate_but_sound() {
        let mut builder = AggregateBuilder::new(Uuid::nil());
        builder.fold(result(0, 3, 7));
        let aggregate = builder.finish();
        assert_eq!(aggregate.total_simulations, 1);
        assert_eq!(aggregate.away_win_probability, 1.0);
        assert_eq!(aggregate.home_score_distribution.len(), 1);
        assert_eq!(aggregate.home_score_distribution[&3], 1);
        assert_eq!(aggregate.statistics["score_variance"], 0.0);
    }
}
