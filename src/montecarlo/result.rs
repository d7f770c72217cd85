use crate::Leverage;
use crate::Score;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    Home,
    Away,
    Tie,
}

/// a consequential scoring play, kept when its pre-pitch leverage
/// clears the reporting threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub inning: u8,
    pub inning_half: String,
    pub batter_id: Uuid,
    pub pitcher_id: Uuid,
    pub result: String,
    pub runs: u16,
    pub outs: u8,
    pub leverage: Leverage,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattingLine {
    pub pa: u32,
    pub ab: u32,
    pub hits: u32,
    pub doubles: u32,
    pub triples: u32,
    pub homers: u32,
    pub walks: u32,
    pub strikeouts: u32,
    pub runs: u32,
    pub rbi: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchingLine {
    pub batters_faced: u32,
    pub outs_recorded: u32,
    pub hits: u32,
    pub walks: u32,
    pub strikeouts: u32,
    pub homers: u32,
    pub runs: u32,
    pub pitches: u32,
}

/// the output of one independent simulation
#[derive(Debug, Clone, PartialEq)]
pub struct SimResult {
    pub ordinal: usize,
    pub home_score: Score,
    pub away_score: Score,
    pub winner: Winner,
    pub innings: u8,
    pub pitches: u32,
    pub duration_minutes: f64,
    pub batting: HashMap<Uuid, BattingLine>,
    pub pitching: HashMap<Uuid, PitchingLine>,
    pub events: Vec<KeyEvent>,
}

impl SimResult {
    pub fn total_score(&self) -> u32 {
        self.home_score as u32 + self.away_score as u32
    }

    pub fn margin(&self) -> u32 {
        (self.home_score as i32 - self.away_score as i32).unsigned_abs()
    }
}
