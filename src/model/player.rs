use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// batting or throwing side. switch only occurs as a batting side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hand {
    L,
    R,
    S,
}

impl Hand {
    /// the side a batter actually hits from against a given pitcher;
    /// switch hitters take the opposite of the pitcher's throwing hand
    pub fn batting_side(self, pitcher_throws: Hand) -> Hand {
        match self {
            Hand::S => match pitcher_throws {
                Hand::L => Hand::R,
                _ => Hand::L,
            },
            side => side,
        }
    }
}

impl TryFrom<&str> for Hand {
    type Error = anyhow::Error;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "L" | "l" => Ok(Hand::L),
            "R" | "r" => Ok(Hand::R),
            "S" | "s" | "B" | "b" => Ok(Hand::S),
            _ => Err(anyhow::anyhow!("unrecognized hand: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Position {
    P,
    C,
    #[serde(rename = "1B")]
    First,
    #[serde(rename = "2B")]
    Second,
    #[serde(rename = "3B")]
    Third,
    SS,
    LF,
    CF,
    RF,
    DH,
}

impl Position {
    pub fn is_pitcher(self) -> bool {
        matches!(self, Position::P)
    }
}

impl TryFrom<&str> for Position {
    type Error = anyhow::Error;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "P" | "SP" | "RP" => Ok(Position::P),
            "C" => Ok(Position::C),
            "1B" => Ok(Position::First),
            "2B" => Ok(Position::Second),
            "3B" => Ok(Position::Third),
            "SS" => Ok(Position::SS),
            "LF" => Ok(Position::LF),
            "CF" => Ok(Position::CF),
            "RF" => Ok(Position::RF),
            "DH" => Ok(Position::DH),
            _ => Err(anyhow::anyhow!("unrecognized position: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: Uuid,
    pub name: String,
    pub position: Position,
    pub bats: Hand,
    pub throws: Hand,
    pub age: u8,
}

impl Player {
    pub fn generic(position: Position) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: String::from("replacement player"),
            position,
            bats: Hand::R,
            throws: Hand::R,
            age: 27,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switch_hitter_takes_platoon_advantage() {
        assert_eq!(Hand::S.batting_side(Hand::L), Hand::R);
        assert_eq!(Hand::S.batting_side(Hand::R), Hand::L);
        assert_eq!(Hand::L.batting_side(Hand::L), Hand::L);
        assert_eq!(Hand::R.batting_side(Hand::L), Hand::R);
    }
}
