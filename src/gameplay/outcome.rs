use serde::Deserialize;
use serde::Serialize;

/// the categorical result of one plate appearance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Walk,
    HitByPitch,
    Strikeout,
    Groundout,
    Flyout,
    Lineout,
    Single,
    Double,
    Triple,
    HomeRun,
}

impl Outcome {
    pub fn is_hit(self) -> bool {
        matches!(
            self,
            Outcome::Single | Outcome::Double | Outcome::Triple | Outcome::HomeRun
        )
    }

    pub fn is_out(self) -> bool {
        matches!(
            self,
            Outcome::Strikeout | Outcome::Groundout | Outcome::Flyout | Outcome::Lineout
        )
    }

    pub fn is_free_pass(self) -> bool {
        matches!(self, Outcome::Walk | Outcome::HitByPitch)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Outcome::Walk => "walk",
            Outcome::HitByPitch => "hit by pitch",
            Outcome::Strikeout => "strikeout",
            Outcome::Groundout => "groundout",
            Outcome::Flyout => "flyout",
            Outcome::Lineout => "lineout",
            Outcome::Single => "single",
            Outcome::Double => "double",
            Outcome::Triple => "triple",
            Outcome::HomeRun => "home run",
        };
        write!(f, "{}", label)
    }
}
