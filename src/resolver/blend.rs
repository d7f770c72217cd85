use crate::Woba;
use crate::model::BattingProfile;
use crate::model::BattingSplit;
use crate::model::Hand;
use crate::model::PitchingProfile;
use crate::model::PitchingSplit;

/// the batter rates the sampler actually reads, after split blending
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatterView {
    pub woba: Woba,
    pub bb_rate: f64,
    pub k_rate: f64,
    pub power: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitcherView {
    pub woba_against: Woba,
    pub bb_rate: f64,
    pub k_rate: f64,
    pub gb_rate: f64,
    pub fb_rate: f64,
    pub ld_rate: f64,
}

/// overall rates, overlaid with the vs-hand split when its sample is
/// deep enough, then RISP and clutch blends with capped weights
pub fn batter_view(
    profile: &BattingProfile,
    pitcher_throws: Hand,
    risp: bool,
    leverage: f64,
) -> BatterView {
    let platoon = match pitcher_throws {
        Hand::L => &profile.vs_lhp,
        _ => &profile.vs_rhp,
    };
    let mut woba = if platoon.usable() { platoon.woba } else { profile.woba };
    if risp {
        woba = blend(woba, &profile.risp, crate::RISP_BLEND_CAP);
    }
    if leverage > crate::CLUTCH_LEVERAGE {
        woba = blend(woba, &profile.clutch, crate::CLUTCH_BLEND_CAP);
    }
    BatterView {
        woba,
        bb_rate: profile.bb_rate,
        k_rate: profile.k_rate,
        power: profile.power(),
    }
}

pub fn pitcher_view(
    profile: &PitchingProfile,
    batter_side: Hand,
    risp: bool,
    leverage: f64,
) -> PitcherView {
    let platoon = match batter_side {
        Hand::L => &profile.vs_lhb,
        _ => &profile.vs_rhb,
    };
    let mut woba = if platoon.usable() { platoon.woba_against } else { crate::LEAGUE_WOBA };
    if risp {
        woba = blend_against(woba, &profile.risp, crate::RISP_BLEND_CAP);
    }
    if leverage > crate::CLUTCH_LEVERAGE {
        woba = blend_against(woba, &profile.clutch, crate::CLUTCH_BLEND_CAP);
    }
    PitcherView {
        woba_against: woba,
        bb_rate: profile.bb_rate(),
        k_rate: profile.k_rate(),
        gb_rate: profile.gb_rate,
        fb_rate: profile.fb_rate,
        ld_rate: profile.ld_rate,
    }
}

fn blend(base: Woba, split: &BattingSplit, cap: f64) -> Woba {
    if !split.usable() {
        return base;
    }
    let weight = (split.pa as f64 / 100.0).min(cap);
    base * (1.0 - weight) + split.woba * weight
}

fn blend_against(base: Woba, split: &PitchingSplit, cap: f64) -> Woba {
    if !split.usable() {
        return base;
    }
    let weight = (split.pa as f64 / 100.0).min(cap);
    base * (1.0 - weight) + split.woba_against * weight
}
