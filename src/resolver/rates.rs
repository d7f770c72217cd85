use super::blend::BatterView;
use super::blend::PitcherView;
use crate::Probability;
use crate::Woba;
use crate::context::snapshot::GameContext;
use crate::gameplay::Outcome;
use crate::model::Hand;
use rand::Rng;
use rand::rngs::SmallRng;

/// the full outcome family for one plate appearance; probabilities are
/// absolute and sum to one by construction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutcomeRates {
    pub walk: Probability,
    pub hbp: Probability,
    pub strikeout: Probability,
    pub groundout: Probability,
    pub flyout: Probability,
    pub lineout: Probability,
    pub single: Probability,
    pub double: Probability,
    pub triple: Probability,
    pub homer: Probability,
}

impl OutcomeRates {
    /// rate decomposition: free passes and strikeouts first, a hit share
    /// of the remaining mass proportional to expected wOBA, the rest
    /// split across out types by the pitcher's batted-ball profile
    pub fn build(
        bat: &BatterView,
        pit: &PitcherView,
        woba: Woba,
        batting_side: Hand,
        ctx: &GameContext,
    ) -> Self {
        let ref umpire = ctx.umpire;
        let zone = umpire.zone_dev();
        let dev = woba - crate::LEAGUE_WOBA;

        let bb_eff = (bat.bb_rate + pit.bb_rate) / 2.0;
        let k_eff = (bat.k_rate + pit.k_rate) / 2.0;
        let mut walk = bb_eff * (1.0 + 2.0 * dev);
        walk = ((walk + umpire.bb_rate_adj / 100.0).max(0.0))
            * (1.0 - zone * crate::ZONE_RATE_SWING);
        let mut walk = walk.clamp(0.0, 0.5);
        let mut strikeout = k_eff * (1.0 - 2.0 * dev);
        strikeout = ((strikeout + umpire.k_rate_adj / 100.0).max(0.0))
            * (1.0 + zone * crate::ZONE_RATE_SWING);
        let mut strikeout = strikeout.clamp(0.0, 0.6);
        let mut hbp = crate::HBP_RATE;

        // keep some mass for balls in play under extreme inputs
        let committed = walk + hbp + strikeout;
        if committed > 0.9 {
            let scale = 0.9 / committed;
            walk *= scale;
            hbp *= scale;
            strikeout *= scale;
        }
        let remaining = 1.0 - walk - hbp - strikeout;
        let hit = remaining * (1.2 * woba).min(1.0);
        let out = remaining - hit;

        // hit-type split, conditional on a hit
        let power_factor = bat.power / 50.0;
        let mut homer = (((woba - 0.250) * 0.3 * power_factor).max(0.0)).min(0.15)
            * ctx.park.hr_factor(batting_side)
            * ctx.stadium.altitude_factor();
        let mut triple = (((woba - 0.300) * 0.1).max(0.0)).min(0.03) * ctx.park.triples_factor();
        let mut double =
            (((woba - 0.250) * 0.5 * power_factor).max(0.0)).min(0.25) * ctx.park.doubles_factor();
        let extra_bases = homer + triple + double;
        if extra_bases > 1.0 {
            homer /= extra_bases;
            triple /= extra_bases;
            double /= extra_bases;
        }
        let single = (1.0 - homer - triple - double).max(0.0);

        // out-type split by batted-ball mix, strikeouts already carved out
        let mix = (pit.gb_rate + pit.fb_rate + pit.ld_rate).max(1e-9);

        Self {
            walk,
            hbp,
            strikeout,
            groundout: out * pit.gb_rate / mix,
            flyout: out * pit.fb_rate / mix,
            lineout: out * pit.ld_rate / mix,
            single: hit * single,
            double: hit * double,
            triple: hit * triple,
            homer: hit * homer,
        }
    }

    pub fn total(&self) -> Probability {
        self.walk
            + self.hbp
            + self.strikeout
            + self.groundout
            + self.flyout
            + self.lineout
            + self.single
            + self.double
            + self.triple
            + self.homer
    }

    fn entries(&self) -> [(Outcome, Probability); 10] {
        [
            (Outcome::Walk, self.walk),
            (Outcome::HitByPitch, self.hbp),
            (Outcome::Strikeout, self.strikeout),
            (Outcome::Groundout, self.groundout),
            (Outcome::Flyout, self.flyout),
            (Outcome::Lineout, self.lineout),
            (Outcome::Single, self.single),
            (Outcome::Double, self.double),
            (Outcome::Triple, self.triple),
            (Outcome::HomeRun, self.homer),
        ]
    }

    /// one uniform roll walked down the cumulative family
    pub fn sample(&self, rng: &mut SmallRng) -> Outcome {
        let mut roll: f64 = rng.random::<f64>() * self.total();
        for (outcome, probability) in self.entries() {
            if roll < probability {
                return outcome;
            }
            roll -= probability;
        }
        Outcome::Groundout
    }
}
