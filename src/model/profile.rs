use serde::Deserialize;
use serde::Serialize;

/// reduced rate tuple for a batting sub-population (vs-hand, RISP, clutch)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattingSplit {
    pub avg: f64,
    pub obp: f64,
    pub slg: f64,
    pub woba: f64,
    pub pa: u32,
}

impl Default for BattingSplit {
    fn default() -> Self {
        Self {
            avg: crate::LEAGUE_AVG,
            obp: crate::LEAGUE_OBP,
            slg: crate::LEAGUE_SLG,
            woba: crate::LEAGUE_WOBA,
            pa: 0,
        }
    }
}

impl BattingSplit {
    /// splits below the sample floor are ignored in favor of overall rates
    pub fn usable(&self) -> bool {
        self.pa >= crate::MIN_SPLIT_PA && rate_ok(self.woba) && rate_ok(self.obp)
    }
}

/// season batting rates, counting stats, and situational splits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattingProfile {
    pub avg: f64,
    pub obp: f64,
    pub slg: f64,
    pub ops: f64,
    pub woba: f64,
    pub iso: f64,
    pub babip: f64,
    pub bb_rate: f64,
    pub k_rate: f64,
    pub pa: u32,
    pub ab: u32,
    pub hits: u32,
    pub doubles: u32,
    pub triples: u32,
    pub homers: u32,
    pub walks: u32,
    pub strikeouts: u32,
    pub vs_lhp: BattingSplit,
    pub vs_rhp: BattingSplit,
    pub risp: BattingSplit,
    pub clutch: BattingSplit,
}

impl Default for BattingProfile {
    fn default() -> Self {
        Self::league_average()
    }
}

impl BattingProfile {
    /// the neutral profile substituted for missing or malformed inputs
    pub fn league_average() -> Self {
        Self {
            avg: crate::LEAGUE_AVG,
            obp: crate::LEAGUE_OBP,
            slg: crate::LEAGUE_SLG,
            ops: crate::LEAGUE_OBP + crate::LEAGUE_SLG,
            woba: crate::LEAGUE_WOBA,
            iso: crate::LEAGUE_ISO,
            babip: crate::LEAGUE_BABIP,
            bb_rate: crate::LEAGUE_BB_RATE,
            k_rate: crate::LEAGUE_K_RATE,
            pa: 600,
            ab: 540,
            hits: 134,
            doubles: 27,
            triples: 3,
            homers: 18,
            walks: 51,
            strikeouts: 116,
            vs_lhp: BattingSplit::default(),
            vs_rhp: BattingSplit::default(),
            risp: BattingSplit::default(),
            clutch: BattingSplit::default(),
        }
    }

    /// repair out-of-range rates in place; returns whether anything was
    /// malformed so callers can warn once per load
    pub fn repair(&mut self) -> bool {
        let mut dirty = false;
        for rate in [&mut self.avg, &mut self.obp, &mut self.babip] {
            if !rate_ok(*rate) {
                *rate = crate::LEAGUE_AVG.max((*rate).clamp(0.0, 1.0));
                dirty = true;
            }
        }
        for (rate, neutral) in [
            (&mut self.bb_rate, crate::LEAGUE_BB_RATE),
            (&mut self.k_rate, crate::LEAGUE_K_RATE),
        ] {
            if !rate_ok(*rate) {
                *rate = if rate.is_finite() { rate.clamp(0.0, 1.0) } else { neutral };
                dirty = true;
            }
        }
        if !self.slg.is_finite() || self.slg < 0.0 || self.slg > 4.0 {
            self.slg = crate::LEAGUE_SLG;
            dirty = true;
        }
        if !self.woba.is_finite() || self.woba <= 0.0 || self.woba > 1.0 {
            self.woba = crate::LEAGUE_WOBA;
            dirty = true;
        }
        if !self.iso.is_finite() || self.iso < 0.0 || self.iso > 1.0 {
            self.iso = crate::LEAGUE_ISO;
            dirty = true;
        }
        if (self.ops - self.obp - self.slg).abs() > 0.005 {
            self.ops = self.obp + self.slg;
            dirty = true;
        }
        dirty
    }

    /// raw power attribute on a 0-150 scale
    pub fn power(&self) -> f64 {
        (self.iso * crate::POWER_PER_ISO).clamp(0.0, crate::POWER_CAP)
    }

    /// rough runner speed from triple rate and batted-ball profile, 0-100
    pub fn speed(&self) -> u8 {
        let triples = self.triples as f64 / self.pa.max(1) as f64;
        let speed = 40.0 + triples * 4000.0 + (self.babip - crate::LEAGUE_BABIP) * 100.0;
        speed.clamp(0.0, 100.0) as u8
    }
}

/// reduced rate tuple for a pitching sub-population
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PitchingSplit {
    pub avg_against: f64,
    pub obp_against: f64,
    pub woba_against: f64,
    pub pa: u32,
}

impl Default for PitchingSplit {
    fn default() -> Self {
        Self {
            avg_against: crate::LEAGUE_AVG,
            obp_against: crate::LEAGUE_OBP,
            woba_against: crate::LEAGUE_WOBA,
            pa: 0,
        }
    }
}

impl PitchingSplit {
    pub fn usable(&self) -> bool {
        self.pa >= crate::MIN_SPLIT_PA && rate_ok(self.woba_against)
    }
}

/// season pitching rates, counting stats, splits, and pitch mix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PitchingProfile {
    pub era: f64,
    pub whip: f64,
    pub fip: f64,
    pub xfip: f64,
    pub k9: f64,
    pub bb9: f64,
    pub hr9: f64,
    pub gb_rate: f64,
    pub fb_rate: f64,
    pub ld_rate: f64,
    pub ip: f64,
    pub batters_faced: u32,
    pub vs_lhb: PitchingSplit,
    pub vs_rhb: PitchingSplit,
    pub risp: PitchingSplit,
    pub clutch: PitchingSplit,
    /// informational in the base resolver; percentages sum to 1.0
    pub pitch_mix: Vec<(String, f64)>,
}

impl Default for PitchingProfile {
    fn default() -> Self {
        Self::league_average()
    }
}

impl PitchingProfile {
    pub fn league_average() -> Self {
        Self {
            era: crate::LEAGUE_ERA,
            whip: crate::LEAGUE_WHIP,
            fip: crate::LEAGUE_FIP,
            xfip: crate::LEAGUE_FIP,
            k9: crate::LEAGUE_K9,
            bb9: crate::LEAGUE_BB9,
            hr9: crate::LEAGUE_HR9,
            gb_rate: 0.44,
            fb_rate: 0.35,
            ld_rate: 0.21,
            ip: 160.0,
            batters_faced: 680,
            vs_lhb: PitchingSplit::default(),
            vs_rhb: PitchingSplit::default(),
            risp: PitchingSplit::default(),
            clutch: PitchingSplit::default(),
            pitch_mix: vec![
                ("four-seam".to_string(), 0.35),
                ("slider".to_string(), 0.22),
                ("changeup".to_string(), 0.13),
                ("curveball".to_string(), 0.12),
                ("sinker".to_string(), 0.18),
            ],
        }
    }

    pub fn repair(&mut self) -> bool {
        let mut dirty = false;
        for per_nine in [&mut self.k9, &mut self.bb9, &mut self.hr9] {
            if !per_nine.is_finite() || *per_nine < 0.0 || *per_nine > 27.0 {
                *per_nine = crate::LEAGUE_K9.min(27.0);
                dirty = true;
            }
        }
        for rate in [&mut self.gb_rate, &mut self.fb_rate, &mut self.ld_rate] {
            if !rate_ok(*rate) {
                *rate = 1.0 / 3.0;
                dirty = true;
            }
        }
        if !self.era.is_finite() || self.era < 0.0 {
            self.era = crate::LEAGUE_ERA;
            dirty = true;
        }
        if !self.fip.is_finite() || self.fip < 0.0 {
            self.fip = crate::LEAGUE_FIP;
            dirty = true;
        }
        let mix: f64 = self.pitch_mix.iter().map(|(_, share)| share).sum();
        if !self.pitch_mix.is_empty() && (mix - 1.0).abs() > 0.01 && mix > 0.0 {
            for (_, share) in self.pitch_mix.iter_mut() {
                *share /= mix;
            }
            dirty = true;
        }
        dirty
    }

    /// per-plate-appearance strikeout rate
    pub fn k_rate(&self) -> f64 {
        (self.k9 / crate::PA_PER_NINE).clamp(0.0, 0.6)
    }

    /// per-plate-appearance walk rate
    pub fn bb_rate(&self) -> f64 {
        (self.bb9 / crate::PA_PER_NINE).clamp(0.0, 0.4)
    }
}

fn rate_ok(rate: f64) -> bool {
    rate.is_finite() && (0.0..=1.0).contains(&rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn league_average_is_self_consistent() {
        let mut batting = BattingProfile::league_average();
        assert!(!batting.repair());
        let mut pitching = PitchingProfile::league_average();
        assert!(!pitching.repair());
        assert!((pitching.k_rate() - crate::LEAGUE_K_RATE).abs() < 0.01);
    }

    #[test]
    fn repair_fixes_ops_and_ranges() {
        let mut profile = BattingProfile {
            ops: 2.5,
            woba: f64::NAN,
            ..BattingProfile::league_average()
        };
        assert!(profile.repair());
        assert!((profile.ops - profile.obp - profile.slg).abs() < 1e-12);
        assert_eq!(profile.woba, crate::LEAGUE_WOBA);
    }

    #[test]
    fn pitch_mix_renormalizes() {
        let mut profile = PitchingProfile::league_average();
        profile.pitch_mix = vec![("four-seam".into(), 0.6), ("slider".into(), 0.6)];
        assert!(profile.repair());
        let total: f64 = profile.pitch_mix.iter().map(|(_, s)| s).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn thin_splits_are_unusable() {
        let split = BattingSplit { pa: 19, ..BattingSplit::default() };
        assert!(!split.usable());
        let split = BattingSplit { pa: 20, ..BattingSplit::default() };
        assert!(split.usable());
    }
}
