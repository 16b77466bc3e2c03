// Judgement windows, streak multiplier, grades, full-combo classes, engine settings

mod full_combo;
mod grade;
mod judgement;
mod settings;

pub use full_combo::FullCombo;
pub use grade::Grade;
pub use judgement::{Judgement, JudgementTable};
pub use settings::EngineSettings;

/// Points awarded per note of a hit chord, before the multiplier.
pub const NOTE_SCORE: u32 = 50;

/// Sustain points per beat (per `resolution` ticks), before the multiplier.
pub const SUSTAIN_POINTS_PER_BEAT: f64 = 25.0;

/// Streak length needed to step up one multiplier tier.
pub const STREAK_PER_TIER: u32 = 10;

/// Highest multiplier reachable from streak alone.
pub const MAX_MULTIPLIER: u32 = 4;

/// Score multiplier for a streak: `min(streak / 10 + 1, 4)`.
pub fn multiplier(streak: u32) -> u32 {
    (streak / STREAK_PER_TIER + 1).min(MAX_MULTIPLIER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_multiplier_tiers() {
        assert_eq!(multiplier(0), 1);
        assert_eq!(multiplier(9), 1);
        assert_eq!(multiplier(10), 2);
        assert_eq!(multiplier(19), 2);
        assert_eq!(multiplier(20), 3);
        assert_eq!(multiplier(30), 4);
        assert_eq!(multiplier(1000), 4);
        assert_eq!(multiplier(u32::MAX), 4);
    }

    proptest! {
        #[test]
        fn test_multiplier_matches_formula(streak in 0u32..1_000_000) {
            prop_assert_eq!(multiplier(streak), std::cmp::min(streak / 10 + 1, 4));
        }
    }
}
