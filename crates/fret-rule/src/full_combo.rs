use std::fmt;

use serde::{Deserialize, Serialize};

use crate::grade::Grade;

/// Miss count below which a non-FC run is still called out as a single-digit combo break.
const SDCB_LIMIT: u32 = 10;

/// Full-combo classification of a finished (or in-progress) run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FullCombo {
    /// No misses with grade A or better, shown as e.g. "SSFC".
    GradedFc(Grade),
    /// No misses.
    Fc,
    /// Single-digit combo break: fewer than ten misses.
    Sdcb(u32),
    Clear,
}

impl FullCombo {
    pub fn classify(misses: u32, grade: Grade) -> Self {
        match misses {
            0 if grade.shows_on_full_combo() => FullCombo::GradedFc(grade),
            0 => FullCombo::Fc,
            n if n < SDCB_LIMIT => FullCombo::Sdcb(n),
            _ => FullCombo::Clear,
        }
    }

    pub fn is_full_combo(self) -> bool {
        matches!(self, FullCombo::GradedFc(_) | FullCombo::Fc)
    }
}

impl fmt::Display for FullCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FullCombo::GradedFc(grade) => write!(f, "{grade}FC"),
            FullCombo::Fc => f.write_str("FC"),
            FullCombo::Sdcb(misses) => write!(f, "SDCB (-{misses})"),
            FullCombo::Clear => f.write_str("Clear"),
        }
    }
}
