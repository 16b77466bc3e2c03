use std::fmt;

use serde::{Deserialize, Serialize};

/// Letter grade from accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    SS,
    S,
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// Thresholds in accuracy percent, best grade first.
    const THRESHOLDS: [(f64, Grade); 6] = [
        (97.5, Grade::SS),
        (95.0, Grade::S),
        (90.0, Grade::A),
        (80.0, Grade::B),
        (70.0, Grade::C),
        (60.0, Grade::D),
    ];

    /// Grade for an accuracy ratio in 0.0-1.0.
    pub fn from_accuracy(accuracy: f64) -> Self {
        let percent = accuracy * 100.0;
        Self::THRESHOLDS
            .iter()
            .find(|(min, _)| percent >= *min)
            .map_or(Grade::F, |(_, grade)| *grade)
    }

    /// Grades good enough to be reported as part of a full combo (e.g. "SFC").
    pub fn shows_on_full_combo(self) -> bool {
        matches!(self, Grade::SS | Grade::S | Grade::A)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Grade::SS => "SS",
            Grade::S => "S",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
