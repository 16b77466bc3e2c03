use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use fret_rule::{FullCombo, Grade, JudgementTable};

use crate::engine::HistoryEntry;

/// End-of-song snapshot of an engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Results {
    /// Hit window in seconds.
    pub hit_window: f64,
    pub judgements: JudgementTable,
    pub history: Vec<HistoryEntry>,
    pub score: u64,
    pub hits: u32,
    pub misses: u32,
    pub overstrums: u32,
    pub chord_count: usize,
    /// Weighted accuracy, 0.0-1.0.
    pub accuracy: f64,
    pub grade: Grade,
    pub full_combo: FullCombo,
    pub streak: u32,
    pub max_streak: u32,
}

impl Results {
    pub fn accuracy_percent(&self) -> f64 {
        self.accuracy * 100.0
    }

    /// Mean signed timing error of hits in seconds, if any chord was hit.
    pub fn mean_error(&self) -> Option<f64> {
        let miss = self.judgements.tiers().len().checked_sub(1)?;
        let errors: Vec<f64> = self
            .history
            .iter()
            .filter(|h| h.judgement != miss)
            .map(|h| h.error)
            .collect();
        if errors.is_empty() {
            None
        } else {
            Some(errors.iter().sum::<f64>() / errors.len() as f64)
        }
    }

    pub fn read(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read results {}", path.display()))?;
        serde_json::from_str(&data).with_context(|| format!("invalid results {}", path.display()))
    }

    /// Write as pretty-printed JSON.
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write results {}", path.display()))?;
        Ok(())
    }
}

impl fmt::Display for Results {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Score:      {}", self.score)?;
        writeln!(
            f,
            "Accuracy:   {:.2}% ({})",
            self.accuracy_percent(),
            self.grade
        )?;
        writeln!(f, "Result:     {}", self.full_combo)?;
        writeln!(
            f,
            "Notes:      {} hit / {} missed of {}",
            self.hits, self.misses, self.chord_count
        )?;
        writeln!(f, "Overstrums: {}", self.overstrums)?;
        write!(f, "Streak:     {} (best {})", self.streak, self.max_streak)
    }
}
