use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const OFFSET_MAX: f64 = 1.0;
pub const OFFSET_MIN: f64 = -1.0;
pub const LENIENCY_MAX: f64 = 1.0;
pub const LENIENCY_MIN: f64 = 0.0;

/// Tunables of the judging engine. All durations are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct EngineSettings {
    /// Input latency calibration, added to song time and to every input timestamp.
    pub offset: f64,
    /// Tap chords held before their window opens are hit as soon as it does.
    pub infinite_front_end: bool,
    /// Disjoint sustains drop all frets together instead of fret by fret.
    pub linked_disjoints: bool,
    /// A strum may hit a later chord inside the window when the head chord does not match.
    pub can_chord_skip: bool,
    /// Chords passed over by a chord skip are missed immediately.
    pub punish_chord_skip: bool,
    /// Reserved; has no effect.
    pub reward_sustain_accuracy: bool,
    /// How long after a fret-only HOPO/tap hit a strum is forgiven.
    pub hopo_leniency: f64,
    /// How long a strum waits for the frets to catch up, and the double-strum window.
    pub strum_leniency: f64,
    /// Reserved; has no effect.
    pub no_note_leniency: f64,
    /// Releasing a sustain this close to its end still counts as holding it out.
    pub sustain_end_leniency: f64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            offset: 0.0,
            infinite_front_end: false,
            linked_disjoints: false,
            can_chord_skip: false,
            punish_chord_skip: false,
            reward_sustain_accuracy: false,
            hopo_leniency: 0.080,
            strum_leniency: 0.060,
            no_note_leniency: 0.020,
            sustain_end_leniency: 0.100,
        }
    }
}

impl EngineSettings {
    pub fn validate(&mut self) {
        self.offset = clamp_or(self.offset, OFFSET_MIN, OFFSET_MAX, 0.0);
        let defaults = Self::default();
        self.hopo_leniency = clamp_or(
            self.hopo_leniency,
            LENIENCY_MIN,
            LENIENCY_MAX,
            defaults.hopo_leniency,
        );
        self.strum_leniency = clamp_or(
            self.strum_leniency,
            LENIENCY_MIN,
            LENIENCY_MAX,
            defaults.strum_leniency,
        );
        self.no_note_leniency = clamp_or(
            self.no_note_leniency,
            LENIENCY_MIN,
            LENIENCY_MAX,
            defaults.no_note_leniency,
        );
        self.sustain_end_leniency = clamp_or(
            self.sustain_end_leniency,
            LENIENCY_MIN,
            LENIENCY_MAX,
            defaults.sustain_end_leniency,
        );
        if self.punish_chord_skip && !self.can_chord_skip {
            log::warn!("punishChordSkip ignored: chord skipping is disabled");
            self.punish_chord_skip = false;
        }
    }

    /// Read settings from a JSON file.
    pub fn read(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings {}", path.display()))?;
        let mut settings: EngineSettings = serde_json::from_str(&data)
            .with_context(|| format!("invalid settings {}", path.display()))?;
        settings.validate();
        Ok(settings)
    }

    /// Write settings to a JSON file.
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Clamp into range; NaN falls back to `fallback`.
fn clamp_or(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(min, max)
    }
}
