use serde::{Deserialize, Serialize};

use crate::lane::Lane;

/// How a note may be hit, after the chart loader resolved HOPO/tap/force flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteKind {
    /// Requires a strum.
    #[default]
    Normal,
    /// Hammer-on/pull-off: may be hit by fretting alone while a streak is alive.
    Hopo,
    /// May always be hit by fretting alone.
    Tap,
    /// Tail piece produced when the loader splits a sustain; strummed like a normal note.
    Continuation,
}

/// A single lane-press requirement in the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Start time in seconds.
    pub time: f64,
    pub lane: Lane,
    /// Sustain length in seconds (0 for non-sustained notes).
    #[serde(default)]
    pub length: f64,
    /// Start position in chart ticks.
    #[serde(default)]
    pub tick: u32,
    /// Sustain length in chart ticks.
    #[serde(default)]
    pub tick_length: u32,
    #[serde(default)]
    pub kind: NoteKind,
    #[serde(skip)]
    pub hit: bool,
    #[serde(skip)]
    pub missed: bool,
    #[serde(skip)]
    pub hit_time: Option<f64>,
}

impl Note {
    pub fn new(time: f64, lane: impl Into<Lane>, kind: NoteKind) -> Self {
        Self {
            time,
            lane: lane.into(),
            length: 0.0,
            tick: 0,
            tick_length: 0,
            kind,
            hit: false,
            missed: false,
            hit_time: None,
        }
    }

    pub fn normal(time: f64, lane: impl Into<Lane>) -> Self {
        Self::new(time, lane, NoteKind::Normal)
    }

    /// Give the note a sustain of `length` seconds spanning `tick_length` chart ticks.
    pub fn with_sustain(mut self, length: f64, tick_length: u32) -> Self {
        self.length = length;
        self.tick_length = tick_length;
        self
    }

    pub fn end_time(&self) -> f64 {
        self.time + self.length
    }

    pub fn is_sustain(&self) -> bool {
        self.length > 0.0
    }

    pub fn is_judged(&self) -> bool {
        self.hit || self.missed
    }

    /// Clear the outcome fields so the note can be judged again.
    pub fn reset(&mut self) {
        self.hit = false;
        self.missed = false;
        self.hit_time = None;
    }
}
