use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chord::Chord;
use crate::note::Note;

/// Ticks per beat used when a chart file does not say.
pub const DEFAULT_RESOLUTION: u32 = 192;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChartError {
    #[error("chart has no chords")]
    Empty,

    #[error("invalid tick resolution: {0}")]
    InvalidResolution(u32),

    #[error("chord {index} has no notes")]
    EmptyChord { index: usize },

    #[error("chord {index} at {time}s starts before the previous chord")]
    Unsorted { index: usize, time: f64 },

    #[error("chord {index} contains notes at different times")]
    MixedChordTimes { index: usize },

    #[error("chord {index} contains a note with negative length")]
    NegativeLength { index: usize },
}

/// On-disk chart: a flat, time-sorted note list plus the tick resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartFile {
    #[serde(default = "default_resolution")]
    pub resolution: u32,
    pub notes: Vec<Note>,
}

fn default_resolution() -> u32 {
    DEFAULT_RESOLUTION
}

/// A parsed chart: time-ordered chords ready for judging.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    resolution: u32,
    chords: Vec<Chord>,
}

impl Chart {
    /// Validate and wrap a chord list.
    pub fn new(resolution: u32, chords: Vec<Chord>) -> Result<Self, ChartError> {
        if resolution == 0 {
            return Err(ChartError::InvalidResolution(resolution));
        }
        if chords.is_empty() {
            return Err(ChartError::Empty);
        }
        let mut prev_time = f64::NEG_INFINITY;
        for (index, chord) in chords.iter().enumerate() {
            if chord.notes().is_empty() {
                return Err(ChartError::EmptyChord { index });
            }
            if chord.notes().iter().any(|n| n.time != chord.time()) {
                return Err(ChartError::MixedChordTimes { index });
            }
            if chord.notes().iter().any(|n| n.length < 0.0) {
                return Err(ChartError::NegativeLength { index });
            }
            if chord.time() < prev_time {
                return Err(ChartError::Unsorted {
                    index,
                    time: chord.time(),
                });
            }
            prev_time = chord.time();
        }
        Ok(Self { resolution, chords })
    }

    /// Group notes sharing a timestamp into chords.
    pub fn from_notes(resolution: u32, mut notes: Vec<Note>) -> Result<Self, ChartError> {
        notes.sort_by(|a, b| a.time.total_cmp(&b.time));
        let mut chords: Vec<Chord> = Vec::new();
        let mut current: Vec<Note> = Vec::new();
        for note in notes {
            if current.first().is_some_and(|n| n.time != note.time) {
                chords.push(Chord::new(std::mem::take(&mut current)));
            }
            current.push(note);
        }
        if !current.is_empty() {
            chords.push(Chord::new(current));
        }
        Self::new(resolution, chords)
    }

    pub fn from_file(file: ChartFile) -> Result<Self, ChartError> {
        Self::from_notes(file.resolution, file.notes)
    }

    /// Parse a chart from JSON text.
    pub fn parse(json: &str) -> Result<Self> {
        let file: ChartFile = serde_json::from_str(json)?;
        let chart = Self::from_file(file)?;
        log::debug!(
            "parsed chart: {} chords, {} notes, resolution {}",
            chart.chords.len(),
            chart.note_count(),
            chart.resolution
        );
        Ok(chart)
    }

    /// Read a chart from a JSON file.
    pub fn read(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read chart {}", path.display()))?;
        Self::parse(&data).with_context(|| format!("invalid chart {}", path.display()))
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn chords(&self) -> &[Chord] {
        &self.chords
    }

    pub fn chord(&self, index: usize) -> &Chord {
        &self.chords[index]
    }

    pub fn chord_mut(&mut self, index: usize) -> &mut Chord {
        &mut self.chords[index]
    }

    pub fn len(&self) -> usize {
        self.chords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chords.is_empty()
    }

    pub fn note_count(&self) -> usize {
        self.chords.iter().map(Chord::size).sum()
    }

    /// Time the last note (including its sustain) ends.
    pub fn end_time(&self) -> f64 {
        self.chords
            .iter()
            .map(Chord::end_time)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Put every chord back to pending.
    pub fn reset(&mut self) {
        self.chords.iter_mut().for_each(Chord::reset);
    }
}
