use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of fretted lanes on the highway.
pub const FRET_COUNT: usize = 5;

/// Wire value of the open (no fret) lane.
pub const OPEN_LANE: u8 = 7;

/// One of the five fret buttons, low to high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Fret {
    Green = 0,
    Red = 1,
    Yellow = 2,
    Blue = 3,
    Orange = 4,
}

impl Fret {
    pub const ALL: [Fret; FRET_COUNT] = [
        Fret::Green,
        Fret::Red,
        Fret::Yellow,
        Fret::Blue,
        Fret::Orange,
    ];

    /// Slot index (0-4).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Get a fret from its slot index. Returns None for anything above 4.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Single-letter name used in shape dumps.
    pub fn letter(self) -> char {
        match self {
            Fret::Green => 'G',
            Fret::Red => 'R',
            Fret::Yellow => 'Y',
            Fret::Blue => 'B',
            Fret::Orange => 'O',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid lane index: {0}")]
pub struct InvalidLane(pub u8);

/// Lane a note occupies: one of the frets, or the open strum lane.
///
/// Serialized as an integer: 0-4 for frets, 7 for open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Lane {
    Fret(Fret),
    Open,
}

impl Lane {
    pub fn fret(self) -> Option<Fret> {
        match self {
            Lane::Fret(fret) => Some(fret),
            Lane::Open => None,
        }
    }

    pub fn is_open(self) -> bool {
        self == Lane::Open
    }
}

impl From<Fret> for Lane {
    fn from(fret: Fret) -> Self {
        Lane::Fret(fret)
    }
}

impl TryFrom<u8> for Lane {
    type Error = InvalidLane;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            OPEN_LANE => Ok(Lane::Open),
            v => Fret::from_index(v as usize)
                .map(Lane::Fret)
                .ok_or(InvalidLane(v)),
        }
    }
}

impl From<Lane> for u8 {
    fn from(lane: Lane) -> Self {
        match lane {
            Lane::Fret(fret) => fret as u8,
            Lane::Open => OPEN_LANE,
        }
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lane::Fret(fret) => write!(f, "{fret:?}"),
            Lane::Open => f.write_str("Open"),
        }
    }
}
