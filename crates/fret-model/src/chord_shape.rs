use std::fmt;

use serde::{Deserialize, Serialize};

use crate::lane::{FRET_COUNT, Fret};

/// State of one fret slot in a [`ChordShape`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FretState {
    #[default]
    Released,
    Pressed,
    /// Don't care. Either state satisfies the slot.
    Anchored,
}

/// Tri-state mask over the five frets.
///
/// Used both for what the player is holding (never anchored) and for what a
/// chord or sustain requires (anchored slots are ignored when comparing).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ChordShape([FretState; FRET_COUNT]);

impl ChordShape {
    pub const fn released() -> Self {
        Self([FretState::Released; FRET_COUNT])
    }

    pub const fn new(slots: [FretState; FRET_COUNT]) -> Self {
        Self(slots)
    }

    /// Exact shape: the given frets pressed, everything else released.
    pub fn from_frets(frets: impl IntoIterator<Item = Fret>) -> Self {
        frets
            .into_iter()
            .fold(Self::released(), |shape, fret| shape.update_fret(fret, true))
    }

    pub fn get(&self, fret: Fret) -> FretState {
        self.0[fret.index()]
    }

    pub fn slots(&self) -> [FretState; FRET_COUNT] {
        self.0
    }

    pub fn with(mut self, fret: Fret, state: FretState) -> Self {
        self.0[fret.index()] = state;
        self
    }

    /// Copy of this shape with one fret pressed or released.
    pub fn update_fret(self, fret: Fret, pressed: bool) -> Self {
        let state = if pressed {
            FretState::Pressed
        } else {
            FretState::Released
        };
        self.with(fret, state)
    }

    /// Copy of this shape with every fret below `fret` set to don't-care.
    pub fn anchor_below(mut self, fret: Fret) -> Self {
        for slot in &mut self.0[..fret.index()] {
            *slot = FretState::Anchored;
        }
        self
    }

    pub fn is_pressed(&self, fret: Fret) -> bool {
        self.get(fret) == FretState::Pressed
    }

    pub fn pressed_frets(&self) -> impl Iterator<Item = Fret> + '_ {
        Fret::ALL.into_iter().filter(|f| self.is_pressed(*f))
    }

    /// Every slot that is asserted on both sides agrees.
    pub fn matches(&self, other: &ChordShape) -> bool {
        self.0.iter().zip(other.0.iter()).all(|(a, b)| {
            *a == FretState::Anchored || *b == FretState::Anchored || a == b
        })
    }

    /// Every fret `other` requires pressed is pressed (or don't-care) here.
    ///
    /// Extra pressed frets in `self` are allowed, anchored slots on either side
    /// are ignored.
    pub fn contains(&self, other: &ChordShape) -> bool {
        self.0.iter().zip(other.0.iter()).all(|(a, b)| {
            *b != FretState::Pressed || matches!(a, FretState::Pressed | FretState::Anchored)
        })
    }

    /// All five frets released.
    pub fn is_open(&self) -> bool {
        self.0.iter().all(|s| *s == FretState::Released)
    }
}

impl fmt::Display for ChordShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for fret in Fret::ALL {
            let c = match self.get(fret) {
                FretState::Pressed => fret.letter(),
                FretState::Released => '-',
                FretState::Anchored => '*',
            };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}
