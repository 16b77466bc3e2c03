use serde::{Deserialize, Serialize};

use fret_model::{FRET_COUNT, Fret};

use crate::error::ReplayError;

/// Key code of the strum bar. Codes below it are fret indices.
pub const STRUM_KEY: i32 = FRET_COUNT as i32;

/// A controller input resolved from a key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKey {
    Fret(Fret),
    Strum,
}

impl InputKey {
    pub fn from_code(code: i32) -> Result<Self, ReplayError> {
        if code == STRUM_KEY {
            return Ok(InputKey::Strum);
        }
        usize::try_from(code)
            .ok()
            .and_then(Fret::from_index)
            .map(InputKey::Fret)
            .ok_or(ReplayError::UnknownKey(code))
    }

    pub fn code(self) -> i32 {
        match self {
            InputKey::Fret(fret) => fret.index() as i32,
            InputKey::Strum => STRUM_KEY,
        }
    }
}

/// One recorded key transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInputLog {
    /// Song time of the transition in microseconds.
    #[serde(default)]
    pub presstime: i64,
    /// Key code: 0-4 for frets, [`STRUM_KEY`] for the strum bar.
    pub key: i32,
    pub pressed: bool,
    /// Legacy millisecond timestamp, migrated into `presstime` by `validate`.
    #[serde(default)]
    pub time: i64,
}

impl KeyInputLog {
    pub fn new(presstime: i64, key: i32, pressed: bool) -> Self {
        Self {
            presstime,
            key,
            pressed,
            time: 0,
        }
    }

    pub fn fret(presstime: i64, fret: Fret, pressed: bool) -> Self {
        Self::new(presstime, InputKey::Fret(fret).code(), pressed)
    }

    pub fn strum(presstime: i64) -> Self {
        Self::new(presstime, STRUM_KEY, true)
    }

    /// Input time in microseconds, falling back to the legacy field.
    pub fn get_time(&self) -> i64 {
        if self.presstime != 0 {
            self.presstime
        } else {
            self.time * 1000
        }
    }

    /// Input time in seconds.
    pub fn seconds(&self) -> f64 {
        self.get_time() as f64 / 1_000_000.0
    }

    pub fn input_key(&self) -> Result<InputKey, ReplayError> {
        InputKey::from_code(self.key)
    }

    /// Migrate legacy data. Returns `true` if the entry is usable.
    pub fn validate(&mut self) -> bool {
        if self.time > 0 {
            self.presstime = self.time * 1000;
            self.time = 0;
        }
        self.presstime >= 0 && InputKey::from_code(self.key).is_ok()
    }
}
