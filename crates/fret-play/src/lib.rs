//! Note judging for five-fret charts.
//!
//! An [`Engine`] owns a [`Chart`](fret_model::Chart) and is driven once per
//! frame: [`Engine::update`] with the song time, then
//! [`Engine::calculate_score`] to judge everything buffered since the last
//! frame. [`simulate`] does the same over a recorded key log.

mod engine;
mod input;
mod results;
mod simulate;
mod sustain;

pub use engine::{Engine, HistoryEntry, JudgeEvent};
pub use input::{InputAction, InputEvent, events_from_keylog};
pub use results::Results;
pub use simulate::{DEFAULT_FRAME_STEP, simulate};
pub use sustain::{FretHold, Sustain, SustainFret};
