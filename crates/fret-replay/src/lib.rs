// Recorded input logs, replay storage and autoplay generation

pub mod autoplay;
mod error;
mod key_input_log;
mod replay_data;

pub use error::ReplayError;
pub use key_input_log::{InputKey, KeyInputLog, STRUM_KEY};
pub use replay_data::{ReplayData, read_replay, write_replay};
