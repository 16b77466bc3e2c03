// Fret chart data model: lanes, notes, chords, chord shapes

mod chart;
mod chord;
mod chord_shape;
mod lane;
mod note;

pub use chart::{Chart, ChartError, ChartFile, DEFAULT_RESOLUTION};
pub use chord::{Chord, ChordState};
pub use chord_shape::{ChordShape, FretState};
pub use lane::{FRET_COUNT, Fret, InvalidLane, Lane, OPEN_LANE};
pub use note::{Note, NoteKind};
