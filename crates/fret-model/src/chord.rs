use serde::{Deserialize, Serialize};

use crate::chord_shape::ChordShape;
use crate::lane::{Fret, Lane};
use crate::note::{Note, NoteKind};

/// Judgement state of a chord. Leaves `Pending` exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum ChordState {
    #[default]
    Pending,
    Hit {
        time: f64,
    },
    Missed,
}

/// Notes sharing one timestamp, judged as a unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Chord {
    time: f64,
    notes: Vec<Note>,
    state: ChordState,
}

impl Chord {
    /// Build a chord from its notes. The chord time is the first note's time;
    /// [`Chart::new`](crate::Chart::new) checks that the notes agree.
    pub fn new(notes: Vec<Note>) -> Self {
        let time = notes.first().map_or(0.0, |n| n.time);
        Self {
            time,
            notes,
            state: ChordState::Pending,
        }
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn size(&self) -> usize {
        self.notes.len()
    }

    /// Lanes involved, sorted and deduplicated.
    pub fn lanes(&self) -> Vec<Lane> {
        let mut lanes: Vec<Lane> = self.notes.iter().map(|n| n.lane).collect();
        lanes.sort();
        lanes.dedup();
        lanes
    }

    pub fn frets(&self) -> Vec<Fret> {
        self.lanes().into_iter().filter_map(Lane::fret).collect()
    }

    /// Chord kind after flag resolution: any tap makes a tap chord, otherwise
    /// any HOPO makes a HOPO chord.
    pub fn kind(&self) -> NoteKind {
        if self.notes.iter().any(|n| n.kind == NoteKind::Tap) {
            NoteKind::Tap
        } else if self.notes.iter().any(|n| n.kind == NoteKind::Hopo) {
            NoteKind::Hopo
        } else {
            NoteKind::Normal
        }
    }

    /// Longest sustain among the notes.
    pub fn length(&self) -> f64 {
        self.notes.iter().map(|n| n.length).fold(0.0, f64::max)
    }

    pub fn end_time(&self) -> f64 {
        self.notes
            .iter()
            .map(Note::end_time)
            .fold(self.time, f64::max)
    }

    pub fn is_sustain(&self) -> bool {
        self.length() > 0.0
    }

    /// Single note on the open lane.
    pub fn is_open(&self) -> bool {
        self.notes.len() == 1 && self.notes[0].lane.is_open()
    }

    /// Shape the player must hold to hit this chord.
    ///
    /// Open chords need every fret released. Single fretted notes ignore the
    /// frets below them. Multi-note chords are exact.
    pub fn shape(&self) -> ChordShape {
        let frets = self.frets();
        match frets.as_slice() {
            [] => ChordShape::released(),
            [single] if self.notes.len() == 1 => {
                ChordShape::from_frets([*single]).anchor_below(*single)
            }
            _ => ChordShape::from_frets(frets),
        }
    }

    pub fn state(&self) -> ChordState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state == ChordState::Pending
    }

    pub fn is_hit(&self) -> bool {
        matches!(self.state, ChordState::Hit { .. })
    }

    pub fn is_missed(&self) -> bool {
        self.state == ChordState::Missed
    }

    /// Mark the chord hit at `time`. Returns false if it was already judged.
    pub fn mark_hit(&mut self, time: f64) -> bool {
        if !self.is_pending() {
            return false;
        }
        self.state = ChordState::Hit { time };
        for note in &mut self.notes {
            note.hit = true;
            note.hit_time = Some(time);
        }
        true
    }

    /// Mark the chord missed. Returns false if it was already judged.
    pub fn mark_missed(&mut self) -> bool {
        if !self.is_pending() {
            return false;
        }
        self.state = ChordState::Missed;
        for note in &mut self.notes {
            note.missed = true;
        }
        true
    }

    pub fn reset(&mut self) {
        self.state = ChordState::Pending;
        self.notes.iter_mut().for_each(Note::reset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chord(notes: &[(Lane, NoteKind)]) -> Chord {
        Chord::new(
            notes
                .iter()
                .map(|(lane, kind)| Note::new(1.0, *lane, *kind))
                .collect(),
        )
    }

    #[test]
    fn test_kind_resolution() {
        let g = Lane::Fret(Fret::Green);
        let r = Lane::Fret(Fret::Red);
        assert_eq!(chord(&[(g, NoteKind::Normal)]).kind(), NoteKind::Normal);
        assert_eq!(
            chord(&[(g, NoteKind::Hopo), (r, NoteKind::Normal)]).kind(),
            NoteKind::Hopo
        );
        assert_eq!(
            chord(&[(g, NoteKind::Hopo), (r, NoteKind::Tap)]).kind(),
            NoteKind::Tap
        );
        assert_eq!(chord(&[(g, NoteKind::Continuation)]).kind(), NoteKind::Normal);
    }

    #[test]
    fn test_single_note_shape_is_anchored() {
        let c = chord(&[(Lane::Fret(Fret::Blue), NoteKind::Normal)]);
        assert_eq!(c.shape().to_string(), "***B-");
    }

    #[test]
    fn test_multi_note_shape_is_exact() {
        let c = chord(&[
            (Lane::Fret(Fret::Red), NoteKind::Normal),
            (Lane::Fret(Fret::Blue), NoteKind::Normal),
        ]);
        assert_eq!(c.shape().to_string(), "-R-B-");
        assert_eq!(c.size(), 2);
        assert_eq!(c.frets(), vec![Fret::Red, Fret::Blue]);
    }

    #[test]
    fn test_open_chord_shape() {
        let c = chord(&[(Lane::Open, NoteKind::Normal)]);
        assert!(c.is_open());
        assert!(c.shape().is_open());
    }

    #[test]
    fn test_end_time_is_longest_note() {
        let c = Chord::new(vec![
            Note::normal(2.0, Fret::Green).with_sustain(0.5, 96),
            Note::normal(2.0, Fret::Red).with_sustain(1.0, 192),
        ]);
        assert_eq!(c.length(), 1.0);
        assert_eq!(c.end_time(), 3.0);
        assert!(c.is_sustain());
    }

    #[test]
    fn test_state_transitions_once() {
        let mut c = chord(&[(Lane::Fret(Fret::Green), NoteKind::Normal)]);
        assert!(c.is_pending());
        assert!(c.mark_hit(1.01));
        assert!(c.is_hit());
        assert_eq!(c.notes()[0].hit_time, Some(1.01));
        assert!(!c.mark_missed());
        assert!(!c.mark_hit(1.02));
        assert_eq!(c.state(), ChordState::Hit { time: 1.01 });

        c.reset();
        assert!(c.mark_missed());
        assert!(c.notes()[0].missed);
        assert!(!c.mark_hit(1.0));
    }
}
