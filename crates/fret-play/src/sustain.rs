use fret_model::{Chord, ChordShape, Fret, Lane, NoteKind};
use fret_rule::SUSTAIN_POINTS_PER_BEAT;

/// Hold state of one sustained lane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FretHold {
    Held,
    /// Let go early at the given chart time.
    Dropped(f64),
    /// Held to the end (or released inside the end leniency) at the given chart time.
    Finished(f64),
}

/// One sustained note of a sustain.
#[derive(Debug, Clone, PartialEq)]
pub struct SustainFret {
    pub lane: Lane,
    pub start: f64,
    pub end: f64,
    pub tick_length: u32,
    pub hold: FretHold,
}

impl SustainFret {
    pub fn fret(&self) -> Option<Fret> {
        self.lane.fret()
    }

    /// Still being held at `time`.
    pub fn is_live(&self, time: f64) -> bool {
        self.hold == FretHold::Held && time < self.end
    }

    /// Fraction of the note held, 0.0-1.0.
    pub fn proportion(&self, time: f64) -> f64 {
        let until = match self.hold {
            FretHold::Held => time,
            FretHold::Dropped(at) => at,
            FretHold::Finished(_) => return 1.0,
        };
        let length = self.end - self.start;
        if length <= 0.0 {
            return 1.0;
        }
        ((until - self.start) / length).clamp(0.0, 1.0)
    }

    /// Unrounded points for the held portion, before the multiplier.
    fn value(&self, time: f64, resolution: u32) -> f64 {
        self.proportion(time) * f64::from(self.tick_length) * SUSTAIN_POINTS_PER_BEAT
            / f64::from(resolution)
    }

    fn selected(&self, frets: Option<&[Fret]>) -> bool {
        match frets {
            None => true,
            Some(frets) => self.fret().is_some_and(|f| frets.contains(&f)),
        }
    }
}

/// An active long note, created when a chord with length is hit.
#[derive(Debug, Clone, PartialEq)]
pub struct Sustain {
    chord: usize,
    start: f64,
    end: f64,
    hit_time: f64,
    multiplier: u32,
    frets: Vec<SustainFret>,
    single: bool,
    disjoint: bool,
    open: bool,
    tap: bool,
    finished: bool,
}

impl Sustain {
    /// Start tracking the sustained notes of `chord` (chart index `index`),
    /// hit at `hit_time` with the multiplier that applied to the hit.
    pub fn new(index: usize, chord: &Chord, hit_time: f64, multiplier: u32) -> Self {
        let notes = chord.notes();
        let frets: Vec<SustainFret> = notes
            .iter()
            .filter(|n| n.is_sustain())
            .map(|n| SustainFret {
                lane: n.lane,
                start: n.time,
                end: n.end_time(),
                tick_length: n.tick_length,
                hold: FretHold::Held,
            })
            .collect();
        let disjoint = notes.windows(2).any(|w| w[0].length != w[1].length);
        Self {
            chord: index,
            start: chord.time(),
            end: chord.end_time(),
            hit_time,
            multiplier,
            frets,
            single: notes.len() == 1,
            disjoint,
            open: chord.is_open(),
            tap: chord.kind() == NoteKind::Tap,
            finished: false,
        }
    }

    /// Chart index of the source chord.
    pub fn chord(&self) -> usize {
        self.chord
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn hit_time(&self) -> f64 {
        self.hit_time
    }

    pub fn multiplier(&self) -> u32 {
        self.multiplier
    }

    pub fn frets(&self) -> &[SustainFret] {
        &self.frets
    }

    pub fn is_single(&self) -> bool {
        self.single
    }

    pub fn is_disjoint(&self) -> bool {
        self.disjoint
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_tap(&self) -> bool {
        self.tap
    }

    /// Lower frets may rest on the neck without counting against the hold.
    pub fn is_anchored(&self) -> bool {
        self.single || (self.tap && !self.open)
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Frets still held at `time`.
    pub fn live_frets(&self, time: f64) -> impl Iterator<Item = Fret> + '_ {
        self.frets
            .iter()
            .filter(move |f| f.is_live(time))
            .filter_map(SustainFret::fret)
    }

    /// Latest end among the notes on `fret`.
    pub fn fret_end(&self, fret: Fret) -> Option<f64> {
        self.frets
            .iter()
            .filter(|f| f.fret() == Some(fret))
            .map(|f| f.end)
            .reduce(f64::max)
    }

    pub fn is_live(&self, fret: Fret, time: f64) -> bool {
        self.live_frets(time).any(|f| f == fret)
    }

    /// Shape the player has to keep holding at `time`.
    pub fn get_shape_at_time(&self, time: f64) -> ChordShape {
        if self.open {
            return ChordShape::released();
        }
        let shape = ChordShape::from_frets(self.live_frets(time));
        match self.live_frets(time).min() {
            Some(lowest) if self.is_anchored() => shape.anchor_below(lowest),
            _ => shape,
        }
    }

    fn settle(&mut self, frets: Option<&[Fret]>, hold: FretHold) -> bool {
        let mut changed = false;
        for f in self.frets.iter_mut() {
            if f.hold == FretHold::Held && f.selected(frets) {
                f.hold = hold;
                changed = true;
            }
        }
        changed
    }

    /// Mark the given frets (all when `None`) as let go at `time`.
    /// Frets already settled keep their first time. Returns whether anything changed.
    pub fn drop_sustain(&mut self, time: f64, frets: Option<&[Fret]>) -> bool {
        self.settle(frets, FretHold::Dropped(time))
    }

    /// Mark the given frets (all when `None`) as held to completion at `time`.
    pub fn finish_sustain(&mut self, time: f64, frets: Option<&[Fret]>) -> bool {
        self.settle(frets, FretHold::Finished(time))
    }

    /// Let go of frets at `time`; frets within `end_leniency` of their end
    /// finish instead of dropping. Returns whether any fret was dropped.
    pub fn release(&mut self, time: f64, frets: Option<&[Fret]>, end_leniency: f64) -> bool {
        let mut dropped = false;
        for f in self.frets.iter_mut() {
            if f.hold != FretHold::Held || !f.selected(frets) {
                continue;
            }
            if f.end - time <= end_leniency {
                f.hold = FretHold::Finished(time);
            } else {
                f.hold = FretHold::Dropped(time);
                dropped = true;
            }
        }
        dropped
    }

    /// Finish every fret whose end has been reached by `time`, stamped at that end.
    pub fn finish_elapsed(&mut self, time: f64) {
        if self.open {
            if self.end <= time {
                self.finish_sustain(self.end, None);
            }
            return;
        }
        for fret in Fret::ALL {
            if let Some(end) = self.fret_end(fret)
                && end <= time
            {
                self.finish_sustain(end, Some(std::slice::from_ref(&fret)));
            }
        }
    }

    /// True (and latched) once every fret has been dropped or finished.
    pub fn check_finished(&mut self) -> bool {
        if !self.finished && self.frets.iter().all(|f| f.hold != FretHold::Held) {
            self.finished = true;
        }
        self.finished
    }

    /// Committed points: per-fret values rounded up, times the locked multiplier.
    pub fn score(&self, resolution: u32) -> u64 {
        let points: u64 = self
            .frets
            .iter()
            .map(|f| f.value(self.end, resolution).ceil() as u64)
            .sum();
        points * u64::from(self.multiplier)
    }

    /// Unrounded points as of `time`, for a running display.
    pub fn rolling_score(&self, time: f64, resolution: u32) -> f64 {
        let points: f64 = self.frets.iter().map(|f| f.value(time, resolution)).sum();
        points * f64::from(self.multiplier)
    }
}
