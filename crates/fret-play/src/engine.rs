//! Judging state machine.
//!
//! Per frame the host calls [`Engine::update`] with the song time and then
//! [`Engine::calculate_score`]. Buffered inputs are handled in arrival order;
//! before each one the engine catches up on time-driven work (sustain ends,
//! missed chords, expired strums, front-end taps) to that input's timestamp,
//! so results do not depend on how the song is sliced into frames.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use fret_model::{Chart, ChordShape, FRET_COUNT, Fret, FretState, NoteKind};
use fret_rule::{EngineSettings, FullCombo, Grade, JudgementTable, multiplier};

use crate::input::{InputAction, InputEvent};
use crate::results::Results;
use crate::sustain::Sustain;

/// One resolved chord: when it was judged, how far off it was, and which tier applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub time: f64,
    /// Judgement time minus chord time, in seconds. Negative is early.
    pub error: f64,
    /// Index into the judgement table.
    pub judgement: usize,
}

/// Something the engine decided during a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum JudgeEvent {
    Hit {
        chord: usize,
        time: f64,
        error: f64,
        judgement: usize,
        points: u64,
    },
    Miss {
        chord: usize,
        time: f64,
    },
    Overstrum {
        time: f64,
    },
    OverstrumForgiven {
        time: f64,
    },
    SustainDropped {
        chord: usize,
        time: f64,
    },
    SustainFinished {
        chord: usize,
        points: u64,
    },
}

/// A fret let go, and until when the chord in reach at that moment covers it.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Release {
    time: f64,
    covered_until: f64,
}

#[derive(Debug, Clone)]
pub struct Engine {
    chart: Chart,
    judgements: JudgementTable,
    settings: EngineSettings,
    hit_window: f64,
    chart_time: f64,
    paused: bool,

    inputs: VecDeque<InputEvent>,
    /// Chart indices of unjudged chords, in time order.
    remaining: VecDeque<usize>,
    sustains: Vec<Sustain>,

    keys: [bool; FRET_COUNT],
    /// Last release of each fret, while it stays up.
    released: [Option<Release>; FRET_COUNT],
    shape: ChordShape,
    tap_consumed: Option<ChordShape>,
    /// Time of the last strum while it is still unresolved.
    pending_strum: Option<f64>,
    last_strum_time: Option<f64>,
    last_fret_change: Option<f64>,
    last_hopo_tap_time: Option<f64>,
    last_judgement: Option<f64>,

    streak: u32,
    max_streak: u32,
    hits: u32,
    misses: u32,
    overstrums: u32,
    accuracy_sum: f64,
    committed: u64,
    uncommitted: f64,
    history: Vec<HistoryEntry>,
    events: Vec<JudgeEvent>,
}

impl Engine {
    pub fn new(mut chart: Chart, judgements: JudgementTable, mut settings: EngineSettings) -> Self {
        chart.reset();
        settings.validate();
        let hit_window = judgements.hit_window();
        log::debug!(
            "engine ready: {} chords, hit window {:.3}s, offset {:.3}s",
            chart.len(),
            hit_window,
            settings.offset
        );
        Self {
            remaining: (0..chart.len()).collect(),
            chart_time: settings.offset,
            chart,
            judgements,
            settings,
            hit_window,
            paused: false,
            inputs: VecDeque::new(),
            sustains: Vec::new(),
            keys: [false; FRET_COUNT],
            released: [None; FRET_COUNT],
            shape: ChordShape::released(),
            tap_consumed: None,
            pending_strum: None,
            last_strum_time: None,
            last_fret_change: None,
            last_hopo_tap_time: None,
            last_judgement: None,
            streak: 0,
            max_streak: 0,
            hits: 0,
            misses: 0,
            overstrums: 0,
            accuracy_sum: 0.0,
            committed: 0,
            uncommitted: 0.0,
            history: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Engine with the default judgement table and settings.
    pub fn with_defaults(chart: Chart) -> Self {
        Self::new(chart, JudgementTable::default(), EngineSettings::default())
    }

    // =========================================================================
    // Frame driving
    // =========================================================================

    /// Advance the clock to `song_time` plus the input offset.
    pub fn update(&mut self, song_time: f64) {
        if self.paused {
            return;
        }
        self.chart_time = song_time + self.settings.offset;
    }

    pub fn push_input(&mut self, event: InputEvent) {
        self.inputs.push_back(event);
    }

    pub fn push_inputs(&mut self, events: impl IntoIterator<Item = InputEvent>) {
        self.inputs.extend(events);
    }

    /// Judge everything up to the current chart time and return what happened.
    pub fn calculate_score(&mut self) -> Vec<JudgeEvent> {
        if self.paused {
            return Vec::new();
        }
        self.process_inputs();
        self.catch_up(self.chart_time);

        let resolution = self.chart.resolution();
        let time = self.chart_time;
        self.uncommitted = self
            .sustains
            .iter()
            .map(|s| s.rolling_score(time, resolution))
            .sum();
        std::mem::take(&mut self.events)
    }

    /// Drain the input buffer in arrival order.
    pub fn process_inputs(&mut self) {
        while let Some(event) = self.inputs.pop_front() {
            let time = event.time + self.settings.offset;
            self.catch_up(time);
            log::trace!("{:?} at {time:.3}", event.action);
            match event.action {
                InputAction::FretDown(fret) => self.on_fret_change(fret, true, time),
                InputAction::FretUp(fret) => self.on_fret_change(fret, false, time),
                InputAction::StrumDown => self.on_strum(time),
            }
        }
    }

    pub fn pause(&mut self) {
        if !self.paused {
            log::debug!("paused at {:.3}", self.chart_time);
            self.paused = true;
        }
    }

    pub fn unpause(&mut self) {
        if self.paused {
            log::debug!("unpaused at {:.3}", self.chart_time);
            self.paused = false;
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Time-driven work up to `time`.
    fn catch_up(&mut self, time: f64) {
        self.phase_sustains(time);
        self.phase_miss(time);
        self.phase_pending_strum(time);
        self.phase_front_end(time);
    }

    /// Close out frets that reached their end, and frets let go while a chord
    /// was in reach once that chord's window has passed.
    fn phase_sustains(&mut self, time: f64) {
        let leniency = self.settings.sustain_end_leniency;
        let linked_disjoints = self.settings.linked_disjoints;

        for sustain in &mut self.sustains {
            let linked = linked_disjoints || !sustain.is_disjoint();
            for fret in Fret::ALL {
                let Some(release) = self.released[fret.index()] else {
                    continue;
                };
                let Some(end) = sustain.fret_end(fret) else {
                    continue;
                };
                if !sustain.is_live(fret, release.time)
                    || (time <= release.covered_until && time < end)
                {
                    continue;
                }
                let released = release.time;
                let frets = if linked {
                    None
                } else {
                    Some(std::slice::from_ref(&fret))
                };
                if sustain.release(released, frets, leniency) {
                    log::debug!(
                        "sustain {} dropped at {released:.3} ({} released)",
                        sustain.chord(),
                        fret.letter()
                    );
                    self.events.push(JudgeEvent::SustainDropped {
                        chord: sustain.chord(),
                        time: released,
                    });
                }
            }
            sustain.finish_elapsed(time);
        }
        self.settle_sustains();
    }

    /// Retire chords that fell behind the window.
    fn phase_miss(&mut self, time: f64) {
        while let Some(&index) = self.remaining.front() {
            let chord_time = self.chart.chord(index).time();
            if time - chord_time <= self.hit_window {
                break;
            }
            self.miss(0, chord_time + self.hit_window);
        }
    }

    fn phase_pending_strum(&mut self, time: f64) {
        if let Some(strum) = self.pending_strum
            && time - strum > self.settings.strum_leniency
        {
            self.pending_strum = None;
            self.overstrum(strum);
        }
    }

    /// Infinite front end: a held tap chord is hit as soon as its window opens.
    fn phase_front_end(&mut self, time: f64) {
        if !self.settings.infinite_front_end || self.tap_consumed.is_some() {
            return;
        }
        let Some(&index) = self.remaining.front() else {
            return;
        };
        let chord = self.chart.chord(index);
        let opens = chord.time() - self.hit_window;
        if chord.kind() != NoteKind::Tap || time < opens {
            return;
        }
        let hit_time = [self.last_fret_change, self.last_judgement]
            .into_iter()
            .flatten()
            .fold(opens, f64::max);
        let required = chord.shape();
        if self.ghost_shape(&required, hit_time).matches(&required) {
            self.hit(0, hit_time);
            self.last_hopo_tap_time = Some(hit_time);
        }
    }

    // =========================================================================
    // Input handling
    // =========================================================================

    fn on_fret_change(&mut self, fret: Fret, pressed: bool, time: f64) {
        let i = fret.index();
        if self.keys[i] == pressed {
            return;
        }
        let eligible = self.eligible(time);
        let covered_until =
            eligible.map_or(time, |index| self.chart.chord(index).time() + self.hit_window);
        self.keys[i] = pressed;
        self.released[i] = (!pressed).then_some(Release {
            time,
            covered_until,
        });
        self.shape = self.shape.update_fret(fret, pressed);
        self.last_fret_change = Some(time);
        if self.tap_consumed.is_some_and(|c| !self.shape.matches(&c)) {
            self.tap_consumed = None;
        }

        self.check_sustain_drops(fret, pressed, time, eligible.is_some());

        let Some(index) = eligible else {
            return;
        };
        let required = self.chart.chord(index).shape();
        if !self.ghost_shape(&required, time).matches(&required) {
            return;
        }
        let strummed = self
            .pending_strum
            .is_some_and(|strum| time - strum <= self.settings.strum_leniency);
        if strummed {
            self.pending_strum = None;
            self.hit(0, time);
        } else if self.tap_consumed.is_none() && self.is_tappable(index) {
            self.hit(0, time);
            self.last_hopo_tap_time = Some(time);
        }
    }

    fn check_sustain_drops(&mut self, fret: Fret, pressed: bool, time: f64, chord_eligible: bool) {
        let leniency = self.settings.sustain_end_leniency;
        let linked_disjoints = self.settings.linked_disjoints;
        let shape = self.shape;

        for sustain in &mut self.sustains {
            let dropped = if sustain.is_open() {
                pressed && !chord_eligible && sustain.release(time, None, leniency)
            } else if linked_disjoints || !sustain.is_disjoint() {
                let required = sustain.get_shape_at_time(time);
                !chord_eligible
                    && !shape.matches(&required)
                    && !shape.contains(&required)
                    && sustain.release(time, None, leniency)
            } else {
                !pressed
                    && !chord_eligible
                    && sustain.is_live(fret, time)
                    && sustain.release(time, Some(std::slice::from_ref(&fret)), leniency)
            };
            if dropped {
                log::debug!(
                    "{} sustain {} dropped at {time:.3}",
                    if sustain.is_open() { "open" } else { "held" },
                    sustain.chord()
                );
                self.events.push(JudgeEvent::SustainDropped {
                    chord: sustain.chord(),
                    time,
                });
            }
        }
        self.settle_sustains();
    }

    fn on_strum(&mut self, time: f64) {
        self.last_strum_time = Some(time);
        if self.remaining.is_empty() {
            if !self.sustains.is_empty() {
                self.overstrum(time);
            }
            return;
        }

        let double = self.pending_strum.take().is_some();
        if double {
            log::debug!("double strum at {time:.3}");
            self.overstrum(time);
        }

        // an unresolved strum waits for the frets, or for a second strum
        let Some(head) = self.eligible(time) else {
            if !double {
                self.pending_strum = Some(time);
            }
            return;
        };
        let required = self.chart.chord(head).shape();
        if self.ghost_shape(&required, time).matches(&required) {
            self.hit(0, time);
            return;
        }

        if self.settings.can_chord_skip
            && let Some(pos) = self.find_skip_target(time)
        {
            if self.settings.punish_chord_skip {
                log::debug!("chord skip at {time:.3} passes {pos} chords");
                for _ in 0..pos {
                    self.miss(0, time);
                }
                self.hit(0, time);
            } else {
                self.hit(pos, time);
            }
            return;
        }

        if !double {
            self.pending_strum = Some(time);
        }
    }

    /// Queue position of the first later chord inside the front window that
    /// the current frets satisfy.
    fn find_skip_target(&self, time: f64) -> Option<usize> {
        self.remaining
            .iter()
            .enumerate()
            .skip(1)
            .map(|(pos, &index)| (pos, self.chart.chord(index)))
            .take_while(|(_, chord)| chord.time() - time <= self.hit_window)
            .find(|(_, chord)| {
                let required = chord.shape();
                self.ghost_shape(&required, time).matches(&required)
            })
            .map(|(pos, _)| pos)
    }

    fn overstrum(&mut self, time: f64) {
        if let Some(tap) = self.last_hopo_tap_time
            && (tap..=tap + self.settings.hopo_leniency).contains(&time)
        {
            log::debug!("overstrum at {time:.3} forgiven after free hit at {tap:.3}");
            self.last_hopo_tap_time = None;
            self.events.push(JudgeEvent::OverstrumForgiven { time });
            return;
        }

        log::debug!("overstrum at {time:.3}, streak {} lost", self.streak);
        self.events.push(JudgeEvent::Overstrum { time });
        for sustain in &mut self.sustains {
            if sustain.drop_sustain(time.max(sustain.hit_time()), None) {
                self.events.push(JudgeEvent::SustainDropped {
                    chord: sustain.chord(),
                    time,
                });
            }
        }
        self.settle_sustains();
        self.max_streak = self.max_streak.max(self.streak);
        self.streak = 0;
        self.overstrums += 1;
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    fn hit(&mut self, pos: usize, time: f64) {
        let Some(index) = self.remaining.remove(pos) else {
            return;
        };
        let chord = self.chart.chord_mut(index);
        if !chord.mark_hit(time) {
            return;
        }
        let error = time - chord.time();
        let size = chord.size() as u64;
        let sustained = chord.is_sustain();

        let judgement = self.judgements.judge_index(error);
        let tier = &self.judgements.tiers()[judgement];
        let mult = multiplier(self.streak);
        let points = u64::from(tier.score) * u64::from(mult) * size;
        self.committed += points;
        self.accuracy_sum += tier.accuracy;

        self.streak += 1;
        self.max_streak = self.max_streak.max(self.streak);
        self.hits += 1;
        self.last_judgement = Some(time);
        self.tap_consumed = Some(self.shape);
        self.history.push(HistoryEntry {
            time,
            error,
            judgement,
        });
        self.events.push(JudgeEvent::Hit {
            chord: index,
            time,
            error,
            judgement,
            points,
        });

        if sustained {
            let sustain = Sustain::new(index, self.chart.chord(index), time, mult);
            self.sustains.push(sustain);
        }
    }

    fn miss(&mut self, pos: usize, time: f64) {
        let Some(index) = self.remaining.remove(pos) else {
            return;
        };
        let chord = self.chart.chord_mut(index);
        if !chord.mark_missed() {
            return;
        }
        let error = time - chord.time();
        self.misses += 1;
        self.last_judgement = Some(time);
        self.max_streak = self.max_streak.max(self.streak);
        self.streak = 0;
        self.history.push(HistoryEntry {
            time,
            error,
            judgement: self.judgements.miss_index(),
        });
        self.events.push(JudgeEvent::Miss { chord: index, time });
    }

    /// Commit and remove sustains whose frets are all settled.
    fn settle_sustains(&mut self) {
        let resolution = self.chart.resolution();
        for sustain in &mut self.sustains {
            if sustain.is_finished() || !sustain.check_finished() {
                continue;
            }
            let points = sustain.score(resolution);
            self.committed += points;
            self.events.push(JudgeEvent::SustainFinished {
                chord: sustain.chord(),
                points,
            });
        }
        self.sustains.retain(|s| !s.is_finished());
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Chart index of the head chord if `time` is inside its window.
    fn eligible(&self, time: f64) -> Option<usize> {
        let &index = self.remaining.front()?;
        let error = time - self.chart.chord(index).time();
        (error.abs() <= self.hit_window).then_some(index)
    }

    /// The held shape with frets that only serve a running sustain released,
    /// unless `required` asks for them.
    fn ghost_shape(&self, required: &ChordShape, time: f64) -> ChordShape {
        let mut ghost = self.shape;
        for sustain in &self.sustains {
            for fret in sustain.live_frets(time) {
                if required.get(fret) != FretState::Pressed {
                    ghost = ghost.with(fret, FretState::Released);
                }
            }
        }
        ghost
    }

    fn is_tappable(&self, index: usize) -> bool {
        match self.chart.chord(index).kind() {
            NoteKind::Tap => true,
            NoteKind::Hopo => self.streak > 0 || index == 0,
            NoteKind::Normal | NoteKind::Continuation => false,
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Committed score plus the whole points of the running sustains.
    pub fn score(&self) -> u64 {
        self.committed + self.uncommitted.floor() as u64
    }

    pub fn committed_score(&self) -> u64 {
        self.committed
    }

    /// Unrounded points of running sustains as of the last frame.
    pub fn rolling_score(&self) -> f64 {
        self.uncommitted
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn max_streak(&self) -> u32 {
        self.max_streak
    }

    pub fn multiplier(&self) -> u32 {
        multiplier(self.streak)
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }

    pub fn misses(&self) -> u32 {
        self.misses
    }

    pub fn overstrums(&self) -> u32 {
        self.overstrums
    }

    /// Weighted hits over judged chords, 0.0 before anything is judged.
    pub fn accuracy(&self) -> f64 {
        let judged = self.hits + self.misses;
        if judged == 0 {
            0.0
        } else {
            self.accuracy_sum / f64::from(judged)
        }
    }

    pub fn grade(&self) -> Grade {
        Grade::from_accuracy(self.accuracy())
    }

    pub fn full_combo(&self) -> FullCombo {
        FullCombo::classify(self.misses, self.grade())
    }

    pub fn chart(&self) -> &Chart {
        &self.chart
    }

    pub fn chart_time(&self) -> f64 {
        self.chart_time
    }

    pub fn hit_window(&self) -> f64 {
        self.hit_window
    }

    pub fn judgements(&self) -> &JudgementTable {
        &self.judgements
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn active_sustains(&self) -> &[Sustain] {
        &self.sustains
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn last_strum_time(&self) -> Option<f64> {
        self.last_strum_time
    }

    /// Every chord judged and every sustain settled.
    pub fn is_finished(&self) -> bool {
        self.remaining.is_empty() && self.sustains.is_empty()
    }

    pub fn generate_results(&self) -> Results {
        Results {
            hit_window: self.hit_window,
            judgements: self.judgements.clone(),
            history: self.history.clone(),
            score: self.score(),
            hits: self.hits,
            misses: self.misses,
            overstrums: self.overstrums,
            chord_count: self.chart.len(),
            accuracy: self.accuracy(),
            grade: self.grade(),
            full_combo: self.full_combo(),
            streak: self.streak,
            max_streak: self.max_streak,
        }
    }
}
