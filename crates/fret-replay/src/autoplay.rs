//! Perfect-play key log generation.

use fret_model::{Chart, Chord, FRET_COUNT, Fret, NoteKind};

use crate::key_input_log::KeyInputLog;

/// How long before a chord its frets are put down.
pub const FRET_LEAD: f64 = 0.010;

fn micros(time: f64) -> i64 {
    (time.max(0.0) * 1_000_000.0).round() as i64
}

/// Frets a chord needs held, ignoring anchored lanes.
fn required_frets(chord: &Chord) -> [bool; FRET_COUNT] {
    let mut required = [false; FRET_COUNT];
    for fret in chord.shape().pressed_frets() {
        required[fret.index()] = true;
    }
    required
}

/// Build a key log that hits every chord of `chart` dead on time.
///
/// Frets change shortly before each chord (never earlier than halfway from the
/// previous one), sustains are held to their end, and the strum is skipped for
/// HOPO/tap chords whose fret change alone will hit them.
pub fn generate(chart: &Chart) -> Vec<KeyInputLog> {
    let mut logs: Vec<(f64, KeyInputLog)> = Vec::new();
    let mut held = [false; FRET_COUNT];
    let mut release_at: [Option<f64>; FRET_COUNT] = [None; FRET_COUNT];
    let mut previous: Option<f64> = None;

    for (index, chord) in chart.chords().iter().enumerate() {
        let time = chord.time();
        let change = match previous {
            Some(prev) => (time - FRET_LEAD).max((prev + time) / 2.0),
            None => time - FRET_LEAD,
        };

        for fret in Fret::ALL {
            let i = fret.index();
            if let Some(end) = release_at[i].filter(|&end| end <= change) {
                logs.push((end, KeyInputLog::fret(micros(end), fret, false)));
                held[i] = false;
                release_at[i] = None;
            }
        }

        let required = required_frets(chord);
        let anchor = chord
            .shape()
            .pressed_frets()
            .min()
            .filter(|_| chord.size() == 1);
        let before = held;
        for fret in Fret::ALL {
            let i = fret.index();
            // a sustain below a single note's fret may keep ringing
            let anchored = anchor.is_some_and(|a| fret < a) && release_at[i].is_some();
            if held[i] && !required[i] && !anchored {
                logs.push((change, KeyInputLog::fret(micros(change), fret, false)));
                held[i] = false;
                release_at[i] = None;
            }
        }
        for fret in Fret::ALL {
            let i = fret.index();
            if required[i] && !held[i] {
                logs.push((change, KeyInputLog::fret(micros(change), fret, true)));
                held[i] = true;
            }
        }

        let tappable = match chord.kind() {
            NoteKind::Tap => true,
            NoteKind::Hopo => true,
            NoteKind::Normal | NoteKind::Continuation => false,
        };
        if !(tappable && held != before) {
            logs.push((time, KeyInputLog::strum(micros(time))));
        }

        for note in chord.notes().iter().filter(|n| n.is_sustain()) {
            if let Some(fret) = note.lane.fret() {
                let i = fret.index();
                let end = note.end_time();
                release_at[i] = Some(release_at[i].map_or(end, |e| e.max(end)));
            }
        }
        previous = Some(time);
    }

    let mut tail: Vec<(f64, Fret)> = Fret::ALL
        .into_iter()
        .filter(|f| held[f.index()])
        .map(|f| (release_at[f.index()].unwrap_or(chart.end_time()), f))
        .collect();
    tail.sort_by(|a, b| a.0.total_cmp(&b.0));
    for (time, fret) in tail {
        logs.push((time, KeyInputLog::fret(micros(time), fret, false)));
    }

    logs.sort_by(|a, b| a.0.total_cmp(&b.0));
    logs.into_iter().map(|(_, log)| log).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key_input_log::{InputKey, STRUM_KEY};
    use fret_model::Note;

    fn chart(notes: Vec<Note>) -> Chart {
        Chart::from_notes(192, notes).unwrap()
    }

    #[test]
    fn test_single_note() {
        let logs = generate(&chart(vec![Note::normal(1.0, Fret::Green)]));
        assert_eq!(
            logs,
            vec![
                KeyInputLog::fret(990_000, Fret::Green, true),
                KeyInputLog::strum(1_000_000),
                KeyInputLog::fret(1_000_000, Fret::Green, false),
            ]
        );
    }

    #[test]
    fn test_hopo_after_hit_is_not_strummed() {
        let logs = generate(&chart(vec![
            Note::normal(1.0, Fret::Green),
            Note::new(1.2, Fret::Red, NoteKind::Hopo),
        ]));
        let strums = logs.iter().filter(|l| l.key == STRUM_KEY).count();
        assert_eq!(strums, 1);
        assert!(logs.contains(&KeyInputLog::fret(1_190_000, Fret::Green, false)));
        assert!(logs.contains(&KeyInputLog::fret(1_190_000, Fret::Red, true)));
    }

    #[test]
    fn test_repeated_tap_shape_is_strummed() {
        let logs = generate(&chart(vec![
            Note::new(1.0, Fret::Yellow, NoteKind::Tap),
            Note::new(1.2, Fret::Yellow, NoteKind::Tap),
        ]));
        let strums = logs.iter().filter(|l| l.key == STRUM_KEY).count();
        assert_eq!(strums, 1);
        assert_eq!(logs.last().unwrap().get_time(), 1_200_000);
    }

    #[test]
    fn test_sustain_held_to_end() {
        let logs = generate(&chart(vec![
            Note::normal(1.0, Fret::Blue).with_sustain(0.5, 96),
            Note::normal(2.0, Fret::Green),
        ]));
        assert!(logs.contains(&KeyInputLog::fret(1_500_000, Fret::Blue, false)));
        let times: Vec<i64> = logs.iter().map(|l| l.get_time()).collect();
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_open_chord_releases_everything() {
        let logs = generate(&chart(vec![
            Note::normal(1.0, Fret::Red),
            Note::normal(1.5, fret_model::Lane::Open),
        ]));
        let release = logs
            .iter()
            .position(|l| *l == KeyInputLog::fret(1_490_000, Fret::Red, false))
            .unwrap();
        let strum = logs
            .iter()
            .position(|l| *l == KeyInputLog::strum(1_500_000))
            .unwrap();
        assert!(release < strum);
        assert!(logs.iter().all(|l| l.input_key().is_ok()));
        assert_eq!(
            logs.iter()
                .filter(|l| l.input_key().unwrap() == InputKey::Strum)
                .count(),
            2
        );
    }
}
