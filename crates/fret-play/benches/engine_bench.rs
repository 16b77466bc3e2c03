use criterion::{Criterion, criterion_group, criterion_main};
use fret_model::{Chart, Fret, Lane, Note, NoteKind};
use fret_play::{DEFAULT_FRAME_STEP, Engine, events_from_keylog, simulate};
use fret_replay::{ReplayData, autoplay};
use fret_rule::EngineSettings;

/// A few minutes of mixed chords, HOPO runs, taps and sustains.
fn long_chart() -> Chart {
    let mut notes = Vec::new();
    let mut t = 1.0;
    for bar in 0..400usize {
        let kind = match bar % 3 {
            0 => NoteKind::Normal,
            1 => NoteKind::Hopo,
            _ => NoteKind::Tap,
        };
        for step in 0..8usize {
            let fret = Fret::ALL[(bar + step) % Fret::ALL.len()];
            let kind = if step == 0 { NoteKind::Normal } else { kind };
            notes.push(Note::new(t, fret, kind));
            t += 0.1;
        }
        notes.push(Note::normal(t, Fret::Green).with_sustain(0.4, 154));
        notes.push(Note::normal(t, Fret::Blue).with_sustain(0.4, 154));
        t += 0.5;
        notes.push(Note::normal(t, Lane::Open));
        t += 0.2;
    }
    Chart::from_notes(192, notes).unwrap()
}

fn bench_autoplay_generate(c: &mut Criterion) {
    let chart = long_chart();
    c.bench_function("autoplay_generate", |b| {
        b.iter(|| autoplay::generate(&chart));
    });
}

fn bench_engine_single_update(c: &mut Criterion) {
    let chart = long_chart();
    let keylog = autoplay::generate(&chart);
    let events = events_from_keylog(&keylog).unwrap();
    let end = chart.end_time() + 1.0;

    c.bench_function("engine_single_update", |b| {
        b.iter(|| {
            let mut engine = Engine::with_defaults(chart.clone());
            engine.push_inputs(events.iter().copied());
            engine.update(end);
            engine.calculate_score();
            engine.score()
        });
    });
}

fn bench_simulate_60fps(c: &mut Criterion) {
    let chart = long_chart();
    let replay = ReplayData::new(autoplay::generate(&chart));

    c.bench_function("simulate_60fps", |b| {
        b.iter(|| {
            simulate(
                chart.clone(),
                EngineSettings::default(),
                &replay,
                DEFAULT_FRAME_STEP,
            )
            .unwrap()
        });
    });
}

criterion_group!(
    benches,
    bench_autoplay_generate,
    bench_engine_single_update,
    bench_simulate_60fps
);
criterion_main!(benches);
