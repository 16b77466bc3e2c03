use fret_model::Chart;
use fret_replay::{ReplayData, ReplayError};
use fret_rule::{EngineSettings, JudgementTable};

use crate::engine::Engine;
use crate::input::events_from_keylog;
use crate::results::Results;

/// Frame length used when the caller passes a non-positive step (60 fps).
pub const DEFAULT_FRAME_STEP: f64 = 1.0 / 60.0;

/// Play `replay` against `chart` one frame at a time and return the results.
///
/// Inputs are handed to the engine on the first frame at or after their
/// timestamp; the run continues until every chord and sustain is settled.
pub fn simulate(
    chart: Chart,
    settings: EngineSettings,
    replay: &ReplayData,
    frame_step: f64,
) -> Result<Results, ReplayError> {
    let events = events_from_keylog(&replay.keylog)?;
    let step = if frame_step > 0.0 {
        frame_step
    } else {
        DEFAULT_FRAME_STEP
    };

    let mut engine = Engine::new(chart, JudgementTable::default(), settings);
    let settle = engine.hit_window()
        + engine.settings().strum_leniency
        + engine.settings().offset.abs()
        + step;
    let last_input = events.last().map_or(0.0, |e| e.time);
    let end = engine.chart().end_time().max(last_input) + settle;
    log::debug!(
        "simulating {} inputs over {end:.3}s at {:.1} fps",
        events.len(),
        1.0 / step
    );

    let mut next = 0;
    let mut frame: u64 = 0;
    loop {
        let time = frame as f64 * step;
        let due = events[next..].iter().take_while(|e| e.time <= time).count();
        engine.push_inputs(events[next..next + due].iter().copied());
        next += due;

        engine.update(time);
        engine.calculate_score();
        if time > end && next == events.len() {
            break;
        }
        frame += 1;
    }
    Ok(engine.generate_results())
}
