// fretjudge: score a recorded replay (or an autoplay run) against a chart.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{info, warn};

use fret_model::Chart;
use fret_play::{DEFAULT_FRAME_STEP, simulate};
use fret_replay::{ReplayData, autoplay, read_replay, write_replay};
use fret_rule::EngineSettings;

#[derive(Parser, Debug)]
#[command(name = "fretjudge", about = "Judge a five-fret replay against a chart")]
struct Args {
    /// Path to the chart JSON file.
    #[arg(long)]
    chart: PathBuf,

    /// Path to a gzip JSON replay file.
    #[arg(long, conflicts_with = "autoplay")]
    replay: Option<PathBuf>,

    /// Judge a generated perfect run instead of a replay.
    #[arg(long)]
    autoplay: bool,

    /// Path to engine settings JSON. Defaults are used when omitted.
    #[arg(long, env = "FRETJUDGE_SETTINGS")]
    settings: Option<PathBuf>,

    /// Simulation frame rate.
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Write the results as JSON to this path.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Save the replay that was judged (useful with --autoplay).
    #[arg(long)]
    save_replay: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let chart = Chart::read(&args.chart)?;
    info!(
        "Loaded chart {} ({} chords, {} notes)",
        args.chart.display(),
        chart.len(),
        chart.note_count()
    );

    let mut settings = match &args.settings {
        Some(path) => EngineSettings::read(path)?,
        None => EngineSettings::default(),
    };

    let replay = match (&args.replay, args.autoplay) {
        (Some(path), _) => {
            let replay = read_replay(path)?;
            info!(
                "Loaded replay {} ({} inputs)",
                path.display(),
                replay.keylog.len()
            );
            replay
        }
        (None, true) => ReplayData::new(autoplay::generate(&chart)),
        (None, false) => bail!("either --replay or --autoplay is required"),
    };

    if replay.offset != 0.0 {
        info!("Using replay offset {:.3}s", replay.offset);
        settings.offset = replay.offset;
        settings.validate();
    }

    let frame_step = if args.fps.is_finite() && args.fps > 0.0 {
        1.0 / args.fps
    } else {
        warn!("Invalid frame rate {}, using 60 fps", args.fps);
        DEFAULT_FRAME_STEP
    };

    if let Some(path) = &args.save_replay {
        write_replay(&replay, path)?;
        info!("Saved replay to {}", path.display());
    }

    let results = simulate(chart, settings, &replay, frame_step)
        .context("Failed to judge replay")?;
    println!("{results}");

    if let Some(path) = &args.output {
        results.write(path)?;
        info!("Wrote results to {}", path.display());
    }

    Ok(())
}
