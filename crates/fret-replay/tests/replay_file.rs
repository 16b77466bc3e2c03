use std::io::Write;

use flate2::Compression;
use flate2::write::GzEncoder;
use fret_model::{Chart, Fret, Note};
use fret_replay::{KeyInputLog, ReplayData, autoplay, read_replay, write_replay};

#[test]
fn test_write_then_read_keeps_keylog() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("play.frr");

    let chart = Chart::from_notes(
        192,
        vec![
            Note::normal(0.5, Fret::Green),
            Note::normal(1.0, Fret::Red).with_sustain(0.5, 96),
        ],
    )
    .unwrap();
    let replay = ReplayData {
        player: "alice".to_string(),
        chart_hash: "deadbeef".to_string(),
        offset: -0.015,
        keylog: autoplay::generate(&chart),
        date: 1_700_000_000,
        ..Default::default()
    };

    write_replay(&replay, &path).unwrap();
    let loaded = read_replay(&path).unwrap();

    assert_eq!(loaded, replay);
    assert!(loaded.keyinput.is_none());
}

#[test]
fn test_read_replay_accepts_plain_keylog_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.frr");
    let json = r#"{"player":"bob","keylog":[{"key":0,"pressed":true,"time":250},{"presstime":-1,"key":5,"pressed":true}]}"#;

    let mut encoder = GzEncoder::new(std::fs::File::create(&path).unwrap(), Compression::default());
    encoder.write_all(json.as_bytes()).unwrap();
    encoder.finish().unwrap();

    let loaded = read_replay(&path).unwrap();
    assert_eq!(loaded.player, "bob");
    assert_eq!(loaded.keylog, vec![KeyInputLog::new(250_000, 0, true)]);
}

#[test]
fn test_read_replay_missing_file_names_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.frr");
    let err = read_replay(&path).unwrap_err();
    assert!(format!("{err:#}").contains("nope.frr"));
}
