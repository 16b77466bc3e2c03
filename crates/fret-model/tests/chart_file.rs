use std::io::Write;

use fret_model::{Chart, Fret, Lane, NoteKind};

#[test]
fn test_read_chart_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "resolution": 192,
            "notes": [
                {{"time": 1.0, "lane": 0}},
                {{"time": 1.0, "lane": 2}},
                {{"time": 1.25, "lane": 4, "kind": "tap"}},
                {{"time": 2.0, "lane": 7, "length": 1.0, "tickLength": 384}}
            ]
        }}"#
    )
    .unwrap();

    let chart = Chart::read(file.path()).unwrap();
    assert_eq!(chart.len(), 3);
    assert_eq!(chart.chord(0).frets(), vec![Fret::Green, Fret::Yellow]);
    assert_eq!(chart.chord(1).kind(), NoteKind::Tap);
    assert_eq!(chart.chord(2).lanes(), vec![Lane::Open]);
    assert!(chart.chord(2).is_sustain());
}

#[test]
fn test_read_missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.json");
    let err = Chart::read(&path).unwrap_err();
    assert!(format!("{err:#}").contains("missing.json"));
}

#[test]
fn test_read_invalid_lane_fails() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"notes": [{{"time": 1.0, "lane": 5}}]}}"#).unwrap();
    assert!(Chart::read(file.path()).is_err());
}
