use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::{Deserialize, Serialize};

use crate::error::ReplayError;
use crate::key_input_log::KeyInputLog;

/// Bytes per packed key log record: signed key byte + little-endian i64 time.
const RECORD_LEN: usize = 9;

/// A recorded play session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayData {
    #[serde(default)]
    pub player: String,
    /// Hash of the chart the replay was recorded against.
    #[serde(default)]
    pub chart_hash: String,
    /// Input offset in seconds the player used.
    #[serde(default)]
    pub offset: f64,
    /// Key input log (populated after `validate()`).
    #[serde(default)]
    pub keylog: Vec<KeyInputLog>,
    /// Packed key log, base64 URL-safe encoded gzip. Populated by `shrink()`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyinput: Option<String>,
    /// Unix timestamp of the play.
    #[serde(default)]
    pub date: i64,
}

impl ReplayData {
    pub fn new(keylog: Vec<KeyInputLog>) -> Self {
        Self {
            keylog,
            ..Default::default()
        }
    }

    /// Pack `keylog` into `keyinput`.
    ///
    /// Each entry becomes a key byte, `(key + 1)` negated for releases, followed
    /// by the time in microseconds.
    pub fn shrink(&mut self) -> Result<(), ReplayError> {
        if self.keylog.is_empty() {
            return Ok(());
        }

        let mut raw = Vec::with_capacity(self.keylog.len() * RECORD_LEN);
        for log in &self.keylog {
            let code = log
                .key
                .checked_add(1)
                .and_then(|code| i8::try_from(code).ok())
                .filter(|&code| code > 0)
                .ok_or(ReplayError::UnknownKey(log.key))?;
            let byte = if log.pressed { code } else { -code };
            raw.push(byte as u8);
            raw.extend_from_slice(&log.get_time().to_le_bytes());
        }

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&raw)?;
        let packed = encoder.finish()?;

        self.keyinput = Some(URL_SAFE.encode(packed));
        self.keylog.clear();
        Ok(())
    }

    /// Unpack `keyinput` into `keylog` and drop unusable entries.
    ///
    /// Returns `true` if the key log is non-empty afterwards.
    pub fn validate(&mut self) -> bool {
        if let Some(input) = self.keyinput.take() {
            match unpack_keyinput(&input) {
                Ok(logs) => self.keylog = logs,
                Err(e) => log::warn!("discarding packed key input: {e}"),
            }
        }

        let before = self.keylog.len();
        self.keylog.retain_mut(KeyInputLog::validate);
        let dropped = before - self.keylog.len();
        if dropped > 0 {
            log::warn!("discarded {dropped} invalid key log entries");
        }
        !self.keylog.is_empty()
    }
}

fn unpack_keyinput(input: &str) -> Result<Vec<KeyInputLog>, ReplayError> {
    let packed = URL_SAFE
        .decode(input)
        .map_err(|e| ReplayError::Decode(e.to_string()))?;
    let mut raw = Vec::new();
    GzDecoder::new(packed.as_slice()).read_to_end(&mut raw)?;
    if raw.len() % RECORD_LEN != 0 {
        return Err(ReplayError::Decode(format!(
            "{} bytes is not a whole number of records",
            raw.len()
        )));
    }

    let logs = raw
        .chunks_exact(RECORD_LEN)
        .map(|record| {
            let byte = record[0] as i8;
            let mut time = [0u8; 8];
            time.copy_from_slice(&record[1..]);
            KeyInputLog::new(
                i64::from_le_bytes(time),
                i32::from(byte.unsigned_abs()) - 1,
                byte >= 0,
            )
        })
        .collect();
    Ok(logs)
}

/// Read a gzip-compressed JSON replay file.
pub fn read_replay(path: &Path) -> Result<ReplayData> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open replay {}", path.display()))?;
    let mut replay: ReplayData = serde_json::from_reader(GzDecoder::new(file))
        .with_context(|| format!("invalid replay {}", path.display()))?;
    replay.validate();
    Ok(replay)
}

/// Write a replay as gzip-compressed JSON with a packed key log.
pub fn write_replay(replay: &ReplayData, path: &Path) -> Result<()> {
    let mut stored = replay.clone();
    stored.shrink()?;
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create replay {}", path.display()))?;
    let mut encoder = GzEncoder::new(file, Compression::default());
    serde_json::to_writer(&mut encoder, &stored)?;
    encoder.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_keylog() -> Vec<KeyInputLog> {
        vec![
            KeyInputLog::new(0, 0, true),
            KeyInputLog::new(100_000, 3, true),
            KeyInputLog::new(150_000, 5, true),
            KeyInputLog::new(200_000, 0, false),
            KeyInputLog::new(300_000, 3, false),
        ]
    }

    #[test]
    fn test_shrink_then_validate_restores_keylog() {
        let original = sample_keylog();
        let mut replay = ReplayData::new(original.clone());

        replay.shrink().unwrap();
        assert!(replay.keylog.is_empty());
        assert!(replay.keyinput.is_some());

        assert!(replay.validate());
        assert!(replay.keyinput.is_none());
        assert_eq!(replay.keylog, original);
    }

    #[test]
    fn test_shrink_empty_keylog() {
        let mut replay = ReplayData::default();
        replay.shrink().unwrap();
        assert!(replay.keyinput.is_none());
        assert!(!replay.validate());
    }

    #[test]
    fn test_shrink_rejects_out_of_range_keys() {
        for (key, pressed) in [(i32::MAX, true), (127, true), (-200, true), (-129, false)] {
            let mut replay = ReplayData::new(vec![KeyInputLog::new(0, key, pressed)]);
            let err = replay.shrink().unwrap_err();
            assert!(matches!(err, ReplayError::UnknownKey(k) if k == key));
            assert_eq!(replay.keylog.len(), 1);
        }
    }

    #[test]
    fn test_validate_drops_invalid_entries() {
        let mut replay = ReplayData::new(vec![
            KeyInputLog::new(-5, 0, true),
            KeyInputLog::new(10, 42, true),
            KeyInputLog::new(20, 1, true),
        ]);
        assert!(replay.validate());
        assert_eq!(replay.keylog, vec![KeyInputLog::new(20, 1, true)]);
    }

    #[test]
    fn test_validate_garbage_keyinput() {
        let mut replay = ReplayData {
            keyinput: Some("not base64 at all!".to_string()),
            ..Default::default()
        };
        assert!(!replay.validate());
        assert!(replay.keyinput.is_none());
    }

    #[test]
    fn test_unpack_rejects_truncated_records() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&[1, 2, 3]).unwrap();
        let packed = URL_SAFE.encode(encoder.finish().unwrap());
        assert!(matches!(
            unpack_keyinput(&packed),
            Err(ReplayError::Decode(_))
        ));
    }

    #[test]
    fn test_json_field_names() {
        let replay = ReplayData {
            chart_hash: "abc".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_string(&replay).unwrap();
        assert!(json.contains("\"chartHash\":\"abc\""));
        assert!(!json.contains("keyinput"));
    }
}
