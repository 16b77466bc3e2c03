use fret_model::Fret;
use fret_replay::{InputKey, KeyInputLog, ReplayError};

/// A resolved controller transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    FretDown(Fret),
    FretUp(Fret),
    StrumDown,
}

/// An input action stamped with the song time (seconds) it happened at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputEvent {
    pub time: f64,
    pub action: InputAction,
}

impl InputEvent {
    pub fn new(time: f64, action: InputAction) -> Self {
        Self { time, action }
    }

    pub fn fret_down(time: f64, fret: Fret) -> Self {
        Self::new(time, InputAction::FretDown(fret))
    }

    pub fn fret_up(time: f64, fret: Fret) -> Self {
        Self::new(time, InputAction::FretUp(fret))
    }

    pub fn strum(time: f64) -> Self {
        Self::new(time, InputAction::StrumDown)
    }

    /// Resolve a recorded key transition. Strum releases carry no action.
    pub fn from_log(log: &KeyInputLog) -> Result<Option<Self>, ReplayError> {
        let time = log.seconds();
        let action = match (log.input_key()?, log.pressed) {
            (InputKey::Fret(fret), true) => InputAction::FretDown(fret),
            (InputKey::Fret(fret), false) => InputAction::FretUp(fret),
            (InputKey::Strum, true) => InputAction::StrumDown,
            (InputKey::Strum, false) => return Ok(None),
        };
        Ok(Some(Self::new(time, action)))
    }
}

/// Resolve a key log into time-ordered input events.
pub fn events_from_keylog(logs: &[KeyInputLog]) -> Result<Vec<InputEvent>, ReplayError> {
    let mut events = Vec::with_capacity(logs.len());
    for log in logs {
        if let Some(event) = InputEvent::from_log(log)? {
            events.push(event);
        }
    }
    events.sort_by(|a, b| a.time.total_cmp(&b.time));
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_log() {
        let down = InputEvent::from_log(&KeyInputLog::fret(500_000, Fret::Red, true)).unwrap();
        assert_eq!(down, Some(InputEvent::fret_down(0.5, Fret::Red)));

        let up = InputEvent::from_log(&KeyInputLog::fret(750_000, Fret::Red, false)).unwrap();
        assert_eq!(up, Some(InputEvent::fret_up(0.75, Fret::Red)));

        let strum = InputEvent::from_log(&KeyInputLog::strum(1_000_000)).unwrap();
        assert_eq!(strum, Some(InputEvent::strum(1.0)));

        let release = InputEvent::from_log(&KeyInputLog::new(1_000_000, 5, false)).unwrap();
        assert_eq!(release, None);
    }

    #[test]
    fn test_unknown_key_is_an_error() {
        let err = InputEvent::from_log(&KeyInputLog::new(0, 12, true)).unwrap_err();
        assert!(matches!(err, ReplayError::UnknownKey(12)));
    }

    #[test]
    fn test_events_sorted_stably() {
        let logs = vec![
            KeyInputLog::strum(200_000),
            KeyInputLog::fret(100_000, Fret::Green, true),
            KeyInputLog::fret(200_000, Fret::Green, false),
        ];
        let events = events_from_keylog(&logs).unwrap();
        assert_eq!(
            events,
            vec![
                InputEvent::fret_down(0.1, Fret::Green),
                InputEvent::strum(0.2),
                InputEvent::fret_up(0.2, Fret::Green),
            ]
        );
    }
}
