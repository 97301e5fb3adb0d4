//! Recorded practice sessions: a reference melody plus a time-ordered log
//! of detector readings and transport button presses.

pub mod replay;

use std::io::BufRead;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::pitch::melody::MelodyNote;

/// One line of a session log. `time` is milliseconds from session start.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    Pitch {
        time: u64,
        frequency: f64,
        #[serde(default)]
        clarity: f64,
    },
    Play {
        time: u64,
    },
    Pause {
        time: u64,
    },
    SeekStart {
        time: u64,
    },
    FastForward {
        time: u64,
    },
    FastForwardRelease {
        time: u64,
    },
}

impl SessionEvent {
    pub fn time(&self) -> u64 {
        match *self {
            SessionEvent::Pitch { time, .. }
            | SessionEvent::Play { time }
            | SessionEvent::Pause { time }
            | SessionEvent::SeekStart { time }
            | SessionEvent::FastForward { time }
            | SessionEvent::FastForwardRelease { time } => time,
        }
    }
}

/// Read a melody file: a JSON array of `{start, duration, pitch}`.
pub fn load_melody(path: &Path) -> Result<Vec<MelodyNote>, SessionError> {
    let content = std::fs::read_to_string(path).map_err(|source| SessionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let notes: Vec<MelodyNote> = serde_json::from_str(&content).map_err(|source| SessionError::Melody {
        path: path.to_path_buf(),
        source,
    })?;
    let malformed = notes.iter().filter(|n| !n.is_well_formed()).count();
    if malformed > 0 {
        log::warn!("{}: {} melody notes have a negative duration and will not be drawn", path.display(), malformed);
    }
    Ok(notes)
}

/// Read a session log (JSON lines). Blank lines and `#` comments are
/// skipped; events come back sorted by time, ties in file order.
pub fn load_events(path: &Path) -> Result<Vec<SessionEvent>, SessionError> {
    let file = std::fs::File::open(path).map_err(|source| SessionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_events(std::io::BufReader::new(file), path)
}

pub fn parse_events(reader: impl BufRead, path: &Path) -> Result<Vec<SessionEvent>, SessionError> {
    let mut events = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| SessionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let event = serde_json::from_str(trimmed).map_err(|source| SessionError::Event {
            path: path.to_path_buf(),
            line: idx + 1,
            source,
        })?;
        events.push(event);
    }
    events.sort_by_key(SessionEvent::time);
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_tagged_events_in_time_order() {
        let log = r#"
# warm-up
{"type":"play","time":0}
{"type":"pitch","time":120,"frequency":440.0,"clarity":0.9}
{"type":"fast_forward","time":100}

{"type":"pitch","time":120,"frequency":441.0}
{"type":"fast_forward_release","time":900}
"#;
        let events = parse_events(log.as_bytes(), Path::new("mem")).unwrap();
        assert_eq!(events.len(), 5);
        assert_eq!(events[0], SessionEvent::Play { time: 0 });
        assert_eq!(events[1], SessionEvent::FastForward { time: 100 });
        assert_eq!(
            events[3],
            SessionEvent::Pitch {
                time: 120,
                frequency: 441.0,
                clarity: 0.0
            }
        );
        assert_eq!(events[4].time(), 900);
    }

    #[test]
    fn reports_the_offending_line() {
        let log = "{\"type\":\"play\",\"time\":0}\n{\"type\":\"jump\",\"time\":5}\n";
        match parse_events(log.as_bytes(), Path::new("take.jsonl")) {
            Err(SessionError::Event { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected event error, got {:?}", other),
        }
    }

    #[test]
    fn loads_melody_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"start":0,"duration":400,"pitch":60}},{{"start":400,"duration":400,"pitch":64}}]"#
        )
        .unwrap();
        let notes = load_melody(file.path()).unwrap();
        assert_eq!(notes, vec![MelodyNote::new(0, 400, 60), MelodyNote::new(400, 400, 64)]);
    }

    #[test]
    fn missing_files_are_io_errors() {
        assert!(matches!(
            load_melody(Path::new("/nonexistent/melody.json")),
            Err(SessionError::Io { .. })
        ));
        assert!(matches!(
            load_events(Path::new("/nonexistent/take.jsonl")),
            Err(SessionError::Io { .. })
        ));
    }
}
