use serde::{Deserialize, Serialize};

/// One note of the reference melody. Times are milliseconds from the start
/// of the song; `pitch` uses the same note numbering as the frequency mapper.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MelodyNote {
    pub start: i64,
    pub duration: i64,
    pub pitch: i32,
}

impl MelodyNote {
    pub fn new(start: i64, duration: i64, pitch: i32) -> Self {
        Self {
            start,
            duration,
            pitch,
        }
    }

    /// Notes with a negative duration, or whose end does not fit in an
    /// `i64`, are skipped when drawing.
    pub fn is_well_formed(&self) -> bool {
        self.duration >= 0 && self.end().is_some()
    }

    pub fn end(&self) -> Option<i64> {
        self.start.checked_add(self.duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_from_json() {
        let notes: Vec<MelodyNote> =
            serde_json::from_str(r#"[{"start":0,"duration":500,"pitch":60},{"start":500,"duration":-1,"pitch":62}]"#)
                .unwrap();
        assert_eq!(notes[0], MelodyNote::new(0, 500, 60));
        assert_eq!(notes[0].end(), Some(500));
        assert!(notes[0].is_well_formed());
        assert!(!notes[1].is_well_formed());
    }

    #[test]
    fn overflowing_end_is_malformed() {
        let note = MelodyNote::new(i64::MAX - 5, 100, 60);
        assert_eq!(note.end(), None);
        assert!(!note.is_well_formed());
    }
}
