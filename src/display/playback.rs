//! Melody playback position as a function of wall-clock time.

/// Either playing or paused, never both. Positions are milliseconds into
/// the melody; wall-clock times come from the display's `Clock`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Paused {
        position: i64,
    },
    Playing {
        position_at_resume: i64,
        resumed_at: u64,
    },
}

#[derive(Clone, Copy, Debug)]
pub struct PlaybackClock {
    state: PlaybackState,
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackClock {
    /// Paused at the start of the melody.
    pub fn new() -> Self {
        Self {
            state: PlaybackState::Paused { position: 0 },
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.state, PlaybackState::Playing { .. })
    }

    pub fn play(&mut self, now: u64) {
        if let PlaybackState::Paused { position } = self.state {
            self.state = PlaybackState::Playing {
                position_at_resume: position,
                resumed_at: now,
            };
        }
    }

    pub fn pause(&mut self, now: u64) {
        if self.is_playing() {
            self.state = PlaybackState::Paused {
                position: self.position(now),
            };
        }
    }

    /// Jump to `target`. While playing, motion continues from `target`
    /// starting at `now`.
    pub fn seek(&mut self, target: i64, now: u64) {
        self.state = match self.state {
            PlaybackState::Paused { .. } => PlaybackState::Paused { position: target },
            PlaybackState::Playing { .. } => PlaybackState::Playing {
                position_at_resume: target,
                resumed_at: now,
            },
        };
    }

    pub fn position(&self, now: u64) -> i64 {
        match self.state {
            PlaybackState::Paused { position } => position,
            PlaybackState::Playing {
                position_at_resume,
                resumed_at,
            } => position_at_resume.saturating_add(now.saturating_sub(resumed_at) as i64),
        }
    }
}
