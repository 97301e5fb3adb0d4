use super::SessionEvent;
use crate::display::{Container, ManualClock, PitchDisplay};

/// Plays a recorded session back through a display on a manual clock.
pub struct Replay<V: Container> {
    display: PitchDisplay<V, ManualClock>,
    clock: ManualClock,
    events: Vec<SessionEvent>,
    cursor: usize,
    rejected: usize,
}

impl<V: Container> Replay<V> {
    /// `clock` must be the clock `display` was built with. `events` must be
    /// sorted by time.
    pub fn new(display: PitchDisplay<V, ManualClock>, clock: ManualClock, events: Vec<SessionEvent>) -> Self {
        Self {
            display,
            clock,
            events,
            cursor: 0,
            rejected: 0,
        }
    }

    /// Apply every event up to and including `time`, each at its own
    /// timestamp, then tick the display at `time`. Returns whether the tick
    /// drew a frame.
    pub fn advance_to(&mut self, time: u64) -> bool {
        let end = self.cursor + self.events[self.cursor..].partition_point(|e| e.time() <= time);
        for idx in self.cursor..end {
            let event = self.events[idx].clone();
            self.clock.set(event.time());
            self.apply(&event);
        }
        self.cursor = end;
        self.clock.set(time);
        self.display.tick()
    }

    fn apply(&mut self, event: &SessionEvent) {
        let display = &mut self.display;
        match *event {
            SessionEvent::Pitch {
                frequency, clarity, ..
            } => {
                if let Err(err) = display.push_frequency(frequency, clarity) {
                    log::debug!("t={}ms: {}", event.time(), err);
                    self.rejected += 1;
                }
            }
            SessionEvent::Play { .. } => display.play(),
            SessionEvent::Pause { .. } => display.pause(),
            SessionEvent::SeekStart { .. } => display.seek_to_start(),
            SessionEvent::FastForward { .. } => display.fast_forward(),
            SessionEvent::FastForwardRelease { .. } => display.fast_forward_release(),
        }
    }

    /// Time of the last event, 0 for an empty log.
    pub fn last_event_time(&self) -> u64 {
        self.events.last().map_or(0, SessionEvent::time)
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.events.len()
    }

    /// Pitch events the display refused.
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    pub fn display(&self) -> &PitchDisplay<V, ManualClock> {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut PitchDisplay<V, ManualClock> {
        &mut self.display
    }

    /// Release the display. The replay draws nothing afterwards.
    pub fn finish(mut self) -> PitchDisplay<V, ManualClock> {
        self.display.dispose();
        self.display
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{DisplayOptions, Viewport};
    use crate::pitch::melody::MelodyNote;

    fn replay(events: Vec<SessionEvent>) -> Replay<Viewport> {
        let clock = ManualClock::new(0);
        let display = PitchDisplay::new(Viewport::new(300, 120), clock.clone(), DisplayOptions::default());
        Replay::new(display, clock, events)
    }

    fn pitch(time: u64) -> SessionEvent {
        SessionEvent::Pitch {
            time,
            frequency: 330.0,
            clarity: 0.8,
        }
    }

    #[test]
    fn events_apply_at_their_own_time() {
        let mut r = replay(vec![
            SessionEvent::Play { time: 0 },
            pitch(10),
            pitch(20),
            SessionEvent::Pitch {
                time: 25,
                frequency: -1.0,
                clarity: 1.0,
            },
            pitch(200),
        ]);
        assert!(r.advance_to(100));
        assert_eq!(r.rejected(), 1);
        assert!(!r.is_finished());

        r.advance_to(300);
        assert!(r.is_finished());
        assert_eq!(r.last_event_time(), 200);
    }

    #[test]
    fn frames_show_the_melody_moving() {
        let mut r = replay(vec![SessionEvent::Play { time: 0 }]);
        r.display_mut().set_melody_notes(vec![MelodyNote::new(2000, 1000, 67)]);

        r.advance_to(0);
        let before = r.display().layers().unwrap().melody.clone();
        r.advance_to(1000);
        let after = r.display().layers().unwrap().melody.clone();
        assert_ne!(before.pixels(), after.pixels());
    }

    #[test]
    fn finish_disposes_the_display() {
        let r = replay(vec![pitch(5)]);
        let mut display = r.finish();
        assert!(display.layers().is_none());
        assert!(!display.tick());
    }
}
