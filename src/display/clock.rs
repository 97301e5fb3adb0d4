use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Monotonic wall clock in milliseconds.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Milliseconds since the clock was created.
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// A clock the host moves by hand. Clones share the same time, so a host
/// can keep one handle while the display owns another.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    /// Set the current time. Going backwards is ignored.
    pub fn set(&self, ms: u64) {
        if ms > self.now.get() {
            self.now.set(ms);
        }
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

/// The hosting element the layers are drawn into.
pub trait Container {
    /// Current drawing size in pixels. Either dimension may be zero while
    /// the host is not laid out yet.
    fn size(&self) -> (u32, u32);
}

/// Fixed-size container whose size the host updates on resize events.
/// Clones share the same size.
#[derive(Clone, Debug, Default)]
pub struct Viewport {
    size: Rc<Cell<(u32, u32)>>,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Rc::new(Cell::new((width, height))),
        }
    }

    pub fn set_size(&self, width: u32, height: u32) {
        self.size.set((width, height));
    }
}

impl Container for Viewport {
    fn size(&self) -> (u32, u32) {
        self.size.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_is_shared_and_monotonic() {
        let clock = ManualClock::new(100);
        let handle = clock.clone();
        handle.set(150);
        assert_eq!(clock.now_ms(), 150);
        handle.set(120);
        assert_eq!(clock.now_ms(), 150);
        handle.set(400);
        assert_eq!(clock.now_ms(), 400);
    }

    #[test]
    fn system_clock_does_not_go_backwards() {
        let clock = SystemClock::new();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }

    #[test]
    fn viewport_clones_see_resizes() {
        let viewport = Viewport::new(0, 0);
        let host = viewport.clone();
        host.set_size(640, 480);
        assert_eq!(viewport.size(), (640, 480));
    }
}
