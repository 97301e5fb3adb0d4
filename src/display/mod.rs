pub mod clock;
pub mod engine;
pub mod playback;
pub mod scale;

pub use clock::{Clock, Container, ManualClock, SystemClock, Viewport};
pub use engine::{DisplayOptions, PitchDisplay};
