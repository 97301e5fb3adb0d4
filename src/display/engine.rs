//! The scrolling pitch display.
//!
//! `PitchDisplay` owns the sample buffer, the melody, the playback clock and
//! three drawing layers. The host forwards events into it (samples, resizes,
//! transport buttons) and calls `tick` from its animation callback; the
//! display never schedules anything itself.

use super::clock::{Clock, Container, SystemClock, Viewport};
use super::playback::PlaybackClock;
use super::scale::Scales;
use crate::error::IngestError;
use crate::pitch::buffer::{FrequencyBuffer, FrequencySample};
use crate::pitch::melody::MelodyNote;
use crate::pitch::note::PITCH_CLASSES;
use crate::render::color::Rgba;
use crate::render::draw::{self, Style};
use crate::render::surface::Layers;
use crate::render::text::TextOverlay;

/// Ticks closer together than this are dropped (caps redraws near 60 Hz).
pub const MIN_FRAME_INTERVAL_MS: u64 = 17;

#[derive(Clone, Debug)]
pub struct DisplayOptions {
    /// Visible time on each side of "now".
    pub half_window_ms: u64,
    /// Samples with lower clarity are rejected on arrival.
    pub clarity_threshold: f64,
    /// Playback speed while fast-forward is held.
    pub fast_forward_rate: f64,
    pub style: Style,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            half_window_ms: 3000,
            clarity_threshold: 0.0,
            fast_forward_rate: 6.0,
            style: Style::default(),
        }
    }
}

pub struct PitchDisplay<V: Container = Viewport, C: Clock = SystemClock> {
    container: V,
    clock: C,
    options: DisplayOptions,
    labels: Option<TextOverlay>,
    layers: Option<Layers>,
    scales: Option<Scales>,
    buffer: FrequencyBuffer,
    melody: Vec<MelodyNote>,
    playback: PlaybackClock,
    /// Wall time of the last fast-forward advance while the gesture is held.
    fast_forward_since: Option<u64>,
    last_frame: Option<u64>,
    disposed: bool,
}

impl<V: Container, C: Clock> PitchDisplay<V, C> {
    /// Create the display and size it to `container`. If the container has
    /// no area yet, the layers are allocated by the first `resize` that
    /// sees a real size.
    pub fn new(container: V, clock: C, options: DisplayOptions) -> Self {
        let mut display = Self {
            container,
            clock,
            options,
            labels: None,
            layers: None,
            scales: None,
            buffer: FrequencyBuffer::new(),
            melody: Vec::new(),
            playback: PlaybackClock::new(),
            fast_forward_since: None,
            last_frame: None,
            disposed: false,
        };
        display.resize();
        display
    }

    /// Re-read the container size, reallocate the layers if it changed and
    /// redraw everything. Buffered samples and the melody are kept.
    pub fn resize(&mut self) {
        if self.disposed {
            return;
        }
        let (width, height) = self.container.size();
        self.scales = Scales::rebuild(width, height, self.options.half_window_ms, PITCH_CLASSES);
        if self.scales.is_none() {
            log::debug!("Container is {}x{}, deferring layer allocation", width, height);
            return;
        }

        if self.layers.as_ref().map(Layers::size) != Some((width, height)) {
            log::info!("Allocating {}x{} display layers", width, height);
            self.layers = Some(Layers::new(width, height));
        }
        self.render(true);
    }

    pub fn set_background_color(&mut self, color: Rgba) {
        self.options.style.background = color;
        self.redraw_background();
    }

    pub fn set_highlight_color(&mut self, color: Rgba) {
        self.options.style.highlight = color;
        self.redraw_background();
    }

    /// Font for the note-row labels. Without one the rows are unlabelled.
    pub fn set_label_font(&mut self, labels: TextOverlay) {
        self.labels = Some(labels);
        self.redraw_background();
    }

    /// Replace the reference melody. Drawn from the next frame on.
    pub fn set_melody_notes(&mut self, notes: Vec<MelodyNote>) {
        log::debug!("Melody replaced: {} notes", notes.len());
        self.melody = notes;
    }

    /// Record a detector reading, stamped with the current time. Does not
    /// redraw.
    pub fn push_frequency(&mut self, frequency: f64, clarity: f64) -> Result<(), IngestError> {
        if self.disposed {
            return Err(IngestError::Disposed);
        }
        if !(frequency.is_finite() && frequency > 0.0) {
            log::debug!("Rejected sample: {} Hz", frequency);
            return Err(IngestError::InvalidFrequency(frequency));
        }
        let clarity = if clarity.is_finite() { clarity.clamp(0.0, 1.0) } else { 0.0 };
        if clarity < self.options.clarity_threshold {
            return Err(IngestError::BelowClarityThreshold {
                clarity,
                threshold: self.options.clarity_threshold,
            });
        }
        self.buffer.push(FrequencySample {
            frequency,
            clarity,
            time: self.clock.now_ms(),
        });
        Ok(())
    }

    /// Draw one frame. The melody and trace layers are always redrawn, the
    /// background only when `full` is set.
    pub fn render(&mut self, full: bool) {
        if self.disposed {
            return;
        }
        let now = self.clock.now_ms();
        let position = self.playback.position(now);

        // Keep only samples younger than the half-window.
        if let Some(cutoff) = (now + 1).checked_sub(self.options.half_window_ms) {
            self.buffer.evict_older_than(cutoff);
        }

        let (Some(layers), Some(scales)) = (self.layers.as_mut(), self.scales.as_ref()) else {
            return;
        };
        let style = &self.options.style;
        if full {
            draw::draw_background(&mut layers.background, scales, style, self.labels.as_ref());
        }
        draw::draw_melody(&mut layers.melody, scales, &self.melody, position, style.melody);
        let geometry = draw::trace_geometry(self.buffer.iter(), scales, now);
        draw::draw_trace(&mut layers.trace, &geometry, style.trace_line);
    }

    /// Animation callback. Returns whether a frame was drawn.
    pub fn tick(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        let now = self.clock.now_ms();
        self.advance_fast_forward(now);

        if let Some(last) = self.last_frame {
            if now.saturating_sub(last) < MIN_FRAME_INTERVAL_MS {
                return false;
            }
        }
        self.last_frame = Some(now);
        self.render(false);
        true
    }

    pub fn play(&mut self) {
        let now = self.clock.now_ms();
        self.advance_fast_forward(now);
        self.fast_forward_since = None;
        self.playback.play(now);
    }

    pub fn pause(&mut self) {
        let now = self.clock.now_ms();
        self.advance_fast_forward(now);
        self.fast_forward_since = None;
        self.playback.pause(now);
    }

    pub fn seek(&mut self, position_ms: i64) {
        let now = self.clock.now_ms();
        self.playback.seek(position_ms, now);
    }

    pub fn seek_to_start(&mut self) {
        self.seek(0);
    }

    /// Start moving through the melody at `fast_forward_rate` until
    /// `fast_forward_release`.
    pub fn fast_forward(&mut self) {
        if self.fast_forward_since.is_some() {
            return;
        }
        let now = self.clock.now_ms();
        self.playback.pause(now);
        self.fast_forward_since = Some(now);
    }

    /// End the fast-forward gesture and carry on at normal speed from the
    /// position reached.
    pub fn fast_forward_release(&mut self) {
        let now = self.clock.now_ms();
        self.advance_fast_forward(now);
        self.fast_forward_since = None;
        self.playback.play(now);
    }

    fn advance_fast_forward(&mut self, now: u64) {
        let Some(since) = self.fast_forward_since else {
            return;
        };
        let elapsed = now.saturating_sub(since) as f64;
        let step = (elapsed * self.options.fast_forward_rate).round() as i64;
        let target = self.playback.position(now).saturating_add(step);
        self.playback.seek(target, now);
        self.fast_forward_since = Some(now);
    }

    /// The drawing layers, if allocated.
    pub fn layers(&self) -> Option<&Layers> {
        self.layers.as_ref()
    }

    /// Release the layers. Later calls draw nothing. Safe to call twice.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.layers = None;
        self.scales = None;
        self.fast_forward_since = None;
        log::info!("Pitch display disposed");
    }

    fn redraw_background(&mut self) {
        if let (Some(layers), Some(scales)) = (self.layers.as_mut(), self.scales.as_ref()) {
            draw::draw_background(&mut layers.background, scales, &self.options.style, self.labels.as_ref());
        }
    }
}
