//! Redraw routines for the three display layers.
//!
//! Geometry is computed separately from rasterization so the scroll and
//! segmentation logic can be checked without looking at pixels.

use super::color::Rgba;
use super::surface::Surface;
use super::text::TextOverlay;
use crate::display::scale::Scales;
use crate::pitch::buffer::FrequencySample;
use crate::pitch::melody::MelodyNote;
use crate::pitch::note::{self, NOTE_NAMES};

/// Consecutive samples further apart than this are not joined by a line.
pub const GAP_THRESHOLD_MS: u64 = 500;
pub const DOT_RADIUS: f64 = 3.0;
pub const LABEL_FONT_SIZE: f32 = 14.0;
/// Alpha applied to the highlight color for grid lines.
pub const GUIDE_ALPHA: u8 = 0x55;
const LABEL_PADDING: f64 = 4.0;

/// Colors the layers are painted with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Style {
    pub background: Rgba,
    pub highlight: Rgba,
    pub melody: Rgba,
    pub trace_line: Rgba,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            background: Rgba::new(0xef, 0xef, 0xef, 255),
            highlight: Rgba::new(0x88, 0x88, 0x88, 255),
            melody: Rgba::new(0, 255, 0, 255),
            trace_line: Rgba::new(0, 0, 0, 26),
        }
    }
}

pub fn draw_background(surface: &mut Surface, scales: &Scales, style: &Style, labels: Option<&TextOverlay>) {
    let w = surface.width() as f64;
    let h = surface.height() as f64;
    let guide = style.highlight.with_alpha(GUIDE_ALPHA);

    surface.fill(style.background);

    for (row, name) in NOTE_NAMES.iter().enumerate() {
        let y = scales.y(row as f64);
        surface.fill_rect(0.0, y, w, 1.0, guide);
        if let Some(labels) = labels {
            labels.draw(surface, name, LABEL_PADDING, y - 2.0, style.highlight);
        }
    }

    surface.fill_rect(scales.x(0.0), 0.0, 1.0, h, guide);
}

/// Horizontal extent and row of one melody note on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MelodyBar {
    pub start_x: f64,
    pub end_x: f64,
    pub y: f64,
}

/// Bars for the notes visible at `position`. Malformed notes and notes
/// entirely off-screen are left out.
pub fn melody_bars(notes: &[MelodyNote], scales: &Scales, position: i64) -> Vec<MelodyBar> {
    let width = scales.width as f64;
    notes
        .iter()
        .filter(|n| n.is_well_formed())
        .filter_map(|n| {
            let start = n.start.checked_sub(position)?;
            let end = n.end()?.checked_sub(position)?;
            Some(MelodyBar {
                start_x: scales.x(start as f64),
                end_x: scales.x(end as f64),
                y: scales.y(note::pitch_class(n.pitch) as f64),
            })
        })
        .filter(|b| b.end_x >= 0.0 && b.start_x <= width)
        .collect()
}

pub fn draw_melody(surface: &mut Surface, scales: &Scales, notes: &[MelodyNote], position: i64, color: Rgba) {
    surface.clear();
    let thickness = surface.height() as f64 / 24.0;
    for bar in melody_bars(notes, scales, position) {
        surface.fill_rect(
            bar.start_x,
            bar.y - thickness / 2.0,
            bar.end_x - bar.start_x,
            thickness,
            color,
        );
    }
}

/// A buffered sample placed on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TracePoint {
    pub x: f64,
    pub y: f64,
    pub time: u64,
    pub clarity: f64,
    pub color: [u8; 3],
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TraceGeometry {
    pub points: Vec<TracePoint>,
    /// Runs of connected points, as indices into `points`. A new run starts
    /// after every gap longer than `GAP_THRESHOLD_MS`.
    pub paths: Vec<Vec<usize>>,
}

impl TraceGeometry {
    /// Line segments actually stroked, as point-index pairs.
    pub fn segments(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.paths
            .iter()
            .flat_map(|path| path.windows(2).map(|pair| (pair[0], pair[1])))
    }
}

pub fn trace_geometry<'a>(
    samples: impl IntoIterator<Item = &'a FrequencySample>,
    scales: &Scales,
    now: u64,
) -> TraceGeometry {
    let mut geometry = TraceGeometry::default();
    let mut current: Vec<usize> = Vec::new();

    for sample in samples {
        let n = note::note_from_frequency(sample.frequency);
        let cents = note::cents_offset(sample.frequency, n);
        let point = TracePoint {
            x: scales.x(sample.time as f64 - now as f64),
            y: scales.y(note::pitch_class(n) as f64 + cents / 100.0),
            time: sample.time,
            clarity: sample.clarity,
            color: note::color_for_note(n),
        };

        if let Some(prev) = geometry.points.last() {
            if point.time.saturating_sub(prev.time) > GAP_THRESHOLD_MS {
                geometry.paths.push(std::mem::take(&mut current));
            }
        }
        current.push(geometry.points.len());
        geometry.points.push(point);
    }
    if !current.is_empty() {
        geometry.paths.push(current);
    }
    geometry
}

pub fn draw_trace(surface: &mut Surface, geometry: &TraceGeometry, line_color: Rgba) {
    surface.clear();

    for (a, b) in geometry.segments() {
        let (p, q) = (&geometry.points[a], &geometry.points[b]);
        surface.stroke_line((p.x, p.y), (q.x, q.y), line_color);
    }

    for p in &geometry.points {
        let color = Rgba::opaque(p.color).with_alpha_f(p.clarity * 0.5);
        surface.fill_circle(p.x, p.y, DOT_RADIUS, color);
    }
}
