/// Linear map from `domain` onto `range`. A collapsed domain maps every
/// input to the start of the range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn apply(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        if span == 0.0 {
            return r0;
        }
        r0 + (value - d0) / span * (r1 - r0)
    }
}

/// Time-offset to x and note-row to y mappings for one surface size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scales {
    pub time: LinearScale,
    pub note: LinearScale,
    pub width: u32,
    pub height: u32,
}

impl Scales {
    /// Build the mappings for a `width` x `height` surface. Returns `None`
    /// for an empty surface or an empty note range; nothing is drawable then.
    pub fn rebuild(width: u32, height: u32, half_window_ms: u64, note_count: usize) -> Option<Self> {
        if width == 0 || height == 0 || note_count == 0 || half_window_ms == 0 {
            return None;
        }
        let (w, h) = (width as f64, height as f64);
        let half = half_window_ms as f64;

        let time = LinearScale::new((-half, half), (0.0, w));

        let margin = h / (note_count as f64 + 1.0);
        let note = LinearScale::new((0.0, (note_count - 1) as f64), (h - margin, margin));

        Some(Self {
            time,
            note,
            width,
            height,
        })
    }

    /// x for a time offset from "now" in milliseconds.
    pub fn x(&self, offset_ms: f64) -> f64 {
        self.time.apply(offset_ms)
    }

    /// y for a (possibly fractional) note row.
    pub fn y(&self, row: f64) -> f64 {
        self.note.apply(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn time_axis_is_centred_on_now() {
        let scales = Scales::rebuild(800, 400, 6000, 12).unwrap();
        assert!(close(scales.x(0.0), 400.0));
        assert!(close(scales.x(-6000.0), 0.0));
        assert!(close(scales.x(6000.0), 800.0));
        assert!(scales.x(-100.0) < scales.x(100.0));
    }

    #[test]
    fn note_axis_is_inverted_with_margins() {
        let scales = Scales::rebuild(800, 390, 3000, 12).unwrap();
        let margin = 390.0 / 13.0;
        assert!(close(scales.y(0.0), 390.0 - margin));
        assert!(close(scales.y(11.0), margin));
        assert!(scales.y(9.0) < scales.y(8.0));
    }

    #[test]
    fn degenerate_sizes_build_nothing() {
        assert!(Scales::rebuild(0, 400, 3000, 12).is_none());
        assert!(Scales::rebuild(800, 0, 3000, 12).is_none());
        assert!(Scales::rebuild(800, 400, 0, 12).is_none());
        assert!(Scales::rebuild(800, 400, 3000, 0).is_none());
    }

    #[test]
    fn collapsed_domain_does_not_divide_by_zero() {
        let scale = LinearScale::new((5.0, 5.0), (10.0, 20.0));
        assert!(close(scale.apply(123.0), 10.0));
    }
}
