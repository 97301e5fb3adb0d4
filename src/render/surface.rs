use rayon::prelude::*;

use super::color::Rgba;

/// An RGBA pixel buffer that primitives blend into with source-over.
#[derive(Clone, Debug)]
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Surface {
    /// A fully transparent surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let p = &self.pixels[idx..idx + 4];
        Some(Rgba::new(p[0], p[1], p[2], p[3]))
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// Overwrite every pixel with `color`.
    pub fn fill(&mut self, color: Rgba) {
        let rgba = color.to_array();
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }

    pub fn blend_pixel(&mut self, x: i64, y: i64, color: Rgba) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        blend(&mut self.pixels[idx..idx + 4], color.to_array());
    }

    /// Blend an axis-aligned rectangle. Edges are rounded to whole pixels and
    /// a non-empty rectangle always covers at least one pixel per axis.
    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgba) {
        if !(x.is_finite() && y.is_finite() && w.is_finite() && h.is_finite()) {
            return;
        }
        let (x0, x1) = pixel_span(x, x + w, self.width);
        let (y0, y1) = pixel_span(y, y + h, self.height);
        for py in y0..y1 {
            for px in x0..x1 {
                self.blend_pixel(px, py, color);
            }
        }
    }

    /// 1px line between two points.
    pub fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), color: Rgba) {
        let (x0, y0) = from;
        let (x1, y1) = to;
        if !(x0.is_finite() && y0.is_finite() && x1.is_finite() && y1.is_finite()) {
            return;
        }
        let (dx, dy) = (x1 - x0, y1 - y0);
        let limit = (self.width.max(self.height) as f64) * 4.0;
        let steps = dx.abs().max(dy.abs()).ceil().clamp(1.0, limit.max(1.0)) as usize;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let px = (x0 + dx * t).round() as i64;
            let py = (y0 + dy * t).round() as i64;
            self.blend_pixel(px, py, color);
        }
    }

    /// Filled disc: every pixel whose centre lies within `radius`.
    pub fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Rgba) {
        if !(cx.is_finite() && cy.is_finite()) || radius <= 0.0 {
            return;
        }
        let r2 = radius * radius;
        let x_min = (cx - radius).floor() as i64;
        let x_max = (cx + radius).ceil() as i64;
        let y_min = (cy - radius).floor() as i64;
        let y_max = (cy + radius).ceil() as i64;
        for py in y_min..=y_max {
            for px in x_min..=x_max {
                let ddx = px as f64 + 0.5 - cx;
                let ddy = py as f64 + 0.5 - cy;
                if ddx * ddx + ddy * ddy <= r2 {
                    self.blend_pixel(px, py, color);
                }
            }
        }
    }
}

/// The three stacked drawing layers, bottom to top.
#[derive(Clone, Debug)]
pub struct Layers {
    pub background: Surface,
    pub melody: Surface,
    pub trace: Surface,
}

impl Layers {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            background: Surface::new(width, height),
            melody: Surface::new(width, height),
            trace: Surface::new(width, height),
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.background.width(), self.background.height())
    }

    /// Flatten the layers into `out` (RGBA, `width * height * 4` bytes).
    pub fn composite_into(&self, out: &mut Vec<u8>) {
        let (width, height) = self.size();
        let row_bytes = width as usize * 4;
        out.resize(row_bytes * height as usize, 0);
        if row_bytes == 0 {
            return;
        }
        out.par_chunks_mut(row_bytes).enumerate().for_each(|(row, dst)| {
            let start = row * row_bytes;
            let end = start + row_bytes;
            dst.copy_from_slice(&self.background.pixels[start..end]);
            for upper in [&self.melody, &self.trace] {
                for (d, s) in dst
                    .chunks_exact_mut(4)
                    .zip(upper.pixels[start..end].chunks_exact(4))
                {
                    if s[3] != 0 {
                        blend(d, [s[0], s[1], s[2], s[3]]);
                    }
                }
            }
        });
    }
}

fn pixel_span(a: f64, b: f64, limit: u32) -> (i64, i64) {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let start = lo.round();
    let end = hi.round().max(start + 1.0);
    let clamp = |v: f64| v.clamp(0.0, limit as f64) as i64;
    (clamp(start), clamp(end))
}

/// Source-over blend of straight-alpha `src` onto straight-alpha `dst`.
fn blend(dst: &mut [u8], src: [u8; 4]) {
    let sa = src[3] as f32 / 255.0;
    if sa >= 1.0 {
        dst.copy_from_slice(&src);
        return;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        dst.fill(0);
        return;
    }
    for c in 0..3 {
        let v = (src[c] as f32 * sa + dst[c] as f32 * da * (1.0 - sa)) / out_a;
        dst[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round() as u8;
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba = Rgba::new(255, 0, 0, 255);

    #[test]
    fn fill_rect_clips_to_surface() {
        let mut s = Surface::new(10, 10);
        s.fill_rect(-5.0, 2.0, 100.0, 1.0, RED);
        assert_eq!(s.pixel(0, 2), Some(RED));
        assert_eq!(s.pixel(9, 2), Some(RED));
        assert_eq!(s.pixel(0, 3), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn thin_rect_still_covers_a_pixel() {
        let mut s = Surface::new(10, 10);
        s.fill_rect(4.2, 0.0, 0.1, 10.0, RED);
        assert_eq!(s.pixel(4, 5), Some(RED));
        assert_eq!(s.pixel(5, 5), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn translucent_over_opaque_mixes() {
        let mut s = Surface::new(1, 1);
        s.fill(Rgba::new(0, 0, 255, 255));
        s.blend_pixel(0, 0, Rgba::new(255, 0, 0, 128));
        let p = s.pixel(0, 0).unwrap();
        assert_eq!(p.a, 255);
        assert!(p.r > 120 && p.r < 135);
        assert!(p.b > 120 && p.b < 135);
    }

    #[test]
    fn line_touches_both_ends() {
        let mut s = Surface::new(20, 20);
        s.stroke_line((1.0, 1.0), (15.0, 9.0), RED);
        assert_eq!(s.pixel(1, 1), Some(RED));
        assert_eq!(s.pixel(15, 9), Some(RED));
    }

    #[test]
    fn circle_is_filled_around_centre() {
        let mut s = Surface::new(20, 20);
        s.fill_circle(10.0, 10.0, 3.0, RED);
        assert_eq!(s.pixel(10, 10), Some(RED));
        assert_eq!(s.pixel(9, 9), Some(RED));
        assert_eq!(s.pixel(10, 15), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn composite_stacks_layers_in_order() {
        let mut layers = Layers::new(2, 1);
        layers.background.fill(Rgba::new(10, 10, 10, 255));
        layers.melody.blend_pixel(0, 0, Rgba::new(0, 255, 0, 255));
        layers.trace.blend_pixel(0, 0, Rgba::new(255, 0, 0, 255));
        layers.melody.blend_pixel(1, 0, Rgba::new(0, 255, 0, 255));

        let mut out = Vec::new();
        layers.composite_into(&mut out);
        assert_eq!(&out[0..4], &[255, 0, 0, 255]);
        assert_eq!(&out[4..8], &[0, 255, 0, 255]);
    }
}
