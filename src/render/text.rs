use std::path::{Path, PathBuf};

use fontdue::{Font, FontSettings};

use super::color::Rgba;
use super::surface::Surface;
use crate::error::FontError;

/// Places a label font is commonly installed, tried in order when no font
/// is configured.
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

pub struct TextOverlay {
    font: Font,
    font_size: f32,
}

impl TextOverlay {
    pub fn from_bytes(bytes: &[u8], font_size: f32) -> Result<Self, FontError> {
        let font = Font::from_bytes(bytes, FontSettings::default()).map_err(FontError::Parse)?;
        Ok(Self { font, font_size })
    }

    pub fn from_path(path: &Path, font_size: f32) -> Result<Self, FontError> {
        let bytes = std::fs::read(path).map_err(|source| FontError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(&bytes, font_size)
    }

    /// Explicit bytes win, then an explicit path, then the first system
    /// font that loads.
    pub fn load(font_size: f32, path: Option<&Path>, bytes: Option<&[u8]>) -> Result<Self, FontError> {
        if let Some(bytes) = bytes {
            return Self::from_bytes(bytes, font_size);
        }
        if let Some(path) = path {
            return Self::from_path(path, font_size);
        }
        SYSTEM_FONTS
            .iter()
            .map(PathBuf::from)
            .filter(|p| p.exists())
            .find_map(|p| match Self::from_path(&p, font_size) {
                Ok(overlay) => {
                    log::debug!("Using label font {}", p.display());
                    Some(overlay)
                }
                Err(err) => {
                    log::debug!("Skipping font {}: {}", p.display(), err);
                    None
                }
            })
            .ok_or(FontError::NotFound)
    }

    /// Blend `text` onto `surface` with its baseline at `baseline_y`.
    pub fn draw(&self, surface: &mut Surface, text: &str, x: f64, baseline_y: f64, color: Rgba) {
        let mut cursor_x = x.round() as i64;
        let baseline = baseline_y.round() as i64;
        for ch in text.chars() {
            let (metrics, bitmap) = self.font.rasterize(ch, self.font_size);
            let glyph_y = baseline - metrics.height as i64 - metrics.ymin as i64;
            let glyph_x = cursor_x + metrics.xmin as i64;

            for gy in 0..metrics.height {
                for gx in 0..metrics.width {
                    let coverage = bitmap[gy * metrics.width + gx];
                    if coverage == 0 {
                        continue;
                    }
                    let alpha = (coverage as u32 * color.a as u32 / 255) as u8;
                    surface.blend_pixel(glyph_x + gx as i64, glyph_y + gy as i64, color.with_alpha(alpha));
                }
            }

            cursor_x += metrics.advance_width.round() as i64;
        }
    }
}

/// Fetch a font file over HTTP.
pub fn load_font_from_url(url: &str) -> Result<Vec<u8>, FontError> {
    log::info!("Downloading font from {}", url);
    let download = |url: &str| -> Result<Vec<u8>, reqwest::Error> {
        let response = reqwest::blocking::get(url)?.error_for_status()?;
        Ok(response.bytes()?.to_vec())
    };
    download(url).map_err(|source| FontError::Download {
        url: url.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_are_a_parse_error() {
        let result = TextOverlay::from_bytes(b"not a font", 14.0);
        assert!(matches!(result, Err(FontError::Parse(_))));
    }

    #[test]
    fn missing_path_is_an_io_error() {
        let result = TextOverlay::from_path(Path::new("/nonexistent/font.ttf"), 14.0);
        assert!(matches!(result, Err(FontError::Io { .. })));
    }

    #[test]
    fn system_font_draws_when_available() {
        // Only meaningful on machines with one of the known fonts installed.
        let Ok(overlay) = TextOverlay::load(14.0, None, None) else {
            return;
        };
        let mut surface = Surface::new(60, 30);
        overlay.draw(&mut surface, "C#", 2.0, 20.0, Rgba::new(0, 0, 0, 255));
        assert!(surface.pixels().chunks_exact(4).any(|p| p[3] > 0));
    }
}
