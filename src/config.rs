use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::display::DisplayOptions;
use crate::error::ConfigError;
use crate::render::color::Rgba;
use crate::render::draw::Style;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct DisplayConfig {
    /// Full visible time span; half of it lies on each side of "now".
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
    #[serde(default = "default_clarity_threshold")]
    pub clarity_threshold: f64,
    #[serde(default = "default_fast_forward_rate")]
    pub fast_forward_rate: f64,
    #[serde(default = "default_background")]
    pub background: String,
    #[serde(default = "default_highlight")]
    pub highlight: String,
    #[serde(default = "default_melody_color")]
    pub melody_color: String,
    #[serde(default = "default_trace_color")]
    pub trace_color: String,
    #[serde(default)]
    pub font: Option<PathBuf>,
    #[serde(default)]
    pub font_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default = "default_crf")]
    pub crf: u32,
    #[serde(default = "default_codec")]
    pub codec: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            window_ms: default_window_ms(),
            clarity_threshold: default_clarity_threshold(),
            fast_forward_rate: default_fast_forward_rate(),
            background: default_background(),
            highlight: default_highlight(),
            melody_color: default_melody_color(),
            trace_color: default_trace_color(),
            font: None,
            font_url: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            fps: default_fps(),
            crf: default_crf(),
            codec: default_codec(),
        }
    }
}

impl DisplayConfig {
    pub fn display_options(&self) -> Result<DisplayOptions, ConfigError> {
        let color = |field: &'static str, value: &str| {
            value
                .parse::<Rgba>()
                .map_err(|source| ConfigError::Color { field, source })
        };
        Ok(DisplayOptions {
            half_window_ms: (self.window_ms / 2).max(1),
            clarity_threshold: self.clarity_threshold,
            fast_forward_rate: self.fast_forward_rate.max(1.0),
            style: Style {
                background: color("background", &self.background)?,
                highlight: color("highlight", &self.highlight)?,
                melody: color("melody_color", &self.melody_color)?,
                trace_line: color("trace_color", &self.trace_color)?,
            },
        })
    }
}

fn default_window_ms() -> u64 { 6000 }
fn default_clarity_threshold() -> f64 { 0.0 }
fn default_fast_forward_rate() -> f64 { 6.0 }
fn default_background() -> String { "#efefef".into() }
fn default_highlight() -> String { "#888888".into() }
fn default_melody_color() -> String { "#00ff00".into() }
fn default_trace_color() -> String { "#0000001a".into() }
fn default_width() -> u32 { 1280 }
fn default_height() -> u32 { 720 }
fn default_fps() -> u32 { 30 }
fn default_crf() -> u32 { 18 }
fn default_codec() -> String { "libx264".into() }

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// `pitchline.toml` in the working directory, then the per-user config.
pub fn find_config() -> Option<PathBuf> {
    let local = PathBuf::from("pitchline.toml");
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("pitchline").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("pitchline").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_the_stock_display() {
        let options = DisplayConfig::default().display_options().unwrap();
        let stock = DisplayOptions::default();
        assert_eq!(options.half_window_ms, stock.half_window_ms);
        assert_eq!(options.style, stock.style);
        assert_eq!(options.fast_forward_rate, stock.fast_forward_rate);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[display]\nwindow_ms = 10000\nbackground = \"#202020\"\n\n[output]\nfps = 60").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.display.window_ms, 10000);
        assert_eq!(config.output.fps, 60);
        assert_eq!(config.output.width, 1280);

        let options = config.display.display_options().unwrap();
        assert_eq!(options.half_window_ms, 5000);
        assert_eq!(options.style.background, Rgba::new(0x20, 0x20, 0x20, 255));
    }

    #[test]
    fn bad_color_names_the_field() {
        let display = DisplayConfig {
            highlight: "grey".into(),
            ..DisplayConfig::default()
        };
        match display.display_options() {
            Err(ConfigError::Color { field, .. }) => assert_eq!(field, "highlight"),
            other => panic!("expected color error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[display\nwindow_ms = ").unwrap();
        assert!(matches!(load_config(file.path()), Err(ConfigError::Parse { .. })));
    }
}
