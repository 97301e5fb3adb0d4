use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pitchline", about = "Render a recorded singing session as a scrolling pitch video")]
pub struct Cli {
    /// Session log (JSON lines of pitch readings and transport events)
    pub session: PathBuf,

    /// Reference melody (JSON array of {start, duration, pitch})
    #[arg(short, long)]
    pub melody: Option<PathBuf>,

    /// Output video file
    #[arg(short, long, default_value = "pitchline.mp4")]
    pub output: PathBuf,

    /// Backing track muxed into the video
    #[arg(short, long)]
    pub audio: Option<PathBuf>,

    /// Config file (defaults to pitchline.toml or the user config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Video width in pixels
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Video height in pixels
    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// Frames per second
    #[arg(long, default_value_t = 30)]
    pub fps: u32,

    /// H.264 CRF quality (0-51, lower = better)
    #[arg(long, default_value_t = 18)]
    pub crf: u32,

    /// FFmpeg video codec
    #[arg(long, default_value = "libx264")]
    pub codec: String,

    /// FFmpeg pixel format
    #[arg(long, default_value = "yuv420p")]
    pub pix_fmt: String,

    /// Visible time span in milliseconds (overrides the config)
    #[arg(long)]
    pub window_ms: Option<u64>,

    /// Ignore readings below this clarity (overrides the config)
    #[arg(long)]
    pub clarity_threshold: Option<f64>,

    /// TrueType font for the note labels
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Download the label font from this URL
    #[arg(long)]
    pub font_url: Option<String>,

    /// Extra time rendered after the last event, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub tail_ms: u64,
}
