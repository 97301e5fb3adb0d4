mod cli;
mod encode;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use cli::Cli;
use encode::ffmpeg::{EncoderSettings, FfmpegEncoder};
use pitchline::config::{self, Config};
use pitchline::display::{ManualClock, PitchDisplay, Viewport};
use pitchline::render::draw::LABEL_FONT_SIZE;
use pitchline::render::text::{load_font_from_url, TextOverlay};
use pitchline::session::{self, replay::Replay};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut cli = Cli::parse();

    // Explicit --config path, or auto-detect pitchline.toml / user config
    let config_path = cli.config.clone().or_else(config::find_config);
    let cfg = match config_path {
        Some(ref path) => {
            let cfg = config::load_config(path)?;
            log::info!("Loaded config from {}", path.display());
            cfg
        }
        None => Config::default(),
    };

    // Config values apply only when the CLI is at its default
    if cli.width == 1280 { cli.width = cfg.output.width; }
    if cli.height == 720 { cli.height = cfg.output.height; }
    if cli.fps == 30 { cli.fps = cfg.output.fps; }
    if cli.crf == 18 { cli.crf = cfg.output.crf; }
    if cli.codec == "libx264" { cli.codec = cfg.output.codec.clone(); }
    if cli.font.is_none() { cli.font = cfg.display.font.clone(); }
    if cli.font_url.is_none() { cli.font_url = cfg.display.font_url.clone(); }

    if cli.fps == 0 {
        anyhow::bail!("--fps must be at least 1");
    }

    let mut options = cfg.display.display_options()?;
    if let Some(window_ms) = cli.window_ms {
        options.half_window_ms = (window_ms / 2).max(1);
    }
    if let Some(threshold) = cli.clarity_threshold {
        options.clarity_threshold = threshold;
    }

    log::info!("pitchline - scrolling pitch display renderer");
    log::info!("Session: {}", cli.session.display());
    log::info!("Output: {}", cli.output.display());
    log::info!("Resolution: {}x{} @ {}fps, window {}ms", cli.width, cli.height, cli.fps, options.half_window_ms * 2);

    // 1. Load session data
    let events = session::load_events(&cli.session)?;
    let melody = match cli.melody {
        Some(ref path) => session::load_melody(path)?,
        None => Vec::new(),
    };
    log::info!("Loaded {} events, {} melody notes", events.len(), melody.len());

    // 2. Label font
    let font_bytes = if let Some(ref font_url) = cli.font_url {
        match load_font_from_url(font_url) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                log::warn!("Failed to load font from URL: {}", err);
                None
            }
        }
    } else {
        None
    };
    let labels = match TextOverlay::load(LABEL_FONT_SIZE, cli.font.as_deref(), font_bytes.as_deref()) {
        Ok(labels) => Some(labels),
        Err(err) => {
            log::warn!("Note labels disabled: {}", err);
            None
        }
    };

    // 3. Display on a manual clock, replayed frame by frame
    let clock = ManualClock::new(0);
    let viewport = Viewport::new(cli.width, cli.height);
    let mut display = PitchDisplay::new(viewport, clock.clone(), options);
    if let Some(labels) = labels {
        display.set_label_font(labels);
    }
    display.set_melody_notes(melody);
    let mut replay = Replay::new(display, clock, events);

    let duration_ms = replay.last_event_time() + cli.tail_ms;
    let total_frames = (duration_ms * cli.fps as u64).div_ceil(1000).max(1);
    log::info!("Total frames: {}, Duration: {:.1}s", total_frames, duration_ms as f64 / 1000.0);

    // 4. Start FFmpeg encoder
    log::info!("Starting FFmpeg encoder...");
    let settings = EncoderSettings {
        width: cli.width,
        height: cli.height,
        fps: cli.fps,
        codec: &cli.codec,
        pix_fmt: &cli.pix_fmt,
        crf: cli.crf,
    };
    let mut encoder = FfmpegEncoder::new(&cli.output, cli.audio.as_deref(), &settings)?;

    // 5. Render loop
    let pb = ProgressBar::new(total_frames);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} frames ({eta} remaining)")
            .context("Invalid progress bar template")?
            .progress_chars("=>-"),
    );

    let mut pixels = Vec::new();
    for frame_idx in 0..total_frames {
        let time = frame_idx * 1000 / cli.fps as u64;
        // A rate-limited tick keeps the previous frame's layers.
        replay.advance_to(time);

        let layers = replay
            .display()
            .layers()
            .context("Display has no drawing surface")?;
        layers.composite_into(&mut pixels);
        encoder.write_frame(&pixels)?;
        pb.set_position(frame_idx + 1);
    }

    pb.finish_with_message("Rendering complete");
    if replay.rejected() > 0 {
        log::info!("{} pitch readings were rejected", replay.rejected());
    }
    replay.finish();

    // 6. Finish encoding
    log::info!("Finishing encoding...");
    let frames = encoder.finish()?;

    log::info!("Done! {} frames written to {}", frames, cli.output.display());
    Ok(())
}
