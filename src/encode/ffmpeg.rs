use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use std::process::{Child, Command, Stdio};

pub struct EncoderSettings<'a> {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub codec: &'a str,
    pub pix_fmt: &'a str,
    pub crf: u32,
}

/// Pipes raw RGBA frames into an ffmpeg child process.
pub struct FfmpegEncoder {
    child: Child,
    frame_bytes: usize,
    frames_written: u64,
}

impl FfmpegEncoder {
    pub fn new(output_path: &Path, audio: Option<&Path>, settings: &EncoderSettings) -> Result<Self> {
        let args = build_args(output_path, audio, settings)?;

        let child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .context("Failed to spawn ffmpeg. Is ffmpeg installed?")?;

        log::info!(
            "FFmpeg encoder started: {}x{} @ {}fps, codec={}",
            settings.width, settings.height, settings.fps, settings.codec
        );

        Ok(Self {
            child,
            frame_bytes: settings.width as usize * settings.height as usize * 4,
            frames_written: 0,
        })
    }

    /// Send one composited display frame (RGBA, `width * height * 4` bytes).
    pub fn write_frame(&mut self, rgba_pixels: &[u8]) -> Result<()> {
        check_frame_len(rgba_pixels.len(), self.frame_bytes)?;
        let pipe = self
            .child
            .stdin
            .as_mut()
            .context("Encoder pipe already closed")?;
        pipe.write_all(rgba_pixels)
            .with_context(|| format!("Failed to pipe display frame {} to ffmpeg", self.frames_written))?;
        self.frames_written += 1;
        Ok(())
    }

    /// Close the pipe and wait for ffmpeg to finalise the video.
    pub fn finish(mut self) -> Result<u64> {
        drop(self.child.stdin.take());

        let output = self
            .child
            .wait_with_output()
            .context("ffmpeg did not exit cleanly after the last display frame")?;
        if !output.status.success() {
            anyhow::bail!(
                "ffmpeg rejected the pitch display video after {} frames:\n{}",
                self.frames_written,
                String::from_utf8_lossy(&output.stderr)
            );
        }

        log::info!("Encoded {} display frames", self.frames_written);
        Ok(self.frames_written)
    }
}

fn check_frame_len(len: usize, expected: usize) -> Result<()> {
    if len != expected {
        anyhow::bail!("Display frame is {} bytes, encoder expects {}", len, expected);
    }
    Ok(())
}

fn build_args(output_path: &Path, audio: Option<&Path>, settings: &EncoderSettings) -> Result<Vec<String>> {
    let path_arg = |p: &Path| {
        p.to_str()
            .map(str::to_string)
            .with_context(|| format!("Path is not valid UTF-8: {}", p.display()))
    };

    let mut args = vec![
        "-y".to_string(),
        "-f".into(), "rawvideo".into(),
        "-pixel_format".into(), "rgba".into(),
        "-video_size".into(), format!("{}x{}", settings.width, settings.height),
        "-framerate".into(), settings.fps.to_string(),
        "-i".into(), "pipe:0".into(),
    ];
    if let Some(audio) = audio {
        args.extend(["-i".into(), path_arg(audio)?]);
    }
    args.extend([
        "-c:v".into(), settings.codec.to_string(),
        "-pix_fmt".into(), settings.pix_fmt.to_string(),
        "-crf".into(), settings.crf.to_string(),
        "-preset".into(), "medium".into(),
    ]);
    if audio.is_some() {
        args.extend([
            "-c:a".into(), "aac".into(),
            "-b:a".into(), "192k".into(),
            "-shortest".into(),
        ]);
    }
    args.push(path_arg(output_path)?);
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> EncoderSettings<'static> {
        EncoderSettings {
            width: 640,
            height: 360,
            fps: 30,
            codec: "libx264",
            pix_fmt: "yuv420p",
            crf: 20,
        }
    }

    #[test]
    fn video_only_has_no_audio_options() {
        let args = build_args(Path::new("out.mp4"), None, &settings()).unwrap();
        assert!(args.windows(2).any(|w| w[0] == "-video_size" && w[1] == "640x360"));
        assert!(!args.iter().any(|a| a == "-c:a"));
        assert_eq!(args.last().map(String::as_str), Some("out.mp4"));
    }

    #[test]
    fn backing_track_is_muxed() {
        let args = build_args(Path::new("out.mp4"), Some(Path::new("song.wav")), &settings()).unwrap();
        assert_eq!(args.iter().filter(|a| *a == "-i").count(), 2);
        assert!(args.iter().any(|a| a == "song.wav"));
        assert!(args.iter().any(|a| a == "-shortest"));
    }

    #[test]
    fn frame_must_match_the_output_size() {
        let s = settings();
        let bytes = s.width as usize * s.height as usize * 4;
        assert!(check_frame_len(bytes, bytes).is_ok());
        let err = check_frame_len(bytes - 4, bytes).unwrap_err();
        assert!(err.to_string().contains("encoder expects 921600"));
    }
}
