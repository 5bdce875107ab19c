//! Video encoding by streaming raw RGBA frames into a system `ffmpeg`.
//!
//! `ffmpeg` must be on `PATH` (or named via [`FfmpegOptions::binary`]).
//! A missing binary surfaces as an encoder error when recording starts.

use sketch_core::{Error, FrameEncoder, Result};
use std::io::Write;
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};

#[derive(Debug, Clone)]
pub struct FfmpegOptions {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    /// Extra arguments placed before `-i -`.
    pub input_params: Vec<String>,
    /// Extra arguments placed before the output path.
    pub output_params: Vec<String>,
    pub binary: String,
}

impl FfmpegOptions {
    pub fn new(width: u32, height: u32, fps: f64) -> Self {
        Self {
            width,
            height,
            fps,
            input_params: Vec::new(),
            output_params: Vec::new(),
            binary: "ffmpeg".to_string(),
        }
    }

    /// Full argument list for encoding stdin into `output`.
    pub fn args(&self, output: &Path) -> Vec<String> {
        let mut args: Vec<String> = [
            "-y",
            "-f",
            "rawvideo",
            "-vcodec",
            "rawvideo",
            "-s",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        args.push(format!("{}x{}", self.width, self.height));
        args.extend(["-pix_fmt", "rgba", "-r"].map(String::from));
        args.push(format!("{}", self.fps));
        args.extend(self.input_params.iter().cloned());
        args.extend(
            [
                "-i",
                "-",
                "-an",
                "-vcodec",
                "libx264",
                "-pix_fmt",
                "yuv420p",
                "-vf",
                "pad=ceil(iw/2)*2:ceil(ih/2)*2",
            ]
            .map(String::from),
        );
        args.extend(self.output_params.iter().cloned());
        args.push(output.display().to_string());
        args
    }
}

pub struct FfmpegEncoder {
    child: Child,
    stdin: Option<ChildStdin>,
    frame_len: usize,
}

impl FfmpegEncoder {
    pub fn spawn(output: &Path, opts: &FfmpegOptions) -> Result<Self> {
        let args = opts.args(output);
        log::debug!("spawning {} {}", opts.binary, args.join(" "));
        let mut child = Command::new(&opts.binary)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::Encoder(format!("failed to start {}: {e}", opts.binary)))?;
        let stdin = child.stdin.take();
        Ok(Self {
            child,
            stdin,
            frame_len: opts.width as usize * opts.height as usize * 4,
        })
    }
}

impl FrameEncoder for FfmpegEncoder {
    fn send(&mut self, frame: &[u8]) -> Result<()> {
        if frame.len() != self.frame_len {
            return Err(Error::Encoder(format!(
                "frame is {} bytes, expected {}",
                frame.len(),
                self.frame_len
            )));
        }
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| Error::Encoder("encoder already closed".into()))?;
        stdin
            .write_all(frame)
            .map_err(|e| Error::Encoder(format!("write to ffmpeg: {e}")))
    }

    fn close(&mut self) -> Result<()> {
        // Dropping stdin signals end of stream.
        if self.stdin.take().is_none() {
            return Ok(());
        }
        let status = self
            .child
            .wait()
            .map_err(|e| Error::Encoder(format!("wait for ffmpeg: {e}")))?;
        if !status.success() {
            return Err(Error::Encoder(format!("ffmpeg exited with {status}")));
        }
        Ok(())
    }
}

impl Drop for FfmpegEncoder {
    fn drop(&mut self) {
        if self.stdin.is_some()
            && let Err(e) = self.close()
        {
            log::warn!("ffmpeg shutdown: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn args_place_user_params_around_input() {
        let mut opts = FfmpegOptions::new(320, 240, 30.0);
        opts.input_params = vec!["-thread_queue_size".into(), "64".into()];
        opts.output_params = vec!["-crf".into(), "18".into()];
        let args = opts.args(Path::new("out.mp4"));

        let pos = |s: &str| args.iter().position(|a| a == s).unwrap();
        assert_eq!(args[pos("-s") + 1], "320x240");
        assert_eq!(args[pos("-r") + 1], "30");
        assert!(pos("-thread_queue_size") < pos("-i"));
        assert!(pos("-crf") > pos("-i"));
        assert_eq!(args.last().unwrap(), "out.mp4");
    }

    #[test]
    fn missing_binary_is_an_encoder_error() {
        let mut opts = FfmpegOptions::new(2, 2, 1.0);
        opts.binary = "definitely-not-an-ffmpeg-binary".into();
        assert!(matches!(
            FfmpegEncoder::spawn(Path::new("x.mp4"), &opts),
            Err(Error::Encoder(_))
        ));
    }
}
