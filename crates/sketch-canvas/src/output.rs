//! Canvas output: image files, per-frame files, video recording and
//! document pages.

use crate::canvas::{Canvas, live};
use crate::error::{CanvasError, Result};
use image::RgbaImage;
use sketch_core::{Backend, FrameEncoder, RecordingState, frame_filename};
use sketch_render::{FfmpegEncoder, FfmpegOptions, SurfaceError, format_for_path, save_image};
use std::path::{Path, PathBuf};

pub const DEFAULT_VIDEO_FILE: &str = "sketch.mp4";

/// Recording parameters for [`Canvas::save_video`].
#[derive(Debug, Clone)]
pub struct VideoOptions {
    pub fps: f64,
    /// `0` records until [`Canvas::finish_video`].
    pub max_frames: u64,
    pub input_params: Vec<String>,
    pub output_params: Vec<String>,
}

impl Default for VideoOptions {
    fn default() -> Self {
        Self {
            fps: 60.0,
            max_frames: 0,
            input_params: Vec::new(),
            output_params: Vec::new(),
        }
    }
}

impl Canvas {
    /// Snapshot the canvas and encode it by extension (`.png`, `.jpg`, `.webp`).
    ///
    /// Any other extension is reported and nothing is written; the canvas
    /// stays usable.
    pub fn save(&mut self, filename: impl AsRef<Path>) -> Result<()> {
        let path = filename.as_ref();
        if let Err(e) = format_for_path(path) {
            log::warn!("invalid filename: {e}");
            return Err(e.into());
        }
        let image = self.snapshot()?;
        save_image(&image, path)?;
        Ok(())
    }

    /// Save under a name carrying the zero-padded frame counter.
    ///
    /// `None` gives `frame_<n>.jpg`. Returns the path written.
    pub fn save_frame(&mut self, filename: Option<&str>) -> Result<PathBuf> {
        let path = PathBuf::from(frame_filename(filename, self.frames.frame_count()));
        log::debug!("saving frame {} to {}", self.frames.frame_count(), path.display());
        self.save(&path)?;
        Ok(path)
    }

    /// The current frame as straight-alpha RGBA8.
    pub fn snapshot(&mut self) -> Result<RgbaImage> {
        Ok(live(&mut self.surface)?.snapshot()?)
    }

    // ─── Video ───────────────────────────────────────────────────────────

    /// Start recording into `filename` through a system `ffmpeg`.
    pub fn save_video(&mut self, filename: impl AsRef<Path>, options: VideoOptions) -> Result<()> {
        let (width, height) = self.recordable_size()?;
        let ffmpeg = FfmpegOptions {
            input_params: options.input_params,
            output_params: options.output_params,
            ..FfmpegOptions::new(width, height, options.fps)
        };
        let encoder = FfmpegEncoder::spawn(filename.as_ref(), &ffmpeg)?;
        self.save_video_with(Box::new(encoder), options.max_frames)
    }

    /// Start recording into any frame encoder. Frames are raw RGBA of the
    /// surface's pixel size.
    ///
    /// Document canvases have no pixels to record and are rejected.
    pub fn save_video_with(
        &mut self,
        encoder: Box<dyn FrameEncoder>,
        max_frames: u64,
    ) -> Result<()> {
        self.recordable_size()?;
        self.video.arm(encoder, max_frames)?;
        Ok(())
    }

    fn recordable_size(&mut self) -> Result<(u32, u32)> {
        let surface = live(&mut self.surface)?;
        match surface.backend() {
            Backend::Document => Err(SurfaceError::Unsupported {
                operation: "save_video",
                backend: Backend::Document,
            }
            .into()),
            _ => Ok(surface.size()),
        }
    }

    pub fn finish_video(&mut self) -> Result<()> {
        self.video.finish()?;
        Ok(())
    }

    pub fn is_recording(&self) -> bool {
        self.video.is_recording()
    }

    pub fn recording_state(&self) -> RecordingState {
        self.video.state()
    }

    pub fn frames_recorded(&self) -> u64 {
        self.video.frames_recorded()
    }

    // ─── Documents ───────────────────────────────────────────────────────

    /// End the current document page and start a new one, canvas-sized
    /// unless `width`/`height` are given.
    ///
    /// Outstanding pushes do not carry over to the new page.
    pub fn add_page(&mut self, width: Option<f64>, height: Option<f64>) -> Result<()> {
        let width = width.unwrap_or(self.width() as f64);
        let height = height.unwrap_or(self.height() as f64);
        live(&mut self.surface)?.begin_page(width, height)?;
        let dropped = self.transforms.reset();
        if dropped > 0 {
            log::debug!("add_page discarded {dropped} unmatched push(es)");
        }
        Ok(())
    }

    /// Finish the document and write it to the configured output path.
    pub fn save_pdf(&mut self) -> Result<()> {
        if self.config.backend != Backend::Document {
            return Err(SurfaceError::Unsupported {
                operation: "save_pdf",
                backend: self.config.backend,
            }
            .into());
        }
        self.close()
    }

    /// Tear the surface down. Later draw calls fail with `SurfaceClosed`.
    pub fn close(&mut self) -> Result<()> {
        let video = self.video.finish();
        let mut surface = self.surface.take().ok_or(CanvasError::SurfaceClosed)?;
        surface.close()?;
        Ok(video?)
    }
}
