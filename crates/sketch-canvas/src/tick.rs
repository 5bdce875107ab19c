//! The per-tick loop: frame counting, capture, then pacing and
//! presentation for a shown display.

use crate::canvas::{Canvas, live};
use crate::error::Result;
use image::RgbaImage;
use sketch_core::{Backend, CaptureOutcome, Error};
use std::time::Instant;

/// Whether the sketch loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Tick {
    Continue,
    Stop,
}

impl Tick {
    pub fn is_stop(&self) -> bool {
        *self == Tick::Stop
    }
}

impl Canvas {
    /// Advance one frame.
    ///
    /// 1. bump the frame counter
    /// 2. capture a video frame if recording (finishing at the bound)
    /// 3. on a shown display: sleep to hold the frame rate, present, and
    ///    poll for cancel/close
    pub fn animate(&mut self) -> Result<Tick> {
        self.frames.advance();

        if self.video.is_recording() {
            let surface = live(&mut self.surface)?;
            let outcome = self.video.capture(|| {
                surface
                    .snapshot()
                    .map(RgbaImage::into_raw)
                    .map_err(|e| Error::Encoder(format!("frame snapshot: {e}")))
            })?;
            if outcome == CaptureOutcome::Finished {
                return Ok(Tick::Stop);
            }
        }

        if self.config.backend == Backend::Display && self.config.show {
            let sleep = self.frames.pace(Instant::now());
            if !sleep.is_zero() {
                std::thread::sleep(sleep);
            }
            let surface = live(&mut self.surface)?;
            surface.present()?;
            if surface.poll_events().should_stop() {
                log::info!("display closed after {} frames", self.frames.frame_count());
                self.close()?;
                return Ok(Tick::Stop);
            }
        }

        Ok(Tick::Continue)
    }

    pub fn frame_count(&self) -> u64 {
        self.frames.frame_count()
    }

    /// Target rate for interactive pacing.
    pub fn frame_rate(&mut self, fps: f64) {
        self.frames.set_fps(fps);
    }
}
