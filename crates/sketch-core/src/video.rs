//! Video capture: a three-state recorder feeding raw frames to an encoder.
//!
//! ```text
//! Idle ──arm──▶ Recording ──max frames / finish──▶ Stopped
//!                   ▲                                  │
//!                   └──────────────arm─────────────────┘
//! ```
//!
//! The encoder hand-off is synchronous: a slow encoder slows the tick down
//! instead of frames being dropped or queued.

use crate::error::{Error, Result};

/// Receives raw RGBA frames, one `send` per captured tick.
pub trait FrameEncoder {
    /// Block until the encoder has accepted `frame`.
    fn send(&mut self, frame: &[u8]) -> Result<()>;

    /// Flush and release the encoder. Called exactly once.
    fn close(&mut self) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordingState {
    #[default]
    Idle,
    Recording,
    Stopped,
}

/// What a capture tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Not recording; nothing happened.
    Skipped,
    /// A frame was forwarded to the encoder.
    Captured,
    /// The frame bound was reached and the recorder stopped.
    Finished,
}

#[derive(Default)]
pub struct VideoCaptureController {
    state: RecordingState,
    frames_recorded: u64,
    /// `0` means unbounded.
    max_frames: u64,
    encoder: Option<Box<dyn FrameEncoder>>,
}

impl std::fmt::Debug for VideoCaptureController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoCaptureController")
            .field("state", &self.state)
            .field("frames_recorded", &self.frames_recorded)
            .field("max_frames", &self.max_frames)
            .finish_non_exhaustive()
    }
}

impl VideoCaptureController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state == RecordingState::Recording
    }

    pub fn frames_recorded(&self) -> u64 {
        self.frames_recorded
    }

    pub fn max_frames(&self) -> u64 {
        self.max_frames
    }

    /// Start recording into `encoder`, resetting all counters.
    ///
    /// A recorder that is still running is finished first.
    pub fn arm(&mut self, encoder: Box<dyn FrameEncoder>, max_frames: u64) -> Result<()> {
        if self.is_recording() {
            log::warn!("re-arming video capture while recording; finishing previous video");
            self.finish()?;
        }
        log::info!("starting recording");
        self.encoder = Some(encoder);
        self.frames_recorded = 0;
        self.max_frames = max_frames;
        self.state = RecordingState::Recording;
        Ok(())
    }

    /// Run one capture tick. `grab` is only called when a frame is due.
    pub fn capture<F>(&mut self, grab: F) -> Result<CaptureOutcome>
    where
        F: FnOnce() -> Result<Vec<u8>>,
    {
        if !self.is_recording() {
            return Ok(CaptureOutcome::Skipped);
        }
        if self.max_frames != 0 && self.frames_recorded >= self.max_frames {
            self.finish()?;
            return Ok(CaptureOutcome::Finished);
        }

        let frame = grab()?;
        let encoder = self
            .encoder
            .as_mut()
            .ok_or_else(|| Error::Encoder("recording without an encoder".into()))?;
        encoder.send(&frame)?;
        self.frames_recorded += 1;
        log::trace!("captured video frame {}", self.frames_recorded);
        Ok(CaptureOutcome::Captured)
    }

    /// Close the encoder and move to `Stopped`. A no-op unless recording.
    pub fn finish(&mut self) -> Result<()> {
        if !self.is_recording() {
            log::debug!("finish_video called while not recording");
            return Ok(());
        }
        log::info!("stopping recording");
        self.state = RecordingState::Stopped;
        match self.encoder.take() {
            Some(mut encoder) => encoder.close(),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Log {
        frames: Vec<Vec<u8>>,
        closed: u32,
    }

    struct MemoryEncoder(Rc<RefCell<Log>>);

    impl FrameEncoder for MemoryEncoder {
        fn send(&mut self, frame: &[u8]) -> Result<()> {
            self.0.borrow_mut().frames.push(frame.to_vec());
            Ok(())
        }

        fn close(&mut self) -> Result<()> {
            self.0.borrow_mut().closed += 1;
            Ok(())
        }
    }

    fn armed(max_frames: u64) -> (VideoCaptureController, Rc<RefCell<Log>>) {
        let log = Rc::new(RefCell::new(Log::default()));
        let mut video = VideoCaptureController::new();
        video
            .arm(Box::new(MemoryEncoder(log.clone())), max_frames)
            .unwrap();
        (video, log)
    }

    #[test]
    fn idle_capture_never_grabs() {
        let mut video = VideoCaptureController::new();
        let outcome = video
            .capture(|| panic!("grab must not run while idle"))
            .unwrap();
        assert_eq!(outcome, CaptureOutcome::Skipped);
    }

    #[test]
    fn bounded_recording_stops_on_tick_after_last_frame() {
        let (mut video, log) = armed(3);
        for i in 0..3u8 {
            assert_eq!(video.capture(|| Ok(vec![i])).unwrap(), CaptureOutcome::Captured);
        }
        assert_eq!(video.state(), RecordingState::Recording);

        assert_eq!(video.capture(|| Ok(vec![9])).unwrap(), CaptureOutcome::Finished);
        assert_eq!(video.state(), RecordingState::Stopped);
        assert_eq!(log.borrow().frames, vec![vec![0], vec![1], vec![2]]);
        assert_eq!(log.borrow().closed, 1);

        assert_eq!(video.capture(|| Ok(vec![9])).unwrap(), CaptureOutcome::Skipped);
    }

    #[test]
    fn unbounded_recording_runs_until_finish() {
        let (mut video, log) = armed(0);
        for _ in 0..100 {
            video.capture(|| Ok(vec![1, 2, 3, 4])).unwrap();
        }
        assert_eq!(video.frames_recorded(), 100);
        video.finish().unwrap();
        assert_eq!(video.state(), RecordingState::Stopped);
        assert_eq!(log.borrow().closed, 1);
    }

    #[test]
    fn rearming_after_stop_resets_counters() {
        let (mut video, _) = armed(1);
        video.capture(|| Ok(vec![0])).unwrap();
        video.capture(|| Ok(vec![0])).unwrap();
        assert_eq!(video.state(), RecordingState::Stopped);

        let log = Rc::new(RefCell::new(Log::default()));
        video.arm(Box::new(MemoryEncoder(log.clone())), 5).unwrap();
        assert_eq!(video.state(), RecordingState::Recording);
        assert_eq!(video.frames_recorded(), 0);
        assert_eq!(video.max_frames(), 5);
    }

    #[test]
    fn rearming_while_recording_closes_previous_encoder() {
        let (mut video, first) = armed(0);
        let second = Rc::new(RefCell::new(Log::default()));
        video.arm(Box::new(MemoryEncoder(second.clone())), 0).unwrap();
        assert_eq!(first.borrow().closed, 1);
        assert_eq!(second.borrow().closed, 0);
    }

    #[test]
    fn grab_failure_does_not_count_a_frame() {
        let (mut video, log) = armed(0);
        let err = video.capture(|| Err(Error::Encoder("no pixels".into())));
        assert!(err.is_err());
        assert_eq!(video.frames_recorded(), 0);
        assert!(log.borrow().frames.is_empty());
    }

    #[test]
    fn finish_while_idle_is_a_no_op() {
        let mut video = VideoCaptureController::new();
        video.finish().unwrap();
        assert_eq!(video.state(), RecordingState::Idle);
    }
}
