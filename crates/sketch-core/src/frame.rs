//! Frame counting and interactive frame pacing.

use std::path::Path;
use std::time::{Duration, Instant};

/// How long to block so that ticks are at least `target` apart.
///
/// Returns zero when the previous tick is already `target` or more in the
/// past (or when `now` is earlier than `last_tick`).
pub fn compute_sleep_duration(last_tick: Instant, now: Instant, target: Duration) -> Duration {
    target.saturating_sub(now.saturating_duration_since(last_tick))
}

/// Monotonic frame counter plus the pacing clock.
#[derive(Debug)]
pub struct FrameController {
    frame_count: u64,
    last_tick: Option<Instant>,
    interval: Duration,
}

impl FrameController {
    pub fn new(fps: f64) -> Self {
        Self {
            frame_count: 0,
            last_tick: None,
            interval: interval_for(fps),
        }
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn set_fps(&mut self, fps: f64) {
        self.interval = interval_for(fps);
    }

    /// Count one tick. Runs in every mode.
    pub fn advance(&mut self) -> u64 {
        self.frame_count += 1;
        self.frame_count
    }

    /// Sleep needed at `now` to hold the target rate.
    ///
    /// Records `now + sleep` as the new tick time, i.e. the moment the
    /// caller wakes up. The first call never sleeps.
    pub fn pace(&mut self, now: Instant) -> Duration {
        let sleep = match self.last_tick {
            Some(last) => compute_sleep_duration(last, now, self.interval),
            None => Duration::ZERO,
        };
        self.last_tick = Some(now + sleep);
        sleep
    }
}

fn interval_for(fps: f64) -> Duration {
    if fps.is_finite() && fps > 0.0 {
        Duration::from_secs_f64(1.0 / fps)
    } else {
        Duration::ZERO
    }
}

/// Per-frame file name: `<stem>_<frame:010><ext>`.
///
/// Without a base name the result is `frame_<frame:010>.jpg`.
pub fn frame_filename(base: Option<&str>, frame: u64) -> String {
    let Some(base) = base else {
        return format!("frame_{frame:010}.jpg");
    };
    let path = Path::new(base);
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            let stem_len = base.len() - ext.len() - 1;
            format!("{}_{frame:010}.{ext}", &base[..stem_len])
        }
        None => format!("{base}_{frame:010}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sleeps_for_remaining_budget() {
        let t0 = Instant::now();
        let target = Duration::from_millis(16);
        let sleep = compute_sleep_duration(t0, t0 + Duration::from_millis(10), target);
        assert_eq!(sleep, Duration::from_millis(6));
    }

    #[test]
    fn late_tick_does_not_sleep() {
        let t0 = Instant::now();
        let target = Duration::from_millis(16);
        assert_eq!(
            compute_sleep_duration(t0, t0 + Duration::from_millis(40), target),
            Duration::ZERO
        );
    }

    #[test]
    fn clock_going_backwards_does_not_sleep_past_budget() {
        let t0 = Instant::now() + Duration::from_millis(50);
        let target = Duration::from_millis(16);
        assert_eq!(compute_sleep_duration(t0, Instant::now(), target), target);
    }

    #[test]
    fn pace_records_wake_time() {
        let mut frames = FrameController::new(50.0);
        let t0 = Instant::now();
        assert_eq!(frames.pace(t0), Duration::ZERO);

        let sleep = frames.pace(t0 + Duration::from_millis(5));
        assert_eq!(sleep, Duration::from_millis(15));

        // Woke at t0 + 20ms; a tick 25ms after that needs no sleep.
        assert_eq!(frames.pace(t0 + Duration::from_millis(45)), Duration::ZERO);
    }

    #[test]
    fn advance_is_monotonic_from_zero() {
        let mut frames = FrameController::new(60.0);
        assert_eq!(frames.frame_count(), 0);
        assert_eq!(frames.advance(), 1);
        assert_eq!(frames.advance(), 2);
    }

    #[test]
    fn non_positive_fps_disables_pacing() {
        let frames = FrameController::new(0.0);
        assert_eq!(frames.interval(), Duration::ZERO);
    }

    #[test]
    fn frame_filename_inserts_padded_counter() {
        assert_eq!(frame_filename(None, 7), "frame_0000000007.jpg");
        assert_eq!(frame_filename(Some("out/shot.png"), 42), "out/shot_0000000042.png");
        assert_eq!(frame_filename(Some("shot"), 1), "shot_0000000001");
    }
}
