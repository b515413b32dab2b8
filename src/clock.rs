//! Frame timing: spin-angle advance and the periodic FPS report.

use std::fmt;
use std::time::Instant;

use crate::types::Animation;

/// Fixed spin speed of the first gear.
pub const DEGREES_PER_SECOND: f64 = 70.0;

/// Minimum length of one FPS sampling window, in seconds.
pub const REPORT_INTERVAL: f64 = 5.0;

/// Frames drawn over one sampling window.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FpsReport {
    /// Frames drawn in the window.
    pub frames: u32,
    /// Length of the window.
    pub seconds: f64,
}

impl FpsReport {
    /// Frames per second.
    #[must_use]
    pub fn fps(&self) -> f64 {
        f64::from(self.frames) / self.seconds
    }
}

impl fmt::Display for FpsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} frames in {:3.1} seconds = {:6.3} FPS",
            self.frames,
            self.seconds,
            self.fps()
        )
    }
}

/// Result of one [`FrameClock::tick`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Tick {
    /// Seconds since the previous tick (zero on the first).
    pub elapsed: f64,
    /// Whether the spin angle moved.
    pub advanced: bool,
    /// Set when a sampling window closed on this tick.
    pub report: Option<FpsReport>,
}

/// Tracks the last rotation time and the FPS sampling window.
#[derive(Debug, Default)]
pub struct FrameClock {
    last_rotation: Option<Instant>,
    window_start: Option<Instant>,
    frames: u32,
}

impl FrameClock {
    /// A clock that has not ticked yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one frame drawn at `now`.
    ///
    /// Advances `animation` by `70°/s × elapsed` when it is enabled, counts
    /// the frame, and closes the sampling window once it spans at least
    /// [`REPORT_INTERVAL`] seconds.
    pub fn tick(&mut self, now: Instant, animation: &mut Animation) -> Tick {
        let last = *self.last_rotation.get_or_insert(now);
        let elapsed = now.saturating_duration_since(last).as_secs_f64();
        self.last_rotation = Some(now);

        let advanced = animation.enabled;
        if advanced {
            animation.advance(DEGREES_PER_SECOND * elapsed);
        }

        self.frames += 1;
        let start = *self.window_start.get_or_insert(now);
        let seconds = now.saturating_duration_since(start).as_secs_f64();
        let report = (seconds >= REPORT_INTERVAL).then(|| {
            let report = FpsReport {
                frames: self.frames,
                seconds,
            };
            self.window_start = Some(now);
            self.frames = 0;
            report
        });

        Tick {
            elapsed,
            advanced,
            report,
        }
    }
}
