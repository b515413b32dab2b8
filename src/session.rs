//! Mutable per-run state, owned by the event loop and passed by reference.

use std::time::Instant;

use crate::clock::{FrameClock, Tick};
use crate::event::{self, Action, FrameLoop, Input, LoopState};
use crate::types::{Animation, ViewState};

/// View angles, spin animation, frame clock and loop state for one run.
#[derive(Debug, Default)]
pub struct RenderSession {
    /// View rotation.
    pub view: ViewState,
    /// Spin angle and the pause toggle.
    pub animation: Animation,
    clock: FrameClock,
    frame_loop: FrameLoop,
}

impl RenderSession {
    /// Session in its initial state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one input and advance the loop state machine.
    pub fn handle_input(&mut self, input: Input) -> Action {
        let action = event::handle_input(input, &mut self.view, &mut self.animation);
        self.frame_loop.apply(action);
        action
    }

    /// Start a frame at `now`, advancing the spin angle.
    ///
    /// Returns `None` once the loop has exited; no frame may be drawn then.
    pub fn begin_frame(&mut self, now: Instant) -> Option<Tick> {
        if !self.frame_loop.begin_frame() {
            return None;
        }
        Some(self.clock.tick(now, &mut self.animation))
    }

    /// Finish the frame after it has been presented.
    pub fn end_frame(&mut self) {
        self.frame_loop.end_frame();
    }

    /// Whether the loop should draw without waiting for an event: always
    /// when animating, otherwise only if an input asked for a redraw.
    #[must_use]
    pub fn wants_frame(&self) -> bool {
        !self.is_exited() && (self.animation.enabled || self.frame_loop.redraw_pending())
    }

    /// When animating the loop polls; otherwise it blocks for input.
    #[must_use]
    pub fn should_poll(&self) -> bool {
        !self.is_exited() && self.animation.enabled
    }

    /// Whether the loop has reached `EXITED`.
    #[must_use]
    pub fn is_exited(&self) -> bool {
        self.frame_loop.state() == LoopState::Exited
    }

    /// Spin angle for the current frame.
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub fn angle(&self) -> f32 {
        self.animation.angle() as f32
    }
}
