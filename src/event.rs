//! Input mapping and the top-level loop state machine.
//!
//! Window-system events are first reduced to [`Input`], a small platform
//! independent vocabulary, then [`handle_input`] applies them to the view and
//! animation state and answers with an [`Action`]. [`FrameLoop`] tracks
//! whether the loop is waiting, drawing, or has exited.

use crate::types::{Animation, ViewState};

/// Degrees the view turns per arrow key press.
pub const VIEW_STEP_DEGREES: f32 = 5.0;

/// A key the program distinguishes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Key {
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Escape.
    Escape,
    /// A printable character.
    Char(char),
    /// Anything else, which only triggers a redraw.
    Other,
}

/// Events the loop reacts to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Input {
    /// The window contents were damaged.
    Expose,
    /// New framebuffer size in pixels.
    Resize {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
    },
    /// A key went down.
    KeyPress(Key),
    /// The window manager asked the window to close.
    CloseRequested,
}

/// What the loop should do after an input.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Draw a frame.
    Redraw,
    /// Leave the loop.
    Exit,
    /// Nothing to do.
    Nop,
}

/// Apply `input` to the view and animation state.
///
/// Resizes answer [`Action::Nop`]: the caller recomputes the projection, and
/// the expose that follows triggers the redraw.
pub fn handle_input(input: Input, view: &mut ViewState, animation: &mut Animation) -> Action {
    match input {
        Input::Expose => Action::Redraw,
        Input::Resize { .. } => Action::Nop,
        Input::CloseRequested | Input::KeyPress(Key::Escape) => Action::Exit,
        Input::KeyPress(key) => {
            match key {
                Key::Left => view.rot_y += VIEW_STEP_DEGREES,
                Key::Right => view.rot_y -= VIEW_STEP_DEGREES,
                Key::Up => view.rot_x += VIEW_STEP_DEGREES,
                Key::Down => view.rot_x -= VIEW_STEP_DEGREES,
                Key::Char('a' | 'A') => animation.toggle(),
                Key::Char(_) | Key::Other | Key::Escape => {}
            }
            Action::Redraw
        }
    }
}

/// States of the top-level loop.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum LoopState {
    /// Blocked until input arrives (or polling, when animating).
    #[default]
    WaitingForEvent,
    /// Rendering and presenting a frame.
    Drawing,
    /// Terminal.
    Exited,
}

/// The loop state machine.
///
/// `EXITED` is terminal: once reached, no further frame may begin.
#[derive(Debug, Default)]
pub struct FrameLoop {
    state: LoopState,
    redraw_pending: bool,
}

impl FrameLoop {
    /// A loop waiting for its first event.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Record the outcome of an input.
    pub fn apply(&mut self, action: Action) {
        if self.state == LoopState::Exited {
            return;
        }
        match action {
            Action::Redraw => self.redraw_pending = true,
            Action::Exit => {
                self.state = LoopState::Exited;
                self.redraw_pending = false;
            }
            Action::Nop => {}
        }
    }

    /// Whether a frame is owed without animation driving it.
    #[must_use]
    pub fn redraw_pending(&self) -> bool {
        self.redraw_pending
    }

    /// Enter `DRAWING`. Returns `false` if the loop has exited.
    pub fn begin_frame(&mut self) -> bool {
        match self.state {
            LoopState::Exited => false,
            LoopState::WaitingForEvent | LoopState::Drawing => {
                self.state = LoopState::Drawing;
                self.redraw_pending = false;
                true
            }
        }
    }

    /// Return to `WAITING_FOR_EVENT` once the frame is presented.
    pub fn end_frame(&mut self) {
        if self.state == LoopState::Drawing {
            self.state = LoopState::WaitingForEvent;
        }
    }
}
