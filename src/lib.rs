//! The classic "gears" OpenGL benchmark, rendered with [glow] on a
//! [glutin]/[winit] window.
//!
//! Three gear wheels are generated procedurally at startup, uploaded once as
//! static vertex/index buffers, and replayed every frame with per-gear spin
//! transforms. The achieved frame rate is printed every five seconds.
//!
//! # Pieces
//!
//! - [`geometry`] builds the triangle mesh of one gear wheel.
//! - [`store`] owns the three uploaded meshes and their scene placement.
//! - [`render`] walks the scene through a [`render::GearCanvas`], once per
//!   stereo eye, and provides the glow-backed canvas.
//! - [`clock`] advances the spin angle and produces the periodic FPS report.
//! - [`session`] and [`event`] hold the mutable view/animation state and map
//!   input to redraw/exit/no-op.
//! - [`color`], [`config`] and [`cli`] resolve the startup options.
//! - [`window`] creates the window, GL context and surface.
//!
//! # Safety
//!
//! Everything that touches GL requires a valid, current OpenGL context and is
//! therefore `unsafe`, exactly like the calls it wraps.
//!
//! [glow]: https://docs.rs/glow
//! [glutin]: https://docs.rs/glutin
//! [winit]: https://docs.rs/winit

pub mod cli;
pub mod clock;
pub mod color;
pub mod config;
pub mod error;
pub mod event;
pub mod geometry;
pub mod projection;
pub mod render;
pub mod session;
mod shaders;
pub mod store;
pub mod types;
pub mod window;

pub use error::GearsError;
pub use render::GearRenderer;
pub use session::RenderSession;
