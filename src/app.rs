//! `ApplicationHandler` implementation driving the gears.

use std::time::Instant;

use glow_gears::cli::StartupOptions;
use glow_gears::event::{Action, Input};
use glow_gears::projection::StereoParams;
use glow_gears::window::{self, GlWindow};
use glow_gears::{GearRenderer, GearsError, RenderSession};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow};
use winit::window::WindowId;

/// Window, context and renderer, created on the first resume.
struct Graphics {
    window: GlWindow,
    renderer: GearRenderer,
}

/// Event loop state for one run.
pub struct GearsApp {
    options: StartupOptions,
    session: RenderSession,
    graphics: Option<Graphics>,
    error: Option<GearsError>,
}

impl GearsApp {
    pub fn new(options: StartupOptions) -> Self {
        Self {
            options,
            session: RenderSession::new(),
            graphics: None,
            error: None,
        }
    }

    /// The fatal error that stopped the loop, if any.
    pub fn take_error(&mut self) -> Option<GearsError> {
        self.error.take()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: GearsError) {
        tracing::error!("{err}");
        self.error = Some(err);
        event_loop.exit();
    }

    fn initialize(&self, event_loop: &ActiveEventLoop) -> Result<Graphics, GearsError> {
        let window = GlWindow::create(event_loop, &self.options)?;

        if let Some(message) = window.sync_to_vblank().and_then(window::vsync_message) {
            println!("{message}");
        }
        if self.options.info {
            println!("{}", unsafe { window.info() });
        }

        let stereo = self.options.stereo.then(StereoParams::default);
        let renderer = unsafe {
            GearRenderer::new(
                window.gl.clone(),
                &self.options.colors,
                stereo,
                window.size(),
            )?
        };
        tracing::info!("renderer ready");
        Ok(Graphics { window, renderer })
    }

    fn input(&mut self, event_loop: &ActiveEventLoop, input: Input) {
        let action = self.session.handle_input(input);
        if self.session.is_exited() {
            event_loop.exit();
        } else if action == Action::Redraw {
            if let Some(graphics) = &self.graphics {
                graphics.window.window.request_redraw();
            }
        }
    }

    fn draw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(graphics) = &mut self.graphics else {
            return;
        };
        let Some(tick) = self.session.begin_frame(Instant::now()) else {
            return;
        };

        unsafe {
            graphics
                .renderer
                .render(&self.session.view, self.session.angle());
        }
        let presented = graphics.window.present();
        self.session.end_frame();
        if let Err(err) = presented {
            self.fail(event_loop, err);
            return;
        }

        if let Some(report) = tick.report {
            println!("{report}");
        }
    }
}

impl ApplicationHandler for GearsApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.graphics.is_some() {
            return;
        }
        match self.initialize(event_loop) {
            Ok(graphics) => {
                graphics.window.window.request_redraw();
                self.graphics = Some(graphics);
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => self.input(event_loop, Input::CloseRequested),

            WindowEvent::Resized(size) => {
                if let Some(graphics) = &mut self.graphics {
                    graphics.window.resize(size.width, size.height);
                    unsafe { graphics.renderer.resize(size.width, size.height) };
                }
                self.input(
                    event_loop,
                    Input::Resize {
                        width: size.width,
                        height: size.height,
                    },
                );
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key,
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                let key = window::translate_key(&logical_key);
                self.input(event_loop, Input::KeyPress(key));
            }

            WindowEvent::RedrawRequested => {
                self.session.handle_input(Input::Expose);
                self.draw(event_loop);
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.session.is_exited() {
            event_loop.exit();
            return;
        }
        event_loop.set_control_flow(if self.session.should_poll() {
            ControlFlow::Poll
        } else {
            ControlFlow::Wait
        });
        if self.session.wants_frame() {
            if let Some(graphics) = &self.graphics {
                graphics.window.window.request_redraw();
            }
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(graphics) = self.graphics.take() {
            unsafe { graphics.renderer.destroy() };
            tracing::info!("gear resources released");
        }
    }
}
