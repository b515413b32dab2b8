//! Window, GL context and surface creation, plus the startup queries.
//!
//! Framebuffer config selection goes through `glutin-winit`'s
//! [`DisplayBuilder`]; the chosen config, context and surface are kept
//! together in [`GlWindow`] for the lifetime of the run.

use std::num::NonZeroU32;
use std::sync::Arc;

use glow::HasContext;
use glutin::config::{Config, ConfigTemplateBuilder};
use glutin::context::{ContextAttributesBuilder, PossiblyCurrentContext};
use glutin::display::{DisplayFeatures, GetGlDisplay};
use glutin::prelude::*;
use glutin::surface::{Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow as _};
use raw_window_handle::HasWindowHandle;
use tracing::{debug, info};
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{Key as WinitKey, NamedKey};
use winit::window::{Fullscreen, Window};

use crate::cli::StartupOptions;
use crate::error::GearsError;
use crate::event::Key;

/// Window and application name.
pub const TITLE: &str = "glxgears";

/// Human-readable list of the framebuffer capabilities requested, as used in
/// the "couldn't get a visual" diagnostic.
#[must_use]
pub fn visual_description(stereo: bool, samples: u8) -> String {
    let mut description = String::from("RGB, Double-buffered");
    if stereo {
        description.push_str(", Stereo");
    }
    if samples > 0 {
        description.push_str(", Multisample");
    }
    description
}

/// The startup note printed when presentation is tied to the vertical
/// refresh, or `None` for an unsynchronized interval.
#[must_use]
pub fn vsync_message(interval: u32) -> Option<String> {
    let rate = match interval {
        0 => return None,
        1 => "approximately the same as the monitor refresh rate.".to_owned(),
        n => format!("approximately 1/{n} the monitor refresh rate."),
    };
    Some(format!(
        "Running synchronized to the vertical refresh.  The framerate should be\n{rate}"
    ))
}

/// Renderer information printed for `-info`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlInfo {
    /// `GL_RENDERER`.
    pub renderer: String,
    /// `GL_VERSION`.
    pub version: String,
    /// `GL_VENDOR`.
    pub vendor: String,
    /// Supported extensions, sorted.
    pub extensions: Vec<String>,
    /// X11 visual id of the framebuffer config.
    pub visual_id: Option<u64>,
}

impl std::fmt::Display for GlInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "GL_RENDERER   = {}", self.renderer)?;
        writeln!(f, "GL_VERSION    = {}", self.version)?;
        writeln!(f, "GL_VENDOR     = {}", self.vendor)?;
        write!(f, "GL_EXTENSIONS = {}", self.extensions.join(" "))?;
        if let Some(id) = self.visual_id {
            write!(f, "\nVisualID {id}, 0x{id:x}")?;
        }
        Ok(())
    }
}

/// Map a winit logical key to the keys the program reacts to.
#[must_use]
pub fn translate_key(key: &WinitKey) -> Key {
    match key {
        WinitKey::Named(NamedKey::ArrowLeft) => Key::Left,
        WinitKey::Named(NamedKey::ArrowRight) => Key::Right,
        WinitKey::Named(NamedKey::ArrowUp) => Key::Up,
        WinitKey::Named(NamedKey::ArrowDown) => Key::Down,
        WinitKey::Named(NamedKey::Escape) => Key::Escape,
        WinitKey::Character(text) => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Key::Char(c),
                _ => Key::Other,
            }
        }
        _ => Key::Other,
    }
}

/// Prefer a config with an alpha channel so a translucent background can
/// composite; otherwise take the first match.
///
/// # Panics
///
/// If `configs` is empty. glutin reports an empty match as an error before
/// calling the picker, so this does not happen.
fn pick_config(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    configs
        .reduce(|best, config| {
            if best.alpha_size() == 0 && config.alpha_size() > 0 {
                config
            } else {
                best
            }
        })
        .expect("glutin never offers an empty config list")
}

/// A window with a current GL context and its surface.
///
/// Fields drop in declaration order: the surface and context go before the
/// window they were created on.
pub struct GlWindow {
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
    /// The glow context, shared with the renderer.
    pub gl: Arc<glow::Context>,
    config: Config,
    /// The winit window. Must outlive the surface and context.
    pub window: Window,
}

impl GlWindow {
    /// Create the window and make a GL context current on it.
    ///
    /// # Errors
    ///
    /// [`GearsError::NoFramebufferConfig`] if no framebuffer config matches,
    /// [`GearsError::Context`] or [`GearsError::Surface`] if GL setup fails.
    pub fn create(
        event_loop: &ActiveEventLoop,
        options: &StartupOptions,
    ) -> Result<Self, GearsError> {
        let placement = options.placement;
        let mut attributes = Window::default_attributes()
            .with_title(TITLE)
            .with_inner_size(PhysicalSize::new(placement.width, placement.height))
            .with_position(PhysicalPosition::new(placement.x, placement.y));
        if options.fullscreen {
            attributes = attributes.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let mut template = ConfigTemplateBuilder::new().with_depth_size(16);
        if options.stereo {
            template = template.with_stereoscopy(Some(true));
        }
        if options.samples > 0 {
            template = template.with_multisampling(options.samples);
        }

        let (window, config) = DisplayBuilder::new()
            .with_window_attributes(Some(attributes))
            .build(event_loop, template, pick_config)
            .map_err(|err| {
                debug!("config search failed: {err}");
                GearsError::NoFramebufferConfig(visual_description(options.stereo, options.samples))
            })?;
        let window = window.ok_or_else(|| GearsError::Surface("no window was created".into()))?;
        info!(
            alpha = config.alpha_size(),
            depth = config.depth_size(),
            samples = config.num_samples(),
            "framebuffer config selected"
        );

        let raw_handle = window
            .window_handle()
            .map_err(|err| GearsError::Surface(err.to_string()))?
            .as_raw();
        let display = config.display();
        let context_attributes = ContextAttributesBuilder::new().build(Some(raw_handle));
        let not_current = unsafe { display.create_context(&config, &context_attributes) }
            .map_err(|err| GearsError::Context(err.to_string()))?;

        let surface_attributes = window
            .build_surface_attributes(SurfaceAttributesBuilder::default())
            .map_err(|err| GearsError::Surface(err.to_string()))?;
        let surface = unsafe { display.create_window_surface(&config, &surface_attributes) }
            .map_err(|err| GearsError::Surface(err.to_string()))?;
        let context = not_current
            .make_current(&surface)
            .map_err(|err| GearsError::Context(err.to_string()))?;

        let gl = unsafe {
            glow::Context::from_loader_function_cstr(|name| display.get_proc_address(name).cast())
        };

        Ok(Self {
            surface,
            context,
            gl: Arc::new(gl),
            config,
            window,
        })
    }

    /// Current framebuffer size in pixels.
    #[must_use]
    pub fn size(&self) -> [u32; 2] {
        let size = self.window.inner_size();
        [size.width, size.height]
    }

    /// Resize the surface to match the window. Zero sizes are ignored.
    pub fn resize(&self, width: u32, height: u32) {
        if let (Some(width), Some(height)) = (NonZeroU32::new(width), NonZeroU32::new(height)) {
            self.surface.resize(&self.context, width, height);
        }
    }

    /// Swap the back buffer(s) to the screen.
    ///
    /// # Errors
    ///
    /// [`GearsError::Surface`] if the swap fails.
    pub fn present(&self) -> Result<(), GearsError> {
        self.surface
            .swap_buffers(&self.context)
            .map_err(|err| GearsError::Surface(err.to_string()))
    }

    /// Ask for presentation synchronized to every vertical refresh when the
    /// display supports swap control. Returns the interval now in effect, or
    /// `None` if it is unknown.
    pub fn sync_to_vblank(&self) -> Option<u32> {
        let display = self.config.display();
        if !display
            .supported_features()
            .contains(DisplayFeatures::SWAP_CONTROL)
        {
            debug!("display has no swap control");
            return None;
        }
        match self
            .surface
            .set_swap_interval(&self.context, SwapInterval::Wait(NonZeroU32::MIN))
        {
            Ok(()) => Some(1),
            Err(err) => {
                debug!("swap interval request failed: {err}");
                None
            }
        }
    }

    /// Collect the renderer strings and visual id.
    ///
    /// # Safety
    ///
    /// The context must be current.
    #[must_use]
    pub unsafe fn info(&self) -> GlInfo {
        let gl = &self.gl;
        let mut extensions: Vec<String> = gl.supported_extensions().iter().cloned().collect();
        extensions.sort_unstable();
        unsafe {
            GlInfo {
                renderer: gl.get_parameter_string(glow::RENDERER),
                version: gl.get_parameter_string(glow::VERSION),
                vendor: gl.get_parameter_string(glow::VENDOR),
                extensions,
                visual_id: self.visual_id(),
            }
        }
    }

    #[cfg(all(
        unix,
        not(any(
            target_os = "macos",
            target_os = "ios",
            target_os = "android",
            target_os = "emscripten"
        ))
    ))]
    fn visual_id(&self) -> Option<u64> {
        use glutin::platform::x11::X11GlConfigExt;
        self.config.x11_visual().map(|visual| u64::from(visual.visual_id()))
    }

    #[cfg(not(all(
        unix,
        not(any(
            target_os = "macos",
            target_os = "ios",
            target_os = "android",
            target_os = "emscripten"
        ))
    )))]
    fn visual_id(&self) -> Option<u64> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visual_description_names_requested_capabilities() {
        assert_eq!(visual_description(false, 0), "RGB, Double-buffered");
        assert_eq!(visual_description(true, 0), "RGB, Double-buffered, Stereo");
        assert_eq!(
            visual_description(true, 4),
            "RGB, Double-buffered, Stereo, Multisample"
        );
        assert_eq!(
            GearsError::NoFramebufferConfig(visual_description(false, 2)).to_string(),
            "couldn't get an RGB, Double-buffered, Multisample visual"
        );
    }

    #[test]
    fn vsync_messages() {
        assert_eq!(vsync_message(0), None);
        assert_eq!(
            vsync_message(1).as_deref(),
            Some(
                "Running synchronized to the vertical refresh.  The framerate should be\n\
                 approximately the same as the monitor refresh rate."
            )
        );
        assert!(vsync_message(2)
            .is_some_and(|m| m.ends_with("approximately 1/2 the monitor refresh rate.")));
    }

    #[test]
    fn info_dump_layout() {
        let info = GlInfo {
            renderer: "llvmpipe".into(),
            version: "4.5".into(),
            vendor: "Mesa".into(),
            extensions: vec!["GL_A".into(), "GL_B".into()],
            visual_id: Some(33),
        };
        assert_eq!(
            info.to_string(),
            "GL_RENDERER   = llvmpipe\n\
             GL_VERSION    = 4.5\n\
             GL_VENDOR     = Mesa\n\
             GL_EXTENSIONS = GL_A GL_B\n\
             VisualID 33, 0x21"
        );
    }

    #[test]
    fn keys_translate() {
        assert_eq!(translate_key(&WinitKey::Named(NamedKey::ArrowLeft)), Key::Left);
        assert_eq!(translate_key(&WinitKey::Named(NamedKey::ArrowDown)), Key::Down);
        assert_eq!(translate_key(&WinitKey::Named(NamedKey::Escape)), Key::Escape);
        assert_eq!(translate_key(&WinitKey::Character("a".into())), Key::Char('a'));
        assert_eq!(translate_key(&WinitKey::Character("A".into())), Key::Char('A'));
        assert_eq!(translate_key(&WinitKey::Character("ab".into())), Key::Other);
        assert_eq!(translate_key(&WinitKey::Named(NamedKey::Tab)), Key::Other);
    }
}
