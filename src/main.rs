//! `glow-gears`: draws three spinning gears and reports the frame rate.

mod app;

use std::process;

use glow_gears::cli::{self, Args, StartupOptions, USAGE};
use glow_gears::color::GearColors;
use glow_gears::config;
use glow_gears::GearsError;
use tracing_subscriber::EnvFilter;
use winit::event_loop::EventLoop;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("glow_gears=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run() {
        match &err {
            GearsError::Usage(message) => {
                tracing::warn!("{message}");
                println!("{USAGE}");
            }
            GearsError::Config(_) => eprintln!("{err}"),
            _ => println!("Error: {err}"),
        }
        process::exit(err.exit_code());
    }
}

fn run() -> Result<(), GearsError> {
    let args = match Args::try_parse_args(std::env::args()) {
        Ok(args) => args,
        Err(err) => {
            return match cli::usage_error(&err) {
                Some(usage) => Err(usage),
                None => {
                    // --help / --version
                    let _ = err.print();
                    Ok(())
                }
            };
        }
    };

    let mut colors = GearColors::default();
    let path = config::config_path()?;
    if let Err(err) = config::load_colors(&path, &mut colors) {
        // An unreadable file is treated like a missing one.
        tracing::warn!("{err}");
    }
    let options = StartupOptions::resolve(&args, colors);

    if let Some(display_value) = &options.display {
        std::env::set_var("DISPLAY", display_value);
        if options.display_shadowed_by(std::env::var_os("WAYLAND_DISPLAY").as_deref()) {
            tracing::warn!(
                display = %display_value,
                "-display has no effect while WAYLAND_DISPLAY is set; unset it to use X11"
            );
        }
    }

    let event_loop = EventLoop::new().map_err(|err| {
        tracing::debug!("event loop creation failed: {err}");
        GearsError::Display(display_name(options.display.as_deref()))
    })?;

    let mut app = app::GearsApp::new(options);
    tracing::info!("entering event loop");
    event_loop
        .run_app(&mut app)
        .map_err(|err| GearsError::Context(err.to_string()))?;

    match app.take_error() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// The display named on the command line, or `$DISPLAY`.
fn display_name(flag: Option<&str>) -> String {
    flag.map(str::to_owned)
        .or_else(|| std::env::var("DISPLAY").ok())
        .unwrap_or_default()
}

