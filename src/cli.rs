//! Command-line options.
//!
//! Flags keep their historical single-dash spelling (`-stereo`,
//! `-col-red-gear (0,1,0)`). They are rewritten to clap's `--long` form
//! before parsing, so both spellings work.

use std::ffi::OsStr;
use std::str::FromStr;

use clap::Parser;

use crate::color::{ColorTarget, GearColors};
use crate::error::GearsError;

/// Usage text printed for unrecognized flags.
pub const USAGE: &str = "\
Usage:
  -display <displayname>       set the display to run on
  -stereo                      run in stereo mode
  -samples N                   run in multisample mode with at least N samples
  -fullscreen                  run in fullscreen mode
  -info                        display OpenGL renderer info
  -geometry WxH+X+Y            window geometry
  -col-red-gear <color>        select red gear color
  -col-green-gear <color>      select green gear color
  -col-blue-gear <color>       select blue gear color
  -col-bg <color>              select background color

Colors are #RRGGBBAA, (R,G,B) or (R,G,B,A) with components in [0,1].";

/// Flags that consume the following argument.
const VALUE_FLAGS: [&str; 7] = [
    "-display",
    "-samples",
    "-geometry",
    "-col-red-gear",
    "-col-green-gear",
    "-col-blue-gear",
    "-col-bg",
];

/// The classic OpenGL gears benchmark.
#[derive(Parser, Debug, Default)]
#[command(name = "glow-gears", version, about, args_override_self = true)]
pub struct Args {
    /// X display to run on.
    #[arg(long, value_name = "NAME", allow_hyphen_values = true)]
    pub display: Option<String>,

    /// Render left and right eyes to a stereo framebuffer.
    #[arg(long)]
    pub stereo: bool,

    /// Request a multisampled framebuffer with at least N samples.
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub samples: u8,

    /// Cover the whole screen with a borderless window.
    #[arg(long)]
    pub fullscreen: bool,

    /// Print OpenGL renderer information at startup.
    #[arg(long)]
    pub info: bool,

    /// Window geometry as WxH+X+Y.
    #[arg(long, value_name = "WxH+X+Y", allow_hyphen_values = true)]
    pub geometry: Option<Geometry>,

    /// Red gear color.
    #[arg(long, value_name = "COLOR", allow_hyphen_values = true)]
    pub col_red_gear: Option<String>,

    /// Green gear color.
    #[arg(long, value_name = "COLOR", allow_hyphen_values = true)]
    pub col_green_gear: Option<String>,

    /// Blue gear color.
    #[arg(long, value_name = "COLOR", allow_hyphen_values = true)]
    pub col_blue_gear: Option<String>,

    /// Background color.
    #[arg(long, value_name = "COLOR", allow_hyphen_values = true)]
    pub col_bg: Option<String>,
}

impl Args {
    /// Parse from an argument list (program name first).
    ///
    /// # Errors
    ///
    /// The clap error for unknown flags, missing values or bad numbers.
    /// `--help` and `--version` also surface as errors, as clap reports them.
    pub fn try_parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self::try_parse_from(normalize(args))
    }

    /// Color flags given on the command line, in fixed target order.
    pub fn color_flags(&self) -> impl Iterator<Item = (ColorTarget, &str)> {
        [
            (ColorTarget::RedGear, &self.col_red_gear),
            (ColorTarget::GreenGear, &self.col_green_gear),
            (ColorTarget::BlueGear, &self.col_blue_gear),
            (ColorTarget::Background, &self.col_bg),
        ]
        .into_iter()
        .filter_map(|(target, literal)| Some((target, literal.as_deref()?)))
    }

    /// Apply the command-line colors over `colors` (which already hold the
    /// defaults and any config-file values). Malformed literals keep the
    /// previous color.
    pub fn apply_colors(&self, colors: &mut GearColors) {
        for (target, literal) in self.color_flags() {
            // Diagnostic already printed; the previous color stays.
            let _ = colors.apply(target, literal);
        }
    }
}

/// Rewrite `-flag` to `--flag`, leaving flag values and short flags alone.
fn normalize<I, T>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = T>,
    T: Into<String>,
{
    let mut out = Vec::new();
    let mut takes_value = false;
    for (i, arg) in args.into_iter().map(Into::into).enumerate() {
        if i == 0 || takes_value {
            takes_value = false;
            out.push(arg);
            continue;
        }
        takes_value = VALUE_FLAGS.contains(&arg.as_str());
        let is_single_dash_long =
            arg.len() > 2 && arg.starts_with('-') && !arg.starts_with("--");
        if is_single_dash_long {
            out.push(format!("-{arg}"));
        } else {
            out.push(arg);
        }
    }
    out
}

/// X11-style window geometry: `[WxH][{+-}X{+-}Y]`.
///
/// Parts that are absent stay `None`. Offsets are taken as signed values.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Geometry {
    /// Width in pixels.
    pub width: Option<u32>,
    /// Height in pixels.
    pub height: Option<u32>,
    /// Horizontal offset.
    pub x: Option<i32>,
    /// Vertical offset.
    pub y: Option<i32>,
}

impl FromStr for Geometry {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || format!("malformed geometry {s:?}, expected WxH+X+Y");
        let spec = s.strip_prefix('=').unwrap_or(s);

        let offset_at = spec.find(['+', '-']).unwrap_or(spec.len());
        let (size, offsets) = spec.split_at(offset_at);

        let mut geometry = Self::default();

        if !size.is_empty() {
            let (w, h) = size.split_once(['x', 'X']).ok_or_else(bad)?;
            let dimension = |d: &str| d.parse::<u32>().ok().filter(|&n| n > 0).ok_or_else(bad);
            geometry.width = Some(dimension(w)?);
            geometry.height = Some(dimension(h)?);
        }

        if !offsets.is_empty() {
            let second = offsets[1..]
                .find(['+', '-'])
                .map(|i| i + 1)
                .ok_or_else(bad)?;
            let (x, y) = offsets.split_at(second);
            geometry.x = Some(parse_offset(x).ok_or_else(bad)?);
            geometry.y = Some(parse_offset(y).ok_or_else(bad)?);
        }

        if size.is_empty() && offsets.is_empty() {
            return Err(bad());
        }
        Ok(geometry)
    }
}

fn parse_offset(s: &str) -> Option<i32> {
    s.strip_prefix('+').unwrap_or(s).parse().ok()
}

/// Window placement after defaults and `-geometry`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Horizontal position.
    pub x: i32,
    /// Vertical position.
    pub y: i32,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            width: 300,
            height: 300,
            x: 0,
            y: 0,
        }
    }
}

/// Everything the window and renderer need at startup.
#[derive(Clone, Debug, Default)]
pub struct StartupOptions {
    /// X display to open, if given.
    pub display: Option<String>,
    /// Render with a stereo framebuffer.
    pub stereo: bool,
    /// Minimum multisample count; 0 disables.
    pub samples: u8,
    /// Cover the current monitor.
    pub fullscreen: bool,
    /// Print renderer information at startup.
    pub info: bool,
    /// Window size and position.
    pub placement: Placement,
    /// Gear and background colors.
    pub colors: GearColors,
}

impl StartupOptions {
    /// Merge parsed flags over `colors`, which already hold the defaults
    /// and the config-file values, so command-line colors win.
    #[must_use]
    pub fn resolve(args: &Args, mut colors: GearColors) -> Self {
        args.apply_colors(&mut colors);

        let mut placement = Placement::default();
        if let Some(geometry) = args.geometry {
            placement.width = geometry.width.unwrap_or(placement.width);
            placement.height = geometry.height.unwrap_or(placement.height);
            placement.x = geometry.x.unwrap_or(placement.x);
            placement.y = geometry.y.unwrap_or(placement.y);
        }

        Self {
            display: args.display.clone(),
            stereo: args.stereo,
            samples: args.samples,
            fullscreen: args.fullscreen,
            info: args.info,
            placement,
            colors,
        }
    }

    /// Whether `-display` was given but a Wayland session will be used
    /// instead, because `WAYLAND_DISPLAY` names a compositor.
    #[must_use]
    pub fn display_shadowed_by(&self, wayland_display: Option<&OsStr>) -> bool {
        self.display.is_some() && wayland_display.is_some_and(|name| !name.is_empty())
    }
}

/// Turn a clap failure into the usage error, unless it is a help or
/// version request.
#[must_use]
pub fn usage_error(err: &clap::Error) -> Option<GearsError> {
    use clap::error::ErrorKind;
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => None,
        _ => {
            let message = err.to_string();
            let first = message.lines().next().unwrap_or_default();
            Some(GearsError::Usage(first.to_owned()))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::config::apply_config_text;

    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_args(std::iter::once("glow-gears").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn single_dash_flags_parse() {
        let args = parse(&["-stereo", "-samples", "4", "-info", "-fullscreen"]);
        assert!(args.stereo && args.info && args.fullscreen);
        assert_eq!(args.samples, 4);
    }

    #[test]
    fn double_dash_flags_parse() {
        let args = parse(&["--display", ":1", "--col-bg", "(0,0,0,0)"]);
        assert_eq!(args.display.as_deref(), Some(":1"));
        assert_eq!(args.col_bg.as_deref(), Some("(0,0,0,0)"));
    }

    #[test]
    fn flag_values_are_not_rewritten() {
        let args = parse(&["-geometry", "-10-20", "-display", "-weird"]);
        assert_eq!(
            args.geometry,
            Some(Geometry {
                width: None,
                height: None,
                x: Some(-10),
                y: Some(-20),
            })
        );
        assert_eq!(args.display.as_deref(), Some("-weird"));
    }

    #[test]
    fn unknown_flag_is_a_usage_error() {
        let err = Args::try_parse_args(["glow-gears", "-bogus"]).unwrap_err();
        let usage = usage_error(&err).unwrap();
        assert_eq!(usage.exit_code(), -1);
    }

    #[test]
    fn missing_value_is_a_usage_error() {
        let err = Args::try_parse_args(["glow-gears", "-samples"]).unwrap_err();
        assert!(usage_error(&err).is_some());
    }

    #[test]
    fn help_is_not_a_usage_error() {
        let err = Args::try_parse_args(["glow-gears", "--help"]).unwrap_err();
        assert!(usage_error(&err).is_none());
    }

    #[test]
    fn geometry_forms() {
        assert_eq!(
            "640x480+10+20".parse::<Geometry>().unwrap(),
            Geometry {
                width: Some(640),
                height: Some(480),
                x: Some(10),
                y: Some(20),
            }
        );
        assert_eq!(
            "800X600".parse::<Geometry>().unwrap(),
            Geometry {
                width: Some(800),
                height: Some(600),
                x: None,
                y: None,
            }
        );
        assert_eq!(
            "=+5-7".parse::<Geometry>().unwrap(),
            Geometry {
                width: None,
                height: None,
                x: Some(5),
                y: Some(-7),
            }
        );
        for bad in [
            "", "640", "640x", "x480", "+10", "10x10+1", "axb", "10x10++1", "0x300", "300x0",
        ] {
            assert!(bad.parse::<Geometry>().is_err(), "{bad:?} accepted");
        }
    }

    #[test]
    fn geometry_overrides_only_given_parts() {
        let args = parse(&["-geometry", "+40+50"]);
        let options = StartupOptions::resolve(&args, GearColors::default());
        assert_eq!(
            options.placement,
            Placement {
                width: 300,
                height: 300,
                x: 40,
                y: 50,
            }
        );
    }

    #[test]
    fn command_line_color_beats_config_file() {
        let mut colors = GearColors::default();
        apply_config_text("-col-red-gear (1,0,0,1)\n", &mut colors);
        assert_eq!(colors.red.to_array(), [1.0, 0.0, 0.0, 1.0]);

        let args = parse(&["-col-red-gear", "(0,1,0,1)"]);
        let options = StartupOptions::resolve(&args, colors);
        assert_eq!(options.colors.red.to_array(), [0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn repeated_flag_takes_last_value() {
        let args = parse(&["-col-red-gear", "(1,0,0)", "-col-red-gear", "(0,1,0)"]);
        assert_eq!(args.col_red_gear.as_deref(), Some("(0,1,0)"));

        let args = parse(&["-samples", "2", "-stereo", "-samples", "4", "-stereo"]);
        assert_eq!(args.samples, 4);
        assert!(args.stereo);
    }

    #[test]
    fn display_flag_is_shadowed_only_under_wayland() {
        let args = parse(&["-display", ":1"]);
        let options = StartupOptions::resolve(&args, GearColors::default());
        assert!(options.display_shadowed_by(Some(OsStr::new("wayland-0"))));
        assert!(!options.display_shadowed_by(Some(OsStr::new(""))));
        assert!(!options.display_shadowed_by(None));

        let options = StartupOptions::resolve(&parse(&[]), GearColors::default());
        assert!(!options.display_shadowed_by(Some(OsStr::new("wayland-0"))));
    }

    #[test]
    fn zero_geometry_size_is_a_usage_error() {
        let err = Args::try_parse_args(["glow-gears", "-geometry", "0x300"]).unwrap_err();
        let usage = usage_error(&err).unwrap();
        assert_eq!(usage.exit_code(), -1);
    }

    #[test]
    fn malformed_command_line_color_keeps_config_value() {
        let mut colors = GearColors::default();
        apply_config_text("-col-bg (0.5,0.5,0.5,1)\n", &mut colors);

        let args = parse(&["-col-bg", "(2,0,0)"]);
        let options = StartupOptions::resolve(&args, colors);
        assert_eq!(options.colors.background.to_array(), [0.5, 0.5, 0.5, 1.0]);
    }
}
