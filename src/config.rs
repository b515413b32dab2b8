//! Startup color configuration file.
//!
//! The file lives at `$HOME/.config/glxgears/config.conf`. Each line that
//! starts with one of the color flag names (`-col-red-gear`, `-col-bg`, …)
//! sets that color from the literal after a single separator character.
//! Other lines are ignored, and a missing file is not an error.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::color::{ColorTarget, GearColors};
use crate::error::ConfigError;

/// Config file location relative to `HOME`.
const RELATIVE_PATH: [&str; 3] = [".config", "glxgears", "config.conf"];

/// Resolve the config path from the `HOME` environment variable.
///
/// # Errors
///
/// [`ConfigError::MissingHome`] if `HOME` is unset.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    config_path_from(std::env::var_os("HOME"))
}

/// Resolve the config path from an explicit `HOME` value.
///
/// # Errors
///
/// [`ConfigError::MissingHome`] if `home` is `None`.
pub fn config_path_from(home: Option<OsString>) -> Result<PathBuf, ConfigError> {
    let mut path = PathBuf::from(home.ok_or(ConfigError::MissingHome)?);
    path.extend(RELATIVE_PATH);
    Ok(path)
}

/// Apply every recognized line of `text`. Returns the number of colors set.
pub fn apply_config_text(text: &str, colors: &mut GearColors) -> usize {
    text.lines()
        .filter_map(|line| {
            ColorTarget::ALL.into_iter().find_map(|target| {
                let rest = line.strip_prefix(target.flag())?;
                // Skip the one separator character after the flag name.
                let mut chars = rest.chars();
                chars.next();
                Some((target, chars.as_str()))
            })
        })
        .filter(|&(target, literal)| colors.apply(target, literal).is_ok())
        .count()
}

/// Load colors from the file at `path` into `colors`.
///
/// A missing file leaves `colors` untouched and returns `Ok(0)`.
///
/// # Errors
///
/// [`ConfigError::Read`] if the file exists but cannot be read.
pub fn load_colors(path: &Path, colors: &mut GearColors) -> Result<usize, ConfigError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!("no config at {}", path.display());
            return Ok(0);
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let applied = apply_config_text(&text, colors);
    info!("applied {applied} color(s) from {}", path.display());
    Ok(applied)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn path_is_under_home() {
        let path = config_path_from(Some("/home/gears".into())).unwrap();
        assert_eq!(path, PathBuf::from("/home/gears/.config/glxgears/config.conf"));
    }

    #[test]
    fn missing_home_is_an_error() {
        assert!(matches!(
            config_path_from(None),
            Err(ConfigError::MissingHome)
        ));
    }

    #[test]
    fn lines_set_matching_colors() {
        let mut colors = GearColors::default();
        let text = "-col-red-gear (1,0,0,1)\n\
                    # comment\n\
                    -col-bg #00000080\n\
                    -col-green-gear (0,0,0\n";
        let applied = apply_config_text(text, &mut colors);
        assert_eq!(applied, 2);
        assert_eq!(colors.red.to_array(), [1.0, 0.0, 0.0, 1.0]);
        assert!((colors.background.alpha() - 128.0 / 255.0).abs() < f32::EPSILON);
        assert_eq!(colors.green, GearColors::default().green);
    }

    #[test]
    fn missing_file_is_ignored() {
        let dir = TempDir::new().unwrap();
        let mut colors = GearColors::default();
        let applied = load_colors(&dir.path().join("config.conf"), &mut colors).unwrap();
        assert_eq!(applied, 0);
        assert_eq!(colors, GearColors::default());
    }

    #[test]
    fn file_on_disk_is_loaded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.conf");
        std::fs::write(&path, "-col-blue-gear (0,0,0.5,1)\n").unwrap();

        let mut colors = GearColors::default();
        assert_eq!(load_colors(&path, &mut colors).unwrap(), 1);
        assert_eq!(colors.blue.to_array(), [0.0, 0.0, 0.5, 1.0]);
    }

    #[test]
    fn directory_in_place_of_file_is_a_read_error() {
        let dir = TempDir::new().unwrap();
        let mut colors = GearColors::default();
        assert!(matches!(
            load_colors(dir.path(), &mut colors),
            Err(ConfigError::Read { .. })
        ));
    }
}
