//! Error taxonomy.
//!
//! Startup failures are fatal and carry the process exit status they map to.
//! Malformed color literals are recoverable and never reach [`GearsError`]:
//! the previous color is kept and a diagnostic is printed.

use std::path::PathBuf;

/// Exit status for usage errors and display-open failures.
pub const EXIT_USAGE: i32 = -1;

/// Exit status for missing `HOME`, framebuffer and context failures.
pub const EXIT_FAILURE: i32 = 1;

/// A color literal that could not be applied.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ColorError {
    /// The literal matches neither the hex nor the tuple grammar.
    #[error("Format error on {0}")]
    Malformed(String),

    /// A component parsed but lies outside `[0, 1]`.
    #[error("Format error on {0}")]
    OutOfRange(String),
}

impl ColorError {
    /// The offending token as the user wrote it.
    #[must_use]
    pub fn token(&self) -> &str {
        match self {
            Self::Malformed(token) | Self::OutOfRange(token) => token,
        }
    }
}

/// Failures while locating or reading the color config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `HOME` is unset, so the config path cannot be built.
    #[error("Couldn't find HOME environment variable")]
    MissingHome,

    /// The file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// Config file path.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}

/// Fatal startup and GL errors.
#[derive(Debug, thiserror::Error)]
pub enum GearsError {
    /// The windowing system could not be reached.
    #[error("couldn't open display {0}")]
    Display(String),

    /// No framebuffer config offers the requested capabilities.
    #[error("couldn't get an {0} visual")]
    NoFramebufferConfig(String),

    /// The GL context could not be created or made current.
    #[error("context creation failed: {0}")]
    Context(String),

    /// The window surface could not be created.
    #[error("surface creation failed: {0}")]
    Surface(String),

    /// Shader compilation or program linking failed.
    #[error("shader error: {0}")]
    Shader(String),

    /// A GL object (buffer, vertex array) could not be created.
    #[error("GL resource error: {0}")]
    Gl(String),

    /// Unrecognized flag or malformed flag argument.
    #[error("invalid command line: {0}")]
    Usage(String),

    /// Config path resolution failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl GearsError {
    /// Process exit status for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Display(_) | Self::Usage(_) => EXIT_USAGE,
            Self::NoFramebufferConfig(_)
            | Self::Context(_)
            | Self::Surface(_)
            | Self::Shader(_)
            | Self::Gl(_)
            | Self::Config(_) => EXIT_FAILURE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_error_names_the_token() {
        let err = ColorError::OutOfRange("(2,0,0)".into());
        assert_eq!(err.to_string(), "Format error on (2,0,0)");
        assert_eq!(err.token(), "(2,0,0)");
    }

    #[test]
    fn exit_codes_follow_error_class() {
        assert_eq!(GearsError::Display(":1".into()).exit_code(), -1);
        assert_eq!(GearsError::Usage("-bogus".into()).exit_code(), -1);
        assert_eq!(GearsError::Config(ConfigError::MissingHome).exit_code(), 1);
        assert_eq!(GearsError::Context("no context".into()).exit_code(), 1);
    }

    #[test]
    fn framebuffer_error_lists_capabilities() {
        let err = GearsError::NoFramebufferConfig("RGB, Double-buffered, Stereo".into());
        assert_eq!(
            err.to_string(),
            "couldn't get an RGB, Double-buffered, Stereo visual"
        );
    }
}
