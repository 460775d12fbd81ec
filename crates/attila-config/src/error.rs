//! Error type of the config crate.

use core::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Filesystem operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOp {
    /// Reading a render config.
    Read,
    /// Writing a render config.
    Write,
    /// Creating the directory a config is saved into.
    CreateDir,
}

impl fmt::Display for FileOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FileOp::Read => "read",
            FileOp::Write => "write",
            FileOp::CreateDir => "create directory",
        })
    }
}

/// Errors from loading, saving or resolving a render configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A filesystem operation failed.
    #[error("could not {op} '{path}': {source}")]
    File {
        /// What was being done.
        op: FileOp,
        /// Path involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid render-config TOML.
    #[error("malformed render config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be encoded as TOML.
    #[error("could not encode render config: {0}")]
    Encode(#[from] toml::ser::Error),

    /// A parameter or engine setting was rejected.
    #[error("validation failed: {0}")]
    Validation(#[from] crate::validation::ValidationError),
}

impl ConfigError {
    fn file(op: FileOp, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::File {
            op,
            path: path.into(),
            source,
        }
    }

    /// Reading `path` failed.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::file(FileOp::Read, path, source)
    }

    /// Writing `path` failed.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::file(FileOp::Write, path, source)
    }

    /// Creating the directory `path` failed.
    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::file(FileOp::CreateDir, path, source)
    }

    /// Whether the error came from the filesystem rather than the content.
    pub fn is_io(&self) -> bool {
        matches!(self, ConfigError::File { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationError;
    use std::error::Error;

    fn not_found() -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::NotFound, "missing")
    }

    #[test]
    fn file_errors_name_the_operation_and_path() {
        let err = ConfigError::read_file("/a/render.toml", not_found());
        assert_eq!(err.to_string(), "could not read '/a/render.toml': missing");
        assert!(err.source().is_some());
        assert!(err.is_io());

        let err = ConfigError::create_dir("/a", not_found());
        assert!(matches!(err, ConfigError::File { op: FileOp::CreateDir, .. }));
        assert!(err.to_string().starts_with("could not create directory"));
    }

    #[test]
    fn write_error_keeps_source() {
        let err = ConfigError::write_file("out.toml", not_found());
        assert!(matches!(err, ConfigError::File { op: FileOp::Write, ref path, .. } if path == std::path::Path::new("out.toml")));
        assert!(err.source().is_some());
    }

    #[test]
    fn validation_wraps_message() {
        let err = ConfigError::from(ValidationError::UnknownParameter("drive9".to_string()));
        assert!(!err.is_io());
        assert_eq!(
            err.to_string(),
            "validation failed: unknown parameter 'drive9'"
        );
    }
}
