//! Unified error handling for the Echo exporter
//!
//! This module provides the error type shared by scene loading,
//! the export pipeline and the command-line front end.

use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for all exporter operations
#[derive(Error, Debug)]
pub enum Error {
    // ==================== Filesystem Errors ====================

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A directory of the export layout could not be created
    #[error("Failed to create directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The export destination has no usable final path component
    #[error("Export destination has no file name: {0}")]
    InvalidDestination(PathBuf),

    /// A layout path exists but is not a directory
    #[error("Path exists and is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The scene file could not be written
    #[error("Failed to write {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ==================== Validation Errors ====================

    /// The scene has no camera object
    #[error("Scene contains no camera object")]
    MissingCamera,

    /// An export profile value is out of range
    #[error("Invalid profile value for {field}: {message}")]
    InvalidProfile {
        field: String,
        message: String,
    },

    // ==================== Scene Input Errors ====================

    /// The scene description could not be loaded
    #[error("Failed to load scene {path}: {message}")]
    SceneLoad {
        path: PathBuf,
        message: String,
    },

    /// Unsupported input file format
    #[error("Unsupported format: {format}")]
    UnsupportedFormat {
        format: String,
    },

    // ==================== Geometry Errors ====================

    /// A mesh object carries no geometry the writer can realize
    #[error("Object {object} has no geometry data")]
    MissingGeometry {
        object: String,
    },

    /// The mesh writer rejected an object
    #[error("Mesh export failed for {object}: {message}")]
    MeshWrite {
        object: String,
        message: String,
    },

    // ==================== General Errors ====================

    /// Custom error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

/// Result type using the unified Error
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an error with additional context
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Error::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create an invalid profile error
    pub fn invalid_profile(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidProfile {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a scene load error
    pub fn scene_load(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Error::SceneLoad {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Check if this is a filesystem error, which aborts an export
    pub fn is_filesystem_error(&self) -> bool {
        match self {
            Error::Io(_)
            | Error::CreateDirectory { .. }
            | Error::NotADirectory(_)
            | Error::InvalidDestination(_)
            | Error::WriteFile { .. } => true,
            Error::WithContext { source, .. } => source.is_filesystem_error(),
            _ => false,
        }
    }

    /// Check if this error was raised by validation before any output was emitted
    pub fn is_validation_error(&self) -> bool {
        match self {
            Error::MissingCamera | Error::InvalidProfile { .. } => true,
            Error::WithContext { source, .. } => source.is_validation_error(),
            _ => false,
        }
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_with_context() {
        let err = Error::NotADirectory(PathBuf::from("/scene/geometries"));
        let contextualized = err.with_context("while planning layout");

        assert!(contextualized.to_string().contains("while planning layout"));
        assert!(contextualized.is_filesystem_error());
    }

    #[test]
    fn test_is_filesystem_error() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let create = Error::CreateDirectory { path: PathBuf::from("/x"), source: io };
        assert!(create.is_filesystem_error());
        assert!(!Error::MissingCamera.is_filesystem_error());
        assert!(!Error::MissingGeometry { object: "Cube".into() }.is_filesystem_error());
    }

    #[test]
    fn test_is_validation_error() {
        assert!(Error::MissingCamera.is_validation_error());
        assert!(Error::invalid_profile("width", "must be positive").is_validation_error());
        assert!(!Error::NotADirectory(PathBuf::from("/x")).is_validation_error());
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::MissingCamera);
        let with_context = result.context("assembling scene");

        assert!(with_context.is_err());
        assert!(with_context.unwrap_err().to_string().contains("assembling scene"));
    }
}
