//! Error types for fusereset-core

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

use crate::area::Area;

/// Errors raised while loading configuration, driving the programmer, or
/// parsing its output
#[derive(Debug, Error)]
pub enum Error {
    /// Device database could not be read
    #[error("Failed to read device database {}: {source}", .path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Device database is not valid JSON or has an unexpected shape
    #[error("Invalid device database {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Two database keys differ only by case
    #[error("Duplicate device entry '{0}' in device database")]
    DuplicateDevice(String),

    /// Requested device has no database entry
    #[error("Unknown device '{0}'")]
    UnknownDevice(String),

    /// The programmer binary could not be started
    #[error("Failed to run {}: {source}", .binary.display())]
    Spawn {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Temporary file creation or access failed
    #[error("Temporary file error: {0}")]
    TempFile(#[source] std::io::Error),

    /// The programmer exited with a failure status while reading
    #[error("Failed to read {area} area of {device} ({status})")]
    ReadFailed {
        area: Area,
        device: String,
        status: ExitStatus,
    },

    /// A line of fuse text could not be parsed
    #[error("Malformed fuse line {line_no} '{line}': {reason}")]
    FuseParse {
        line_no: usize,
        line: String,
        reason: String,
    },
}

/// Result type for fusereset-core operations
pub type Result<T> = std::result::Result<T, Error>;
