//! Error taxonomy shared by every configuration document operation.
//!
//! Every fallible function in this crate returns [`ConfigError`].  Errors are
//! returned to the caller synchronously; nothing in the crate retries.
//!
//! # State on failure
//!
//! An operation that returns an error has not changed the document: content,
//! encoded blob and encoding are only swapped in after serialization and
//! persistence for that operation have both succeeded.

use std::path::PathBuf;

use thiserror::Error;

use crate::encoding::Encoding;
use crate::format::ConfigFormat;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Error type for configuration document operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The backing file does not exist.
    #[error("config file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// A file system I/O error occurred (permissions, disk full, rename failure, ...).
    #[error("I/O error accessing config at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The text is not valid content for the document format.
    #[error("failed to parse {format} content: {message}")]
    Parse {
        format: ConfigFormat,
        message: String,
    },

    /// The in-memory value cannot be rendered in the document format.
    #[error("cannot represent content as {format}: {message}")]
    Serialization {
        format: ConfigFormat,
        message: String,
    },

    /// The blob is not valid text for the claimed encoding.
    #[error("malformed {encoding} text: {message}")]
    Encoding {
        encoding: Encoding,
        message: String,
    },

    /// The operation is not allowed in the document's current state.
    #[error("cannot {operation} while the document is {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    /// The requested file type is neither JSON nor TOML.
    #[error("unsupported config file type {0:?}: expected one of json, toml")]
    UnsupportedFormat(String),

    /// The requested encoding name is not one of base64, base32, base16, hex.
    #[error("unsupported encoding {0:?}: expected one of base64, base32, base16, hex")]
    UnsupportedEncoding(String),

    /// A registry document name that is not a plain file name.
    #[error("invalid document name {0:?}: expected a file name without path separators")]
    InvalidName(String),
}

impl ConfigError {
    /// Maps an I/O error from reading `path`, turning "not found" into
    /// [`ConfigError::FileNotFound`].
    pub(crate) fn from_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound { path }
        } else {
            Self::Io { path, source }
        }
    }

    /// Returns `true` for [`ConfigError::InvalidState`].
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState { .. })
    }
}
