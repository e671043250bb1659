//! Error types for ALICE-AFM.
//!
//! Construction and persistence are fallible; queries never are. A pattern
//! that cannot occur simply yields an empty result.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for ALICE-AFM operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, loading or saving an index.
#[derive(Error, Debug)]
pub enum Error {
    /// Window length or trigger modulus outside the supported range.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// Raw text rejected by the construction-mode parser.
    #[error("invalid text: {0}")]
    InvalidText(String),

    /// Dictionary is empty, malformed, or contains reserved bytes.
    #[error("invalid dictionary: {0}")]
    InvalidDictionary(String),

    /// Parse is empty, malformed, or references unknown phrase ranks.
    #[error("invalid parse: {0}")]
    InvalidParse(String),

    /// A required input artifact does not exist.
    #[error("missing required file: {}", .0.display())]
    MissingArtifact(PathBuf),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Blob encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// Reloaded blobs do not describe a consistent index.
    #[error("corrupted index: {0}")]
    Corrupted(String),

    /// Configuration could not be loaded or failed validation.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Returns true if the error comes from the caller's inputs rather than
    /// from the environment (filesystem, stored blobs).
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidParams(_)
                | Self::InvalidText(_)
                | Self::InvalidDictionary(_)
                | Self::InvalidParse(_)
                | Self::Config(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_artifact_message() {
        let err = Error::MissingArtifact(PathBuf::from("/tmp/input.dict"));
        assert_eq!(err.to_string(), "missing required file: /tmp/input.dict");
        assert!(!err.is_input_error());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_input_errors() {
        assert!(Error::InvalidParams("w".into()).is_input_error());
        assert!(Error::InvalidParse("empty".into()).is_input_error());
        assert!(!Error::Corrupted("len".into()).is_input_error());
    }
}
