//! Errors raised while opening a token source.

use thiserror::Error;

/// Errors that occur when a source cannot be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The file could not be read.
    #[error("cannot read '{path}': {message}")]
    Io { path: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_io() {
        let err = SourceError::Io {
            path: "missing.z".into(),
            message: "No such file or directory".into(),
        };
        assert_eq!(
            err.to_string(),
            "cannot read 'missing.z': No such file or directory"
        );
    }
}
