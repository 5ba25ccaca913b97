//! Error types for manifest generation

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for manifest generation
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Chart configuration rejected before any manifest was built
    #[error("validation error: {0}")]
    Validation(String),

    /// Values file could not be read
    #[error("failed to read values file {path}: {source}")]
    ValuesFile {
        /// Path of the values file
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Values file is not a valid chart configuration
    #[error("invalid values file {path}: {source}")]
    ValuesParse {
        /// Path of the values file
        path: PathBuf,
        /// Underlying parse error
        #[source]
        source: serde_yaml::Error,
    },

    /// Filesystem error while writing manifests
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization error
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a validation error with the given message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Whether the error was caused by user input rather than the environment
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::ValuesFile { .. } | Self::ValuesParse { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // Story Tests: Errors Surfaced to the Operator
    // ==========================================================================

    /// Story: Bad chart parameters are rejected with a message naming the field
    #[test]
    fn story_validation_names_the_offending_field() {
        let err = Error::validation("port 0 is out of range (1-65535)");
        assert!(err.to_string().contains("validation error"));
        assert!(err.to_string().contains("port 0"));

        match Error::validation("any message") {
            Error::Validation(msg) => assert_eq!(msg, "any message"),
            _ => panic!("Expected Validation variant"),
        }
    }

    /// Story: IO failures while writing manifests keep the OS message
    #[test]
    fn story_io_errors_convert_with_question_mark() {
        fn write_fails() -> Result<(), Error> {
            let io: std::io::Result<()> = Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only filesystem",
            ));
            io?;
            Ok(())
        }

        let err = write_fails().unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("read-only filesystem"));
        assert!(!err.is_validation());
    }

    /// Story: A malformed values file is a user error, rendering failures are not
    #[test]
    fn story_only_values_parse_errors_count_as_user_input() {
        let parse = || serde_yaml::from_str::<serde_yaml::Value>("image: [unclosed").unwrap_err();

        let values = Error::ValuesParse {
            path: PathBuf::from("values.yaml"),
            source: parse(),
        };
        assert!(values.to_string().starts_with("invalid values file values.yaml"));
        assert!(values.is_validation());

        let render = Error::from(parse());
        assert!(render.to_string().starts_with("yaml error"));
        assert!(!render.is_validation());
    }

    #[test]
    fn values_file_error_includes_path() {
        let err = Error::ValuesFile {
            path: PathBuf::from("/nope/values.yaml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.to_string().contains("/nope/values.yaml"));
        assert!(err.is_validation());
    }
}
