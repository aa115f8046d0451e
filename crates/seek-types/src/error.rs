//! Error types shared across seek-store crates.

use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum SeekError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unknown distance space name
    #[error("Unknown distance space: {0}")]
    UnknownSpace(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let errors = [
            SeekError::Config("missing store_dir".to_string()),
            SeekError::UnknownSpace("hamming".to_string()),
        ];
        for error in &errors {
            // Every variant must have a producer in this crate
            let expected = match error {
                SeekError::Config(_) => "Configuration error: missing store_dir",
                SeekError::UnknownSpace(_) => "Unknown distance space: hamming",
            };
            assert_eq!(error.to_string(), expected);
        }
        assert!(matches!(
            "hamming".parse::<crate::DistanceSpace>(),
            Err(SeekError::UnknownSpace(_))
        ));
    }
}
