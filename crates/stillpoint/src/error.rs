//! Error types for the stillpoint engine
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// Main error type for the stillpoint engine
#[derive(Error, Debug)]
pub enum AudioError {
    /// The base64 payload could not be decoded into bytes
    #[error("Malformed audio encoding: {0}")]
    MalformedEncoding(String),

    /// The output device or engine thread failed
    #[error("Audio output error: {0}")]
    Output(String),
}

/// Result type alias for the stillpoint engine
pub type Result<T> = std::result::Result<T, AudioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_encoding_display() {
        let err = AudioError::MalformedEncoding("bad symbol at offset 3".to_string());
        assert_eq!(
            err.to_string(),
            "Malformed audio encoding: bad symbol at offset 3"
        );
    }

    #[test]
    fn output_display() {
        let err = AudioError::Output("no default device".to_string());
        assert_eq!(err.to_string(), "Audio output error: no default device");
    }
}
