//! Error types for deco.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecoError {
    // Configuration errors
    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Failed to load environment file: {0}")]
    EnvFile(#[from] dotenvy::Error),

    // Input errors
    #[error("Expected UTF-8 text input but got binary data instead")]
    Encoding {
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("Unrecognized audio format: {detail}")]
    UnrecognizedAudioFormat { detail: String },

    #[error("Invalid synthesis input: {message}")]
    InvalidInputKind { message: String },

    // Synthesis errors
    #[error("Text chunk is {bytes} bytes, synthesis accepts at most {limit}")]
    ChunkTooLarge { bytes: usize, limit: usize },

    #[error(
        "Speech synthesis output size was zero. Possible problem with input. \
         Use the -x option to inspect intermediate outputs."
    )]
    EmptySynthesisOutput,

    // Provider errors
    #[error("Missing credentials for {service}: {message}")]
    MissingCredentials { service: String, message: String },

    #[error("{service} returned status {status}: {message}")]
    Provider {
        service: String,
        status: u16,
        message: String,
    },

    #[error("{service} request failed: {message}")]
    Http { service: String, message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, DecoError>;

impl DecoError {
    /// Build a provider error from a non-success status.
    pub fn provider(service: &str, status: u16, message: impl Into<String>) -> Self {
        DecoError::Provider {
            service: service.to_string(),
            status,
            message: message.into(),
        }
    }

    /// Build a transport-level error for a provider call.
    pub fn http(service: &str, message: impl Into<String>) -> Self {
        DecoError::Http {
            service: service.to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_config_invalid_value_display() {
        let error = DecoError::ConfigInvalidValue {
            key: "speech_synthesis.chunk_size".to_string(),
            message: "must be positive".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid configuration value for speech_synthesis.chunk_size: must be positive"
        );
    }

    #[test]
    fn test_encoding_display_and_source() {
        let bad = String::from_utf8(vec![0xff, 0xfe, 0x00]).unwrap_err();
        let error = DecoError::Encoding { source: bad };
        assert_eq!(
            error.to_string(),
            "Expected UTF-8 text input but got binary data instead"
        );
        let error_trait: &dyn std::error::Error = &error;
        assert!(error_trait.source().is_some());
    }

    #[test]
    fn test_empty_synthesis_output_mentions_extra_outputs() {
        let message = DecoError::EmptySynthesisOutput.to_string();
        assert!(message.contains("size was zero"));
        assert!(message.contains("-x"));
    }

    #[test]
    fn test_chunk_too_large_display() {
        let error = DecoError::ChunkTooLarge {
            bytes: 5001,
            limit: 5000,
        };
        assert_eq!(
            error.to_string(),
            "Text chunk is 5001 bytes, synthesis accepts at most 5000"
        );
    }

    #[test]
    fn test_provider_helper() {
        let error = DecoError::provider("Google TTS", 403, "permission denied");
        assert_eq!(
            error.to_string(),
            "Google TTS returned status 403: permission denied"
        );
    }

    #[test]
    fn test_http_helper() {
        let error = DecoError::http("OpenAI", "connection reset");
        assert_eq!(error.to_string(), "OpenAI request failed: connection reset");
    }

    #[test]
    fn test_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: DecoError = io_error.into();
        assert!(error.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_toml_error() {
        let toml_error = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let error: DecoError = toml_error.into();
        assert!(error.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_from_dotenv_error() {
        let error: DecoError = dotenvy::Error::LineParse("KEY VALUE".to_string(), 3).into();
        assert!(error.to_string().starts_with("Failed to load environment file"));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<DecoError>();
        assert_sync::<DecoError>();
    }
}
