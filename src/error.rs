//! Error types for hotspot-dash.

use thiserror::Error;

/// The main error type for hotspot-dash.
#[derive(Error, Debug)]
pub enum Error {
    /// IO errors (config files, address lists, log directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Transport-level HTTP failures (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API returned {status} for {url}")]
    Api { status: u16, url: String },

    /// A response decoded but carried unusable data.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Invalid input or state
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Network connectivity errors
    #[error("Network error: {0}")]
    Network(String),
}

/// Alias for Result with our Error type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a new invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new network error.
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Check if this error came from a single failed fetch that the next
    /// poll may recover from.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Http(_)
                | Self::Api { .. }
                | Self::Network(_)
                | Self::Decode(_)
                | Self::Serialization(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        let api = Error::Api {
            status: 503,
            url: "https://api.helium.io/v1/hotspots/x".to_string(),
        };
        assert!(api.is_transient());
        assert!(Error::network("connection reset").is_transient());
        assert!(!Error::config("missing addresses").is_transient());
        assert!(!Error::invalid_input("window mismatch").is_transient());
    }

    #[test]
    fn test_api_error_message() {
        let err = Error::Api {
            status: 404,
            url: "https://example/v1/hotspots/abc".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "API returned 404 for https://example/v1/hotspots/abc"
        );
    }
}
