use thiserror::Error;

/// Top-level error type for the Vaani backend.
///
/// Subsystem crates define their own error types and implement
/// `From<SubsystemError> for VaaniError` so that `?` works across crate
/// boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VaaniError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for VaaniError {
    fn from(err: toml::de::Error) -> Self {
        VaaniError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for VaaniError {
    fn from(err: toml::ser::Error) -> Self {
        VaaniError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for VaaniError {
    fn from(err: serde_json::Error) -> Self {
        VaaniError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Vaani operations.
pub type Result<T> = std::result::Result<T, VaaniError>;
