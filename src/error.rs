use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(shiftboard::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(shiftboard::config),
        help("Set WIW_ICS_URL_DUBLIN15 / WIW_ICS_URL_ESPOO or WIW_ICS_EXTRA_URLS")
    )]
    Config(String),

    #[error("Feed fetch error: {0}")]
    #[diagnostic(code(shiftboard::fetch))]
    Fetch(String),

    #[error("Schedule parse error: {0}")]
    #[diagnostic(code(shiftboard::parse))]
    Parse(String),

    #[error("Component error: {0}")]
    #[diagnostic(code(shiftboard::component))]
    Component(String),

    #[error(transparent)]
    #[diagnostic(code(shiftboard::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(shiftboard::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(shiftboard::other))]
    Other(String),
}

impl Error {
    /// Whether this error should block the whole view rather than show inline
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_) | Error::Environment(_))
    }
}

// Implement From for TOML deserialization errors
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type ShiftResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Invalid value for environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create feed fetch errors
pub fn fetch_error(message: &str) -> Error {
    Error::Fetch(message.to_string())
}

/// Helper to create parse errors
pub fn parse_error(message: &str) -> Error {
    Error::Parse(message.to_string())
}

/// Helper to create component errors
pub fn component_error(message: &str) -> Error {
    Error::Component(message.to_string())
}
