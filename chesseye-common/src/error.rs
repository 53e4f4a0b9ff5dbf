//! Common error types for ChessEye

use thiserror::Error;

/// Common result type for ChessEye operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the ChessEye crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML configuration file could not be parsed
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// TOML configuration could not be serialized
    #[error("Configuration write error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    /// Tracing subscriber could not be installed
    #[error("Logging error: {0}")]
    Logging(String),
}
