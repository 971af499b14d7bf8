//! Error types for the bridge

use heron_core::config::ConfigError;
use heron_protocol::FrameError;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Bridge error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Serial port error
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML or does not match the schema
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Config values rejected by validation
    #[error("Invalid configuration: {0:?}")]
    Config(ConfigError),

    /// Outgoing frame could not be encoded
    #[error("Frame encoding failed: {0:?}")]
    Frame(FrameError),

    /// Worker thread could not be started
    #[error("Failed to spawn {0} thread: {1}")]
    Spawn(&'static str, std::io::Error),

    /// Worker thread panicked
    #[error("{0} thread panicked")]
    ThreadPanicked(&'static str),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<FrameError> for Error {
    fn from(e: FrameError) -> Self {
        Error::Frame(e)
    }
}
