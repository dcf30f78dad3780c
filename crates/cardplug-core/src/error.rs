use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Card identifier errors
    #[error("Invalid card format: {0}")]
    InvalidCardFormat(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing configuration key: {0}")]
    MissingConfig(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
