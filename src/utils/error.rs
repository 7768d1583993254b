// src/utils/error.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Invalid timestamp '{0}', expected YYYY-MM-DD HH:MM:SS")]
    InvalidTimestamp(String),

    #[error("Chat log contains no messages")]
    EmptyLog,
}

#[derive(Error, Debug)]
pub enum StreamError {
    #[error("Stream channel closed before the session finished")]
    ChannelClosed,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Chat log error: {0}")]
    Chat(#[from] ChatError),

    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Data processing failed: {0}")]
    Processing(String),
}
