/// # Garage Door Errors
/// This module defines the `GarageDoorError` enum, which encapsulates the errors that can occur in the garage door simulator's plumbing.
/// The door state machine itself never surfaces these to the host layer; they come from configuration, persistence and the runtime channels.


use thiserror::Error;
use std::io;
use tokio::sync::mpsc::error::SendError;
use tokio::sync::oneshot::error::RecvError;

#[derive(Error, Debug)]
pub enum GarageDoorError {
    /// Represents errors arising from misconfigurations or invalid settings.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Represents standard input/output errors.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// Represents errors that occur during serialization or deserialization of data.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Represents failures of the persistence backend.
    #[error("Persistence error: {0}")]
    PersistenceError(String),

    /// Represents errors when sending data over a channel.
    #[error("Channel send error: {0}")]
    ChannelSendError(String),

    /// Represents errors when receiving data from a channel.
    #[error("Channel receive error: {0}")]
    ChannelRecvError(String),
}

impl<T> From<SendError<T>> for GarageDoorError {
    fn from(err: SendError<T>) -> Self {
        GarageDoorError::ChannelSendError(err.to_string())
    }
}

impl From<RecvError> for GarageDoorError {
    fn from(err: RecvError) -> Self {
        GarageDoorError::ChannelRecvError(err.to_string())
    }
}

impl From<config::ConfigError> for GarageDoorError {
    fn from(err: config::ConfigError) -> Self {
        GarageDoorError::ConfigError(err.to_string())
    }
}

pub type GarageDoorResult<T> = Result<T, GarageDoorError>;
