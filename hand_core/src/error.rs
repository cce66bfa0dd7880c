use thiserror::Error;

use crate::program::CommandId;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum HandError {
    #[error("program is playing; stop playback before editing")]
    PlaybackActive,
    #[error("program has no command {0}")]
    UnknownCommand(CommandId),
    #[error("program has no commands")]
    EmptyProgram,
    #[error("configuration error: {0}")]
    Config(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("invalid state: {0}")]
    State(String),
}

/// Wire frame decoding failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("empty frame")]
    Empty,
    #[error("unknown frame prefix in {0:?}")]
    UnknownPrefix(String),
    #[error("unknown joint code {0:?}")]
    UnknownJoint(String),
    #[error("malformed field {0:?}")]
    MalformedField(String),
    #[error("multi-joint frame must list T,I,M,R,P in order, got {0:?}")]
    FieldOrder(String),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing transport")]
    MissingTransport,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}
