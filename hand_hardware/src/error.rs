use thiserror::Error;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("link disconnected")]
    Disconnected,
    #[error("link write queue full")]
    QueueFull,
}

pub type Result<T> = std::result::Result<T, LinkError>;
