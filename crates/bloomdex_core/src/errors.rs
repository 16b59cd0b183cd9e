use thiserror::Error;

use crate::DocId;

#[derive(Debug, Error)]
pub enum BloomError {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Block is full")]
    BlockFull,

    #[error("Unknown document {0}")]
    UnknownDocument(DocId),
}

pub type Result<T> = std::result::Result<T, BloomError>;
