use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Invalid node id: {0}")]
    InvalidNodeId(String),

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("Property error: {0}")]
    PropertyError(String),
}
