use thiserror::Error;

#[derive(Error, Debug)]
pub enum HpError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid graph file: {0}")]
    GraphFormat(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Vertex not found: {0}")]
    VertexNotFound(String),

    #[error("ILP model error: {0}")]
    Model(String),
}

pub type Result<T> = std::result::Result<T, HpError>;
