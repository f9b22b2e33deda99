use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnipError {
    #[error("Folder not found: {0}")]
    FolderNotFound(String),

    #[error("Snippet not found: {0}")]
    SnippetNotFound(String),

    #[error("{0}")]
    RootFolder(String),

    #[error("Invalid move: {0}")]
    InvalidMove(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, SnipError>;
