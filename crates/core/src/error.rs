use thiserror::Error;

#[derive(Error, Debug)]
pub enum CellscopeError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, CellscopeError>;
