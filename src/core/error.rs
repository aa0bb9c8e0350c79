use std::fmt;
use std::error::Error;

#[derive(Debug)]
pub enum DocumentError {
    IoError(String),
    GenerationError(String),
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentError::IoError(msg) => write!(f, "I/O error: {}", msg),
            DocumentError::GenerationError(msg) => write!(f, "generation error: {}", msg),
        }
    }
}

impl Error for DocumentError {}

impl From<std::io::Error> for DocumentError {
    fn from(error: std::io::Error) -> Self {
        DocumentError::IoError(error.to_string())
    }
}

impl From<lopdf::Error> for DocumentError {
    fn from(error: lopdf::Error) -> Self {
        DocumentError::GenerationError(error.to_string())
    }
}

impl From<tokio::task::JoinError> for DocumentError {
    fn from(error: tokio::task::JoinError) -> Self {
        DocumentError::GenerationError(error.to_string())
    }
}

pub type DocumentResult<T> = Result<T, DocumentError>;
