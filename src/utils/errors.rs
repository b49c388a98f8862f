use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the cache
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("Cannot list cache directory {}: {source}", .path.display())]
    ListError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure to turn a value into bytes or back again
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Unsupported protocol {found}, expected {expected}")]
    Protocol { expected: u8, found: u8 },

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),
}

impl From<bincode::Error> for CodecError {
    fn from(err: bincode::Error) -> Self {
        CodecError::Decode(err.to_string())
    }
}

/// Markup that could not be parsed into an element tree
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Document is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("Malformed markup: {0}")]
    Malformed(String),

    #[error("Document has no root element")]
    Empty,

    #[error("Unexpected content after the root element")]
    TrailingContent,

    #[error("Unclosed element <{0}>")]
    Unclosed(String),

    #[error("Invalid markup name '{0}'")]
    InvalidName(String),

    #[error("Duplicate attribute '{attribute}' on <{element}>")]
    DuplicateAttribute { element: String, attribute: String },

    #[error("Empty or adjacent text nodes in <{0}>")]
    UnmergedText(String),
}
