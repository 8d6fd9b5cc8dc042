//! Error types for the tag-tree editing model.

use thiserror::Error;

/// Binary codec errors
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Unexpected end of input: needed {needed} bytes at offset {offset}")]
    UnexpectedEof { needed: usize, offset: usize },

    #[error("Unknown tag type id: {0}")]
    UnknownTagType(u8),

    #[error("Invalid UTF-8 in string payload at offset {0}")]
    InvalidUtf8(usize),

    #[error("Negative length {0} in payload")]
    NegativeLength(i32),

    #[error("String of {0} bytes exceeds the 65535 byte limit")]
    StringTooLong(usize),

    #[error("Length {0} exceeds the signed 32-bit limit")]
    LengthTooLarge(usize),

    #[error("Compound holds the key '{0}' more than once")]
    DuplicateKey(String),

    #[error("Nesting exceeds the maximum depth of {0}")]
    TooDeep(usize),

    #[error("List declares element type {declared} but holds a {found}")]
    ListElementMismatch {
        declared: &'static str,
        found: &'static str,
    },
}

/// Storage backend errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Document root of {0} is not a compound")]
    RootNotCompound(String),

    #[error("Chunk not found: {0}")]
    ChunkNotFound(String),
}

impl From<sled::Error> for StorageError {
    fn from(err: sled::Error) -> Self {
        StorageError::Database(err.to_string())
    }
}

/// Editing errors. Every mutating tree operation reports one of these instead of
/// panicking; a failed operation never leaves a partial change behind.
#[derive(Debug, Error)]
pub enum EditError {
    /// Replacement text does not fit the target type's grammar or range.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Create/paste violates a container's kind constraint, or a compound name collides.
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    /// The node's capability predicate refuses the operation.
    #[error("Capability denied: {0}")]
    CapabilityDenied(String),

    /// Missing clipboard data, node, or path segment.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Errors surfaced by the CLI and configuration layers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Edit(#[from] EditError),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<CodecError> for EditError {
    fn from(err: CodecError) -> Self {
        EditError::ParseError(err.to_string())
    }
}
