//! Error types for ImgFS
//!
//! Provides a unified error type for all operations. Messages are written
//! so they can be surfaced verbatim on stderr or in HTTP error bodies.

use thiserror::Error;

/// Result type alias using ImgFsError
pub type Result<T> = std::result::Result<T, ImgFsError>;

/// Unified error type for ImgFS operations
#[derive(Debug, Error)]
pub enum ImgFsError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Argument Errors
    // -------------------------------------------------------------------------
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("not enough arguments")]
    NotEnoughArguments,

    #[error("invalid command")]
    InvalidCommand,

    #[error("invalid image ID: {0}")]
    InvalidImgId(String),

    #[error("invalid max_files number: {0}")]
    MaxFiles(u32),

    #[error("invalid resolution: {0}")]
    Resolutions(String),

    // -------------------------------------------------------------------------
    // Container State Errors
    // -------------------------------------------------------------------------
    #[error("imgFS is full")]
    Full,

    #[error("image not found: {0}")]
    ImageNotFound(String),

    #[error("duplicate image ID: {0}")]
    DuplicateId(String),

    // -------------------------------------------------------------------------
    // Environment Errors
    // -------------------------------------------------------------------------
    #[error("image library error: {0}")]
    ImageLib(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}
