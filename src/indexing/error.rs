use crate::indexing::IndexState;
use std::io;
use thiserror::Error;

/// Errors surfaced by the index core.
#[derive(Debug, Error)]
pub enum IndexError {
    /// A record read from the occurrence stream did not decode to three
    /// well-formed fields. A truncated tail is corruption, never a normal
    /// end of stream.
    #[error("malformed occurrence record at byte {offset}: {detail}")]
    MalformedRecord { offset: u64, detail: String },

    /// The operation is not permitted in the index's current state.
    #[error("{op} is not permitted while the index is {state:?}")]
    InvalidState { op: &'static str, state: IndexState },

    /// The sorted occurrence stream outgrew the configured ceiling.
    #[error("occurrence stream is {size} bytes, exceeding the {limit} byte ceiling")]
    ResourceExhausted { size: u64, limit: u64 },

    /// Underlying storage failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, IndexError>;
