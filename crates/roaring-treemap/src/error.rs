use thiserror::Error;

use crate::KeyOrder;

/// Errors raised by [`Bitmap64`](crate::Bitmap64) operations.
#[derive(Debug, Error)]
pub enum Error {
    /// `select` was asked for a position at or past the cardinality.
    #[error("select {index} when the cardinality is {cardinality}")]
    IndexOutOfRange { index: u64, cardinality: u64 },

    /// Internal bookkeeping disagrees with itself, e.g. a container was about
    /// to be created for a high key that already has one.
    #[error("invariant violated at high key {high:#010x}: {reason}")]
    InvariantViolation { high: u32, reason: &'static str },

    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Both sides of a union must order their high keys the same way.
    #[error("cannot merge a {other:?} bitmap into a {this:?} bitmap")]
    OrderMismatch { this: KeyOrder, other: KeyOrder },

    #[error("invalid key order flag: {0:#04x}")]
    InvalidOrderFlag(u8),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for 64-bit bitmap operations
pub type Result<T> = std::result::Result<T, Error>;
