//! Error types for the compile bridge
//!
//! Compile failures inside MGSC are not errors here: they show up as an
//! empty MGS buffer plus diagnostics in the log. `BridgeError` only covers
//! what the bridge itself can detect.

use std::io;
use thiserror::Error;

/// Status code returned across the C boundary for a null pointer argument.
pub const MGSC_ERR_NULL_ARGUMENT: isize = -1;
/// Status code for compiled output that does not fit the caller's buffer.
pub const MGSC_ERR_OUTPUT_TOO_LARGE: isize = -2;
/// Status code for log text (plus terminator) that does not fit the caller's buffer.
pub const MGSC_ERR_LOG_TOO_LARGE: isize = -3;
/// Status code for a failed read or write on one of the compiler's streams.
pub const MGSC_ERR_STREAM: isize = -4;
/// Status code for MML source exceeding the configured size limit.
pub const MGSC_ERR_SOURCE_TOO_LONG: isize = -5;
/// Status code for a panic caught at the C boundary.
pub const MGSC_ERR_PANIC: isize = -6;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("null pointer passed for {0}")]
    NullArgument(&'static str),

    /// Compiled output is larger than the destination buffer
    #[error("compiled output too large: {needed} bytes, buffer holds {capacity}")]
    OutputTooLarge { needed: usize, capacity: usize },

    /// Log text plus its null terminator is larger than the destination buffer
    #[error("log text too large: {needed} bytes, buffer holds {capacity}")]
    LogTooLarge { needed: usize, capacity: usize },

    #[error("MML source is too long: {len} bytes, limit is {max}")]
    SourceTooLong { len: usize, max: usize },

    #[error("compiler stream error: {0}")]
    Stream(#[from] io::Error),
}

impl BridgeError {
    /// Negative status code used by `mgsc_bridge_compile`.
    pub fn status_code(&self) -> isize {
        match self {
            BridgeError::NullArgument(_) => MGSC_ERR_NULL_ARGUMENT,
            BridgeError::OutputTooLarge { .. } => MGSC_ERR_OUTPUT_TOO_LARGE,
            BridgeError::LogTooLarge { .. } => MGSC_ERR_LOG_TOO_LARGE,
            BridgeError::Stream(_) => MGSC_ERR_STREAM,
            BridgeError::SourceTooLong { .. } => MGSC_ERR_SOURCE_TOO_LONG,
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
