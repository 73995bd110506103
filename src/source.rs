//! MML source preparation before it reaches the bridge

use crate::error::{BridgeError, Result};

/// Collapse trailing whitespace to a single space and terminate with LF.
///
/// MGSC rejects a last line that is an empty header (`9\n<EOF>`) but accepts
/// `9 \n<EOF>`, so at least one space is kept whenever the source ended
/// in whitespace.
pub fn prepare_source(source: &str) -> String {
    let trimmed = source.trim_end();
    let mut prepared = String::with_capacity(trimmed.len() + 2);
    prepared.push_str(trimmed);
    if trimmed.len() < source.len() {
        prepared.push(' ');
    }
    prepared.push('\n');
    prepared
}

/// Reject sources longer than `max` bytes.
pub fn check_source_len(len: usize, max: usize) -> Result<()> {
    if len > max {
        log::warn!("rejecting MML source of {} bytes (limit {})", len, max);
        return Err(BridgeError::SourceTooLong { len, max });
    }
    Ok(())
}
