//! Structured view of an MGSC compile
//!
//! MGSC only talks through its console. The log it prints has a stable
//! shape: a banner block closed by a blank line, an optional track status
//! table ending in a `total :` line, and on failure an error message
//! followed by the offending source line:
//!
//! ```text
//! MGSC ver 1.xx ...
//! (c) ...
//!
//! track : ...
//! ...
//! total : ...
//! ```
//!
//! or
//!
//! ```text
//! Syntax error in 3
//! >> 9 v13@0o4cd?efg
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};

use crate::bridge::CompileOutput;

static BANNER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^((?:.*\n)+?)\s*\n").expect("banner pattern"));
static TRACK_INFO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:track :.*\n)+.*\ntotal :.*\n").expect("track info pattern"));
static ERROR_INFO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n(.*) in ([0-9]+)\n>> (.*)\n").expect("error info pattern"));

/// Compile error reported by MGSC
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    pub message: String,
    /// 1-based line number in the source
    pub line_number: usize,
    pub line_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileReport {
    /// Compiled MGS binary, empty if the compiler failed
    #[serde(serialize_with = "serialize_bytes")]
    pub mgs: Vec<u8>,
    /// True if and only if MGSC produced output
    pub success: bool,
    /// Compiler console output, CRs removed and leading whitespace trimmed
    pub raw_message: String,
    pub banner_text: String,
    /// Track status table, as printed by MGSC's `-T` option
    pub track_info_text: String,
    pub error_info: Option<ErrorInfo>,
}

impl CompileReport {
    pub fn from_output(output: &CompileOutput) -> Self {
        let message = clean_message(&output.log_text());

        Self {
            mgs: output.bytes.clone(),
            success: !output.bytes.is_empty(),
            banner_text: extract_banner(&message).unwrap_or_default(),
            track_info_text: extract_track_info(&message).unwrap_or_default(),
            error_info: extract_error_info(&message),
            raw_message: message,
        }
    }
}

pub(crate) fn serialize_bytes<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_bytes(bytes)
}

/// Drop carriage returns and leading whitespace from a raw compiler log.
pub fn clean_message(raw: &str) -> String {
    raw.trim_start().replace('\r', "")
}

/// Banner and copyright block: everything before the first blank line.
pub fn extract_banner(message: &str) -> Option<String> {
    BANNER
        .captures(message)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

pub fn extract_track_info(message: &str) -> Option<String> {
    TRACK_INFO.find(message).map(|m| m.as_str().to_string())
}

pub fn extract_error_info(message: &str) -> Option<ErrorInfo> {
    let caps = ERROR_INFO.captures(message)?;
    let line: usize = caps[2].parse().ok()?;
    Some(ErrorInfo {
        message: caps[1].to_string(),
        line_number: line + 1,
        line_text: caps[3].to_string(),
    })
}
