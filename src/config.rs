//! Runtime configuration for the compile bridge

use crate::compiler::CompileMode;
use serde::{Deserialize, Serialize};

/// Largest MML source the bridge accepts (bytes, after encoding).
pub const DEFAULT_MAX_SOURCE_BYTES: usize = 16384 * 3;
/// Size of the MGS buffer allocated by owned-buffer surfaces.
pub const DEFAULT_OUTPUT_CAPACITY: usize = 32768;
/// Size of the log buffer allocated by owned-buffer surfaces.
pub const DEFAULT_LOG_CAPACITY: usize = 32768;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BridgeConfig {
    /// Mode flag passed through to the compiler
    pub mode: CompileMode,
    pub max_source_bytes: usize,
    pub output_capacity: usize,
    pub log_capacity: usize,
    /// Hold a per-bridge lock for the whole compile call
    pub serialize_calls: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            mode: CompileMode::DEFAULT,
            max_source_bytes: DEFAULT_MAX_SOURCE_BYTES,
            output_capacity: DEFAULT_OUTPUT_CAPACITY,
            log_capacity: DEFAULT_LOG_CAPACITY,
            serialize_calls: false,
        }
    }
}

impl BridgeConfig {
    /// Parse a JSON config; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
