//! Shared types for the WASM API

use serde::Serialize;

use crate::bridge::CompileOutput;
use crate::report::serialize_bytes;

/// Unparsed result of `compileBytes`
#[derive(Serialize, Clone, Debug)]
pub struct RawCompileResult {
    #[serde(serialize_with = "serialize_bytes")]
    pub mgs: Vec<u8>,
    pub log: String,
}

impl From<CompileOutput> for RawCompileResult {
    fn from(output: CompileOutput) -> Self {
        let log = output.log_text().into_owned();
        Self {
            mgs: output.bytes,
            log,
        }
    }
}
