//! Encoding helpers for the WASM API
//!
//! Detection and label mapping for callers that decode with their own
//! `TextDecoder`, plus [`decode_text`] for those that let the crate do it.

use wasm_bindgen::prelude::*;

use crate::api::helpers::js_error;
use crate::encoding::{self, parse_encoding_label};
use crate::wasm_log;

/// Detect the encoding of raw file bytes
///
/// Returns a TextDecoder label, `"ascii"`, `"binary"`, or `undefined`
/// when nothing matches.
#[wasm_bindgen(js_name = detectEncoding)]
pub fn detect_encoding(data: &[u8]) -> Option<String> {
    encoding::detect_encoding(data).map(|detected| detected.label().to_string())
}

/// Map a user-supplied encoding name to a TextDecoder label
///
/// Throws for `utf-16` without a byte order.
#[wasm_bindgen(js_name = toTextDecoderEncoding)]
pub fn to_text_decoder_encoding(label: &str) -> Result<Option<String>, JsValue> {
    parse_encoding_label(label)
        .map(|encoding| encoding.map(|e| e.label().to_string()))
        .map_err(|e| js_error("Invalid encoding", e))
}

/// Decode MML file bytes to a string
///
/// The encoding is detected when not given. Throws for binary input.
#[wasm_bindgen(js_name = decodeText)]
pub fn decode_text(data: &[u8], encoding: Option<String>) -> Result<String, JsValue> {
    let text = encoding::decode_text(data, encoding.as_deref())
        .map_err(|e| js_error("Cannot decode MML", e))?;
    wasm_log!("decoded {} bytes into {} chars", data.len(), text.chars().count());
    Ok(text)
}
