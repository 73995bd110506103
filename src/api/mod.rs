//! MGSC WASM API
//!
//! JavaScript-facing surface of the bridge. The MGSC compiler itself is
//! supplied from JavaScript as a function; this layer normalizes the source,
//! drives the compiler through the bridge and hands back structured results.
//!
//! # Module Structure
//!
//! - `helpers`: console logging, serialization, error conversion
//! - `types`: result shapes returned to JavaScript
//! - `compile`: `MgscModule` and the JS-backed compiler
//! - `encoding`: encoding detection, label parsing and decoding

pub mod helpers;
pub mod types;
pub mod compile;
pub mod encoding;

pub use compile::{JsCompiler, JsCompilerFactory, MgscModule};
pub use encoding::{decode_text, detect_encoding, to_text_decoder_encoding};
