//! MGSC Compile Bridge
//!
//! Adapts the MGSC MML compiler (an MML compiler for the MGSDRV sound driver
//! on MSX) to foreign-function boundaries: a C ABI for native embedders and
//! a wasm-bindgen API for JavaScript. The compiler itself is supplied by the
//! embedder through the [`MmlCompiler`] interface; this crate normalizes
//! the source, drives one fresh compiler per call and copies the MGS bytes
//! and log text out under explicit capacity checks.

pub mod api;
pub mod bridge;
pub mod compiler;
pub mod config;
pub mod encoding;
pub mod error;
pub mod ffi;
pub mod normalize;
pub mod report;
pub mod source;

// Re-export commonly used types
pub use bridge::{Bridge, CompileOutput};
pub use compiler::{CompileMode, CompilerFactory, Console, MmlCompiler, SharedLog};
pub use config::BridgeConfig;
pub use error::{BridgeError, Result};
pub use report::{CompileReport, ErrorInfo};

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    #[cfg(feature = "console_log")]
    let _ = console_log::init_with_level(log::Level::Debug);

    log::info!("MGSC bridge WASM module initialized");
}
