//! Compile operations for the WASM API
//!
//! The compiler is a JavaScript function with the signature
//! `(source: Uint8Array, mode: number) => { mgs?: Uint8Array, log?: string }`.
//! Each call to it is one fresh compile; the bridge never keeps state
//! between calls.

use std::io::{self, BufRead, Read, Write};

use js_sys::{Function, Reflect, Uint8Array};
use wasm_bindgen::prelude::*;

use crate::api::helpers::{deserialize, js_error, js_message, serialize};
use crate::api::types::RawCompileResult;
use crate::bridge::Bridge;
use crate::compiler::{CompileMode, CompilerFactory, Console, MmlCompiler};
use crate::config::BridgeConfig;
use crate::source::check_source_len;
use crate::{wasm_info, wasm_log, wasm_warn};

fn js_to_io(value: JsValue) -> io::Error {
    io::Error::new(io::ErrorKind::Other, js_message(&value))
}

/// [`MmlCompiler`] backed by a JavaScript function
pub struct JsCompiler {
    function: Function,
    log: Option<Box<dyn Write>>,
}

impl JsCompiler {
    pub fn new(function: Function) -> Self {
        Self { function, log: None }
    }
}

impl MmlCompiler for JsCompiler {
    fn set_console(&mut self, console: Console) {
        self.log = Some(console.log);
    }

    fn compile(
        &mut self,
        source: &mut dyn BufRead,
        output: &mut dyn Write,
        mode: CompileMode,
    ) -> io::Result<()> {
        let mut text = Vec::new();
        source.read_to_end(&mut text)?;

        let input = Uint8Array::from(text.as_slice());
        let result = self
            .function
            .call2(&JsValue::NULL, &input, &JsValue::from(mode.raw()))
            .map_err(js_to_io)?;

        let mgs = Reflect::get(&result, &JsValue::from_str("mgs")).map_err(js_to_io)?;
        if !mgs.is_undefined() && !mgs.is_null() {
            output.write_all(&Uint8Array::new(&mgs).to_vec())?;
        }

        let message = Reflect::get(&result, &JsValue::from_str("log"))
            .map_err(js_to_io)?
            .as_string()
            .unwrap_or_default();
        if let Some(log) = self.log.as_mut() {
            log.write_all(message.as_bytes())?;
        }
        Ok(())
    }
}

pub struct JsCompilerFactory {
    function: Function,
}

impl CompilerFactory for JsCompilerFactory {
    type Compiler = JsCompiler;

    fn create(&self) -> JsCompiler {
        JsCompiler::new(self.function.clone())
    }
}

/// MGSC bridge for JavaScript
#[wasm_bindgen]
pub struct MgscModule {
    bridge: Bridge<JsCompilerFactory>,
}

impl MgscModule {
    fn from_config(compiler: Function, config: BridgeConfig) -> MgscModule {
        MgscModule {
            bridge: Bridge::with_config(JsCompilerFactory { function: compiler }, config),
        }
    }
}

#[wasm_bindgen]
impl MgscModule {
    #[wasm_bindgen(constructor)]
    pub fn new(compiler: Function) -> MgscModule {
        Self::from_config(compiler, BridgeConfig::default())
    }

    /// Create a module with a partial `BridgeConfig` object (camelCase keys)
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(compiler: Function, config: JsValue) -> Result<MgscModule, JsValue> {
        let config: BridgeConfig = deserialize(config, "Invalid MGSC config")?;
        wasm_log!("MgscModule config: {:?}", config);
        Ok(Self::from_config(compiler, config))
    }

    /// Compile MML text and return a `CompileReport` object
    ///
    /// Trailing whitespace is collapsed before compiling, and the source is
    /// handed to the compiler as Shift_JIS.
    pub fn compile(&self, source: &str) -> Result<JsValue, JsValue> {
        wasm_info!("compile called with {} chars", source.len());

        let report = self
            .bridge
            .compile_report(source)
            .map_err(|e| js_error("MGSC compile failed", e))?;

        if report.success {
            wasm_info!("  MGS generated: {} bytes", report.mgs.len());
        } else {
            wasm_warn!("  compile produced no output");
        }
        serialize(&report, "Failed to serialize compile report")
    }

    /// Compile already-encoded MML bytes (e.g. Shift_JIS) as-is
    ///
    /// Returns `{ mgs: Uint8Array, log: string }`.
    #[wasm_bindgen(js_name = compileBytes)]
    pub fn compile_bytes(&self, mml: &[u8]) -> Result<JsValue, JsValue> {
        wasm_info!("compileBytes called with {} bytes", mml.len());

        let config = self.bridge.config();
        check_source_len(mml.len(), config.max_source_bytes)
            .map_err(|e| js_error("MGSC compile failed", e))?;

        let output = self
            .bridge
            .compile(mml)
            .map_err(|e| js_error("MGSC compile failed", e))?;
        output
            .check_capacity(config.output_capacity, config.log_capacity)
            .map_err(|e| js_error("MGSC compile failed", e))?;

        wasm_log!("  MGS: {} bytes, log: {} bytes", output.bytes.len(), output.log.len());
        serialize(&RawCompileResult::from(output), "Failed to serialize compile result")
    }
}
