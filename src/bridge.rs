//! Compile bridge
//!
//! Turns one MML source buffer into one MGS buffer plus the compiler's log
//! text. Every call builds a fresh compiler from the factory, wires its
//! console to a private log buffer, compiles the CRLF-normalized source and
//! drops the compiler before returning. Nothing survives between calls.
//!
//! Copies into caller buffers are capacity-checked up front. When the MGS
//! bytes do not fit the output buffer is left untouched; the log buffer is
//! null-terminated after every call, holding the full log when it fits and
//! an empty string otherwise.

use std::borrow::Cow;
use std::ffi::CStr;
use std::sync::{Mutex, PoisonError};

use crate::compiler::{CompilerFactory, Console, MmlCompiler, SharedLog};
use crate::config::BridgeConfig;
use crate::encoding::encode_shift_jis;
use crate::error::{BridgeError, Result};
use crate::normalize::normalize_newlines;
use crate::report::CompileReport;
use crate::source::{check_source_len, prepare_source};

/// Owned result of one compile call
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompileOutput {
    /// Compiled MGS bytes; empty when the compiler rejected the source
    pub bytes: Vec<u8>,
    /// Raw console output of the compiler
    pub log: Vec<u8>,
}

impl CompileOutput {
    pub fn byte_count(&self) -> usize {
        self.bytes.len()
    }

    pub fn log_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.log)
    }

    /// Fail unless the output fits `output_capacity` bytes and the log plus
    /// a null terminator fits `log_capacity` bytes.
    pub fn check_capacity(&self, output_capacity: usize, log_capacity: usize) -> Result<()> {
        if self.bytes.len() > output_capacity {
            return Err(BridgeError::OutputTooLarge {
                needed: self.bytes.len(),
                capacity: output_capacity,
            });
        }
        let log_needed = self.log.len() + 1;
        if log_needed > log_capacity {
            return Err(BridgeError::LogTooLarge {
                needed: log_needed,
                capacity: log_capacity,
            });
        }
        Ok(())
    }

    /// Copy the log (null-terminated) and the MGS bytes (raw) into caller
    /// buffers. Returns the number of MGS bytes written.
    ///
    /// On a capacity error the output buffer is not written, but a
    /// non-empty log buffer still ends up null-terminated.
    pub fn copy_into(&self, output: &mut [u8], log: &mut [u8]) -> Result<usize> {
        let checked = self.check_capacity(output.len(), log.len());

        if self.log.len() < log.len() {
            log[..self.log.len()].copy_from_slice(&self.log);
            log[self.log.len()] = 0;
        } else if let Some(first) = log.first_mut() {
            *first = 0;
        }
        checked?;

        let size = self.bytes.len();
        if size > 0 {
            output[..size].copy_from_slice(&self.bytes);
        }
        Ok(size)
    }
}

/// Compile bridge over a compiler factory
pub struct Bridge<F> {
    factory: F,
    config: BridgeConfig,
    lock: Mutex<()>,
}

impl<F: CompilerFactory> Bridge<F> {
    pub fn new(factory: F) -> Self {
        Self::with_config(factory, BridgeConfig::default())
    }

    pub fn with_config(factory: F, config: BridgeConfig) -> Self {
        Self {
            factory,
            config,
            lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Compile `source` into owned buffers.
    ///
    /// A compile failure is reported the way MGSC reports it: empty
    /// `bytes` and a diagnostic in `log`. Only stream failures are `Err`.
    pub fn compile(&self, source: &[u8]) -> Result<CompileOutput> {
        let _guard = if self.config.serialize_calls {
            Some(self.lock.lock().unwrap_or_else(PoisonError::into_inner))
        } else {
            None
        };

        let mut input = source;
        let mut normalized = Vec::with_capacity(source.len() + source.len() / 8 + 2);
        let lines = normalize_newlines(&mut input, &mut normalized)?;

        let log = SharedLog::new();
        let mut compiler = self.factory.create();
        compiler.set_console(Console::with_log(log.clone()));

        let mut bytes = Vec::new();
        let result = compiler.compile(&mut normalized.as_slice(), &mut bytes, self.config.mode);
        drop(compiler);

        if let Err(e) = result {
            log::warn!("compiler stream failure: {}", e);
            return Err(BridgeError::Stream(e));
        }

        let output = CompileOutput {
            bytes,
            log: log.take(),
        };
        log::debug!(
            "compiled {} lines into {} bytes ({} bytes of log)",
            lines,
            output.bytes.len(),
            output.log.len()
        );
        Ok(output)
    }

    /// Compile a null-terminated source into caller-owned buffers.
    ///
    /// The log is written null-terminated; the MGS bytes are written raw.
    /// Returns the number of MGS bytes written, which is zero when the
    /// compiler produced nothing.
    pub fn compile_into(&self, input: &CStr, output: &mut [u8], log: &mut [u8]) -> Result<usize> {
        let compiled = self.compile(input.to_bytes())?;
        compiled.copy_into(output, log)
    }

    /// Prepare, size-check, compile and parse the log of an MML text.
    ///
    /// The text is encoded as Shift_JIS before the size check, so the limit
    /// counts the bytes MGSC actually reads.
    pub fn compile_report(&self, source: &str) -> Result<CompileReport> {
        let prepared = prepare_source(source);
        let encoded = encode_shift_jis(&prepared);
        check_source_len(encoded.len(), self.config.max_source_bytes)?;

        let output = self.compile(&encoded)?;
        output.check_capacity(self.config.output_capacity, self.config.log_capacity)?;

        let report = CompileReport::from_output(&output);
        if report.success {
            log::info!("MML compiled: {} bytes", report.mgs.len());
        } else {
            log::info!("MML rejected by compiler");
        }
        Ok(report)
    }
}
