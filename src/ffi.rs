//! C ABI for native embedders
//!
//! The embedder links MGSC itself and hands it to the bridge as a
//! [`MgscCompilerVTable`]. During a call the bridge passes two opaque sink
//! handles to the vtable's `compile` function: one for the MGS output and
//! one for the console log. The compiler writes into them with
//! [`mgsc_sink_write`]. Sinks are only valid for the duration of that
//! `compile` invocation.
//!
//! The bridge creates no global state. `ctx` is shared by every call made
//! with the same vtable, so an embedder calling from several threads must
//! make its `compile` reentrant or serialize the calls itself.

use std::ffi::{c_char, c_int, c_void, CStr};
use std::io::{self, BufRead, Read, Write};
use std::panic::{self, AssertUnwindSafe};
use std::slice;

use crate::bridge::Bridge;
use crate::compiler::{CompileMode, Console, MmlCompiler};
use crate::error::{BridgeError, MGSC_ERR_PANIC};

/// Compile entry point supplied by the embedder.
///
/// Returns 0 when the compile ran (whether or not MGSC accepted the
/// source); any other value is treated as a stream failure.
pub type MgscCompileFn = unsafe extern "C" fn(
    ctx: *mut c_void,
    source: *const u8,
    source_len: usize,
    mode: u32,
    output: *mut c_void,
    log: *mut c_void,
) -> c_int;

#[repr(C)]
pub struct MgscCompilerVTable {
    pub ctx: *mut c_void,
    pub compile: Option<MgscCompileFn>,
}

/// Writer behind an opaque sink handle
struct Sink<'a> {
    inner: &'a mut dyn Write,
    error: Option<io::Error>,
}

impl<'a> Sink<'a> {
    fn new(inner: &'a mut dyn Write) -> Self {
        Self { inner, error: None }
    }

    fn handle(&mut self) -> *mut c_void {
        self as *mut Sink<'a> as *mut c_void
    }
}

/// Append `len` bytes from `data` to a sink.
///
/// Returns 0 on success and -1 on a null sink or a failed write.
///
/// # Safety
///
/// `sink` must be a handle received by the current `compile` invocation and
/// `data` must point to `len` readable bytes (it may be null when `len` is 0).
#[no_mangle]
pub unsafe extern "C" fn mgsc_sink_write(sink: *mut c_void, data: *const u8, len: usize) -> c_int {
    if sink.is_null() || (data.is_null() && len > 0) {
        return -1;
    }
    let sink = &mut *(sink as *mut Sink<'_>);
    if len == 0 {
        return 0;
    }
    let bytes = slice::from_raw_parts(data, len);
    match sink.inner.write_all(bytes) {
        Ok(()) => 0,
        Err(e) => {
            if sink.error.is_none() {
                sink.error = Some(e);
            }
            -1
        }
    }
}

/// [`MmlCompiler`] backed by an embedder vtable
pub struct VTableCompiler<'v> {
    vtable: &'v MgscCompilerVTable,
    log: Option<Box<dyn Write>>,
}

impl<'v> VTableCompiler<'v> {
    pub fn new(vtable: &'v MgscCompilerVTable) -> Self {
        Self { vtable, log: None }
    }
}

impl MmlCompiler for VTableCompiler<'_> {
    fn set_console(&mut self, console: Console) {
        // MGSC never reads the console in this flow; only the log is wired.
        self.log = Some(console.log);
    }

    fn compile(
        &mut self,
        source: &mut dyn BufRead,
        output: &mut dyn Write,
        mode: CompileMode,
    ) -> io::Result<()> {
        let compile = self
            .vtable
            .compile
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "compiler vtable has no compile function"))?;

        let mut text = Vec::new();
        source.read_to_end(&mut text)?;

        let mut discard = io::sink();
        let log: &mut dyn Write = match self.log.as_mut() {
            Some(log) => &mut **log,
            None => &mut discard,
        };
        let mut out_sink = Sink::new(output);
        let mut log_sink = Sink::new(log);

        let status = unsafe {
            compile(
                self.vtable.ctx,
                text.as_ptr(),
                text.len(),
                mode.raw(),
                out_sink.handle(),
                log_sink.handle(),
            )
        };

        if let Some(e) = out_sink.error.take().or_else(|| log_sink.error.take()) {
            return Err(e);
        }
        if status != 0 {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("compiler returned status {}", status),
            ));
        }
        Ok(())
    }
}

/// Compile a null-terminated MML source with an embedder-supplied compiler.
///
/// The compiler log is copied into `mes` null-terminated; the MGS bytes are
/// copied into `mgs` raw. Returns the number of MGS bytes written (zero if
/// MGSC rejected the source), or a negative `MGSC_ERR_*` status. On error
/// `mgs` is not modified; `mes` is still null-terminated whenever
/// `mes_capacity` is at least 1, holding the log if it fit.
///
/// # Safety
///
/// `compiler` must point to a valid vtable, `mml` to a null-terminated
/// string, `mgs` to `mgs_capacity` writable bytes (may be null when the
/// capacity is 0) and `mes` to `mes_capacity` writable bytes.
#[no_mangle]
pub unsafe extern "C" fn mgsc_bridge_compile(
    compiler: *const MgscCompilerVTable,
    mml: *const c_char,
    mgs: *mut u8,
    mgs_capacity: usize,
    mes: *mut c_char,
    mes_capacity: usize,
) -> isize {
    guard_status(|| unsafe { bridge_compile(compiler, mml, mgs, mgs_capacity, mes, mes_capacity) })
}

/// Run a bridge call and map its outcome to a C status.
///
/// Panics are caught and reported as `MGSC_ERR_PANIC`; this needs the
/// unwinding panic strategy, which both Cargo profiles keep.
fn guard_status<F>(call: F) -> isize
where
    F: FnOnce() -> Result<usize, BridgeError>,
{
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(size)) => size as isize,
        Ok(Err(e)) => {
            log::warn!("mgsc_bridge_compile failed: {}", e);
            e.status_code()
        }
        Err(_) => {
            log::error!("panic in mgsc_bridge_compile");
            MGSC_ERR_PANIC
        }
    }
}

unsafe fn bridge_compile(
    compiler: *const MgscCompilerVTable,
    mml: *const c_char,
    mgs: *mut u8,
    mgs_capacity: usize,
    mes: *mut c_char,
    mes_capacity: usize,
) -> Result<usize, BridgeError> {
    let vtable = compiler.as_ref().ok_or(BridgeError::NullArgument("compiler"))?;
    if mml.is_null() {
        return Err(BridgeError::NullArgument("mml"));
    }
    if mes.is_null() {
        return Err(BridgeError::NullArgument("mes"));
    }
    if mgs.is_null() && mgs_capacity > 0 {
        return Err(BridgeError::NullArgument("mgs"));
    }

    let input = CStr::from_ptr(mml);
    let output: &mut [u8] = if mgs_capacity == 0 {
        &mut []
    } else {
        slice::from_raw_parts_mut(mgs, mgs_capacity)
    };
    let log = slice::from_raw_parts_mut(mes as *mut u8, mes_capacity);

    let bridge = Bridge::new(|| VTableCompiler::new(vtable));
    bridge.compile_into(input, output, log)
}

#[cfg(test)]
mod tests {
    use super::*;

    unsafe extern "C" fn write_twice(
        _ctx: *mut c_void,
        source: *const u8,
        source_len: usize,
        _mode: u32,
        output: *mut c_void,
        log: *mut c_void,
    ) -> c_int {
        mgsc_sink_write(output, source, source_len);
        mgsc_sink_write(output, source, source_len);
        mgsc_sink_write(log, b"done".as_ptr(), 4)
    }

    #[test]
    fn test_vtable_compiler_writes_through_sinks() {
        let vtable = MgscCompilerVTable {
            ctx: std::ptr::null_mut(),
            compile: Some(write_twice),
        };
        let log = crate::compiler::SharedLog::new();
        let mut compiler = VTableCompiler::new(&vtable);
        compiler.set_console(Console::with_log(log.clone()));

        let mut out = Vec::new();
        compiler
            .compile(&mut &b"c\r\n"[..], &mut out, CompileMode::DEFAULT)
            .unwrap();
        assert_eq!(out, b"c\r\nc\r\n");
        assert_eq!(log.take(), b"done");
    }

    #[test]
    fn test_missing_compile_function() {
        let vtable = MgscCompilerVTable {
            ctx: std::ptr::null_mut(),
            compile: None,
        };
        let mut compiler = VTableCompiler::new(&vtable);
        let err = compiler
            .compile(&mut &b""[..], &mut Vec::new(), CompileMode::DEFAULT)
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_guard_status_maps_outcomes() {
        assert_eq!(guard_status(|| Ok(12)), 12);
        assert_eq!(
            guard_status(|| Err(BridgeError::NullArgument("mml"))),
            crate::error::MGSC_ERR_NULL_ARGUMENT
        );
    }

    #[test]
    fn test_guard_status_catches_panic() {
        assert_eq!(guard_status(|| panic!("compiler blew up")), MGSC_ERR_PANIC);
    }

    #[test]
    fn test_sink_write_rejects_null() {
        unsafe {
            assert_eq!(mgsc_sink_write(std::ptr::null_mut(), b"x".as_ptr(), 1), -1);
        }
    }
}
