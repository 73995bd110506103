// C ABI tests
//
// The compiler here is an `extern "C"` function, the way a native embedder
// would link MGSC. `ctx` points at a call counter so the tests can see that
// the vtable context is passed through untouched.

use std::ffi::{c_char, c_int, c_void, CString};
use std::ptr;

use mgsc_wasm::error::{
    MGSC_ERR_LOG_TOO_LARGE, MGSC_ERR_NULL_ARGUMENT, MGSC_ERR_OUTPUT_TOO_LARGE, MGSC_ERR_STREAM,
};
use mgsc_wasm::ffi::{mgsc_bridge_compile, mgsc_sink_write, MgscCompilerVTable};

const SENTINEL: u8 = 0xee;

/// Emits "MGS" + source, logs "ok"; a '?' anywhere is a syntax error.
unsafe extern "C" fn fake_mgsc(
    ctx: *mut c_void,
    source: *const u8,
    source_len: usize,
    mode: u32,
    output: *mut c_void,
    log: *mut c_void,
) -> c_int {
    *(ctx as *mut u32) += 1;
    if mode != 1 {
        return 1;
    }
    let text = std::slice::from_raw_parts(source, source_len);
    if text.contains(&b'?') {
        let msg = b"\r\nSyntax error in 0\r\n>> ?\r\n";
        mgsc_sink_write(log, msg.as_ptr(), msg.len());
        return 0;
    }
    mgsc_sink_write(output, b"MGS".as_ptr(), 3);
    mgsc_sink_write(output, source, source_len);
    mgsc_sink_write(log, b"ok".as_ptr(), 2)
}

unsafe extern "C" fn failing_mgsc(
    _ctx: *mut c_void,
    _source: *const u8,
    _source_len: usize,
    _mode: u32,
    _output: *mut c_void,
    _log: *mut c_void,
) -> c_int {
    -7
}

fn vtable(counter: &mut u32) -> MgscCompilerVTable {
    MgscCompilerVTable {
        ctx: counter as *mut u32 as *mut c_void,
        compile: Some(fake_mgsc),
    }
}

fn compile(
    vtable: &MgscCompilerVTable,
    mml: &str,
    mgs: &mut [u8],
    mes: &mut [u8],
) -> isize {
    let mml = CString::new(mml).unwrap();
    unsafe {
        mgsc_bridge_compile(
            vtable,
            mml.as_ptr(),
            mgs.as_mut_ptr(),
            mgs.len(),
            mes.as_mut_ptr() as *mut c_char,
            mes.len(),
        )
    }
}

#[test]
fn test_compile_copies_output_and_log() {
    let mut calls = 0;
    let vt = vtable(&mut calls);
    let mut mgs = [SENTINEL; 64];
    let mut mes = [SENTINEL; 64];

    let size = compile(&vt, "A4\n", &mut mgs, &mut mes);

    assert_eq!(size, 7);
    assert_eq!(&mgs[..7], b"MGSA4\r\n");
    assert_eq!(mgs[7], SENTINEL);
    assert_eq!(&mes[..3], b"ok\0");
    assert_eq!(calls, 1);
}

#[test]
fn test_each_call_invokes_compiler_once() {
    let mut calls = 0;
    let vt = vtable(&mut calls);
    let mut mgs = [0u8; 64];
    let mut mes = [0u8; 64];

    compile(&vt, "9 c\n", &mut mgs, &mut mes);
    compile(&vt, "9 c\n", &mut mgs, &mut mes);

    assert_eq!(calls, 2);
}

#[test]
fn test_empty_source() {
    let mut calls = 0;
    let vt = vtable(&mut calls);
    let mut mgs = [SENTINEL; 8];
    let mut mes = [SENTINEL; 8];

    let size = compile(&vt, "", &mut mgs, &mut mes);

    // the fake writes its header even for an empty source
    assert_eq!(size, 3);
    assert_eq!(&mgs[..3], b"MGS");
}

#[test]
fn test_syntax_error_returns_zero() {
    let mut calls = 0;
    let vt = vtable(&mut calls);
    let mut mgs = [SENTINEL; 8];
    let mut mes = [SENTINEL; 64];

    let size = compile(&vt, "9 c?\n", &mut mgs, &mut mes);

    assert_eq!(size, 0);
    assert_eq!(mgs, [SENTINEL; 8]);
    let end = mes.iter().position(|&b| b == 0).unwrap();
    assert_eq!(&mes[..end], b"\r\nSyntax error in 0\r\n>> ?\r\n");
}

#[test]
fn test_output_too_large() {
    let mut calls = 0;
    let vt = vtable(&mut calls);
    let mut mgs = [SENTINEL; 4];
    let mut mes = [SENTINEL; 64];

    let status = compile(&vt, "9 cdefgab\n", &mut mgs, &mut mes);

    assert_eq!(status, MGSC_ERR_OUTPUT_TOO_LARGE);
    assert_eq!(mgs, [SENTINEL; 4]);
    assert_eq!(&mes[..3], b"ok\0");
    assert_eq!(mes[3], SENTINEL);
}

#[test]
fn test_log_too_large() {
    let mut calls = 0;
    let vt = vtable(&mut calls);
    let mut mgs = [SENTINEL; 64];
    // "ok" needs three bytes with its terminator
    let mut mes = [SENTINEL; 2];

    let status = compile(&vt, "9 c\n", &mut mgs, &mut mes);

    assert_eq!(status, MGSC_ERR_LOG_TOO_LARGE);
    assert!(mgs.iter().all(|&b| b == SENTINEL));
    assert_eq!(mes, [0, SENTINEL]);
}

#[test]
fn test_compiler_status_is_stream_error() {
    let vt = MgscCompilerVTable {
        ctx: ptr::null_mut(),
        compile: Some(failing_mgsc),
    };
    let mut mgs = [0u8; 8];
    let mut mes = [0u8; 8];

    assert_eq!(compile(&vt, "9 c\n", &mut mgs, &mut mes), MGSC_ERR_STREAM);
}

#[test]
fn test_null_arguments() {
    let mut calls = 0;
    let vt = vtable(&mut calls);
    let mml = CString::new("9 c\n").unwrap();
    let mut mgs = [0u8; 8];
    let mut mes = [0u8; 8];

    unsafe {
        let status = mgsc_bridge_compile(
            ptr::null(),
            mml.as_ptr(),
            mgs.as_mut_ptr(),
            mgs.len(),
            mes.as_mut_ptr() as *mut c_char,
            mes.len(),
        );
        assert_eq!(status, MGSC_ERR_NULL_ARGUMENT);

        let status = mgsc_bridge_compile(
            &vt,
            ptr::null(),
            mgs.as_mut_ptr(),
            mgs.len(),
            mes.as_mut_ptr() as *mut c_char,
            mes.len(),
        );
        assert_eq!(status, MGSC_ERR_NULL_ARGUMENT);

        let status = mgsc_bridge_compile(&vt, mml.as_ptr(), mgs.as_mut_ptr(), mgs.len(), ptr::null_mut(), 8);
        assert_eq!(status, MGSC_ERR_NULL_ARGUMENT);

        let status = mgsc_bridge_compile(
            &vt,
            mml.as_ptr(),
            ptr::null_mut(),
            8,
            mes.as_mut_ptr() as *mut c_char,
            mes.len(),
        );
        assert_eq!(status, MGSC_ERR_NULL_ARGUMENT);
    }
    assert_eq!(calls, 0);
}
