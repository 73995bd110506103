//! Line-ending normalization
//!
//! MGSC expects every source line to end in CRLF. Input may come with LF or
//! CRLF endings (or a mix); each line is re-emitted with an explicit CRLF.
//! Bytes are copied verbatim otherwise, so Shift_JIS text passes through.

use std::io::{self, BufRead};

const CRLF: &[u8] = b"\r\n";

/// Copy `reader` into `out` with every line terminated by CRLF.
///
/// Lines are split on LF; the LF and one preceding CR are stripped before
/// CRLF is appended. A final line without a terminator still gets one, and
/// empty input yields no output. Returns the number of lines written.
pub fn normalize_newlines<R: BufRead + ?Sized>(reader: &mut R, out: &mut Vec<u8>) -> io::Result<usize> {
    let mut line = Vec::new();
    let mut count = 0;

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        if line.last() == Some(&b'\n') {
            line.pop();
        }
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        out.extend_from_slice(&line);
        out.extend_from_slice(CRLF);
        count += 1;
    }

    log::debug!("normalized {} lines ({} bytes)", count, out.len());
    Ok(count)
}

/// Slice convenience over [`normalize_newlines`].
pub fn normalize_to_crlf(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len() + input.len() / 8 + 2);
    let mut reader = input;
    // Reading from a slice cannot fail.
    let _ = normalize_newlines(&mut reader, &mut out);
    out
}
