// Deterministic stand-in for MGSC used by the integration tests.
//
// Output format: b"MGS" followed by each source line as <len byte><bytes>.
// A line containing '?' is a syntax error: nothing is written and the log
// gets an MGSC-style diagnostic. Lines must arrive CRLF-terminated.

#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, BufRead, Read, Write};
use std::rc::Rc;

use mgsc_wasm::{CompileMode, Console, MmlCompiler};

pub const BANNER: &str = "MGSC mock 1.0\r\nfor tests\r\n\r\n";

#[derive(Default)]
pub struct MockMgsc {
    log: Option<Box<dyn Write>>,
}

pub fn mock() -> MockMgsc {
    MockMgsc::default()
}

impl MmlCompiler for MockMgsc {
    fn set_console(&mut self, console: Console) {
        self.log = Some(console.log);
    }

    fn compile(
        &mut self,
        source: &mut dyn BufRead,
        output: &mut dyn Write,
        _mode: CompileMode,
    ) -> io::Result<()> {
        let mut log: Box<dyn Write> = self.log.take().unwrap_or_else(|| Box::new(io::sink()));
        log.write_all(BANNER.as_bytes())?;

        let mut lines = Vec::new();
        let mut line = Vec::new();
        while source.read_until(b'\n', &mut line)? > 0 {
            if !line.ends_with(b"\r\n") {
                write!(log, "\r\nCRLF expected in {}\r\n>> {}\r\n", lines.len(), String::from_utf8_lossy(&line))?;
                return Ok(());
            }
            line.truncate(line.len() - 2);
            lines.push(std::mem::take(&mut line));
        }

        for (i, text) in lines.iter().enumerate() {
            if text.contains(&b'?') {
                write!(log, "\r\nSyntax error in {}\r\n>> {}\r\n", i, String::from_utf8_lossy(text))?;
                return Ok(());
            }
        }

        if lines.is_empty() {
            return Ok(());
        }

        let mut mgs = b"MGS".to_vec();
        for text in &lines {
            mgs.push(text.len() as u8);
            mgs.extend_from_slice(text);
        }

        let tracks: Vec<&Vec<u8>> = lines
            .iter()
            .filter(|l| l.first().map_or(false, |b| b.is_ascii_digit()))
            .collect();
        if !tracks.is_empty() {
            for track in &tracks {
                write!(log, "track : {}  len={}\r\n", track[0] as char, track.len())?;
            }
            write!(log, "----\r\ntotal : {}\r\n", mgs.len())?;
        }

        output.write_all(&mgs)
    }
}

/// Records the exact source bytes each instance receives.
#[derive(Clone, Default)]
pub struct Recorder {
    pub seen: Rc<RefCell<Vec<Vec<u8>>>>,
}

impl MmlCompiler for Recorder {
    fn set_console(&mut self, _console: Console) {}

    fn compile(
        &mut self,
        source: &mut dyn BufRead,
        _output: &mut dyn Write,
        _mode: CompileMode,
    ) -> io::Result<()> {
        let mut text = Vec::new();
        source.read_to_end(&mut text)?;
        self.seen.borrow_mut().push(text);
        Ok(())
    }
}
