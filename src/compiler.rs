//! Narrow interface to the external MGSC compiler
//!
//! The bridge never looks inside the compiler. It relies on exactly two
//! capabilities: a console whose output is captured as log text, and a
//! compile call that turns a CRLF text stream into an MGS byte stream.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::io::{self, BufRead, Read, Write};
use std::rc::Rc;

/// Mode flag handed to the compiler on every compile call.
///
/// The value is opaque to the bridge; its meaning belongs to MGSC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompileMode(pub u32);

impl CompileMode {
    /// The mode the bridge has always compiled with.
    pub const DEFAULT: CompileMode = CompileMode(1);

    pub fn raw(self) -> u32 {
        self.0
    }
}

impl Default for CompileMode {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Console wiring for one compiler instance
pub struct Console {
    pub input: Box<dyn Read>,
    pub log: Box<dyn Write>,
}

impl Console {
    /// Console with an empty input and the given log sink.
    pub fn with_log<W: Write + 'static>(log: W) -> Self {
        Self {
            input: Box::new(io::empty()),
            log: Box::new(log),
        }
    }
}

/// An MML compiler instance, used for a single compile.
pub trait MmlCompiler {
    /// Route the compiler's console input and diagnostic output.
    fn set_console(&mut self, console: Console);

    /// Compile CRLF-terminated MML from `source`, writing MGS bytes to `output`.
    ///
    /// A rejected source is not an `Err`: the compiler reports it on the
    /// console and writes nothing. `Err` is reserved for stream failures.
    fn compile(
        &mut self,
        source: &mut dyn BufRead,
        output: &mut dyn Write,
        mode: CompileMode,
    ) -> io::Result<()>;
}

/// Creates a fresh compiler instance per bridge call.
pub trait CompilerFactory {
    type Compiler: MmlCompiler;

    fn create(&self) -> Self::Compiler;
}

impl<F, C> CompilerFactory for F
where
    F: Fn() -> C,
    C: MmlCompiler,
{
    type Compiler = C;

    fn create(&self) -> C {
        self()
    }
}

/// Log buffer that stays readable after the console owning a handle is dropped.
#[derive(Debug, Clone, Default)]
pub struct SharedLog {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl SharedLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the accumulated log bytes, leaving the buffer empty.
    pub fn take(&self) -> Vec<u8> {
        std::mem::take(&mut *self.buf.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.buf.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Write for SharedLog {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.borrow_mut().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
