use std::{borrow::Cow, io::Write};

use crate::{
    interpreter::Interpreter,
    types::{Host, Opcode},
};

/// Hook into the dispatch loop, called around every executed instruction.
///
/// Observation must not change execution: observers get a shared view of
/// the frame and the interpreter ignores anything they do.
pub trait Observer<H: Host> {
    fn pre_op(&mut self, interpreter: &Interpreter<H>);

    fn post_op(&mut self, interpreter: &Interpreter<H>);

    fn log(&mut self, message: Cow<str>);
}

/// The default observer. All hooks compile to nothing.
pub struct NoOpObserver();

impl<H: Host> Observer<H> for NoOpObserver {
    fn pre_op(&mut self, _interpreter: &Interpreter<H>) {}

    fn post_op(&mut self, _interpreter: &Interpreter<H>) {}

    fn log(&mut self, _message: Cow<str>) {}
}

/// Writes one line per instruction: opcode, gas left, and the top of the
/// stack.
pub struct LoggingObserver<W: Write> {
    writer: W,
}

impl<W: Write> LoggingObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write, H: Host> Observer<H> for LoggingObserver<W> {
    fn pre_op(&mut self, interpreter: &Interpreter<H>) {
        // pre_op runs after the fetch, so there is a byte at the counter
        let byte = interpreter.code_reader.get().unwrap_or_default();
        let gas = interpreter.gas_left.as_u64();
        let top = interpreter
            .stack
            .peek()
            .map(ToString::to_string)
            .unwrap_or("-empty-".to_owned());
        match Opcode::from_byte(byte) {
            Some(op) => writeln!(self.writer, "{op:?}, {gas}, {top}").unwrap(),
            None => writeln!(self.writer, "{byte:#04x}, {gas}, {top}").unwrap(),
        }
        self.writer.flush().unwrap();
    }

    fn post_op(&mut self, _interpreter: &Interpreter<H>) {}

    fn log(&mut self, message: Cow<str>) {
        writeln!(self.writer, "{message}").unwrap();
        self.writer.flush().unwrap();
    }
}
