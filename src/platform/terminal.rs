//! Terminal abstraction consumed by the UI tick.
//!
//! The runtime never blocks on the terminal: input is pulled with
//! `read_available` on the UI timer, and resize arrives as a flag checked on
//! the same timer. `HeadlessTerminal` is the in-memory double used by tests.

use std::io;

pub trait Terminal {
    /// Enter raw mode, alternate screen, hidden cursor, bracketed paste.
    fn start(&mut self) -> io::Result<()>;

    /// Undo everything `start` did. Safe to call more than once.
    fn stop(&mut self) -> io::Result<()>;

    /// Non-blocking read of whatever input bytes are pending right now.
    /// Returns an empty string when nothing is buffered.
    fn read_available(&mut self) -> io::Result<String>;

    fn write(&mut self, data: &str);

    fn flush(&mut self);

    fn columns(&self) -> u16;

    fn rows(&self) -> u16;

    /// True once per delivered SIGWINCH; clears the flag.
    fn poll_resize(&mut self) -> bool;
}

/// Restores the terminal when dropped, panics and early returns included.
pub struct TerminalGuard<'a, T: Terminal> {
    terminal: &'a mut T,
}

impl<'a, T: Terminal> TerminalGuard<'a, T> {
    pub fn start(terminal: &'a mut T) -> io::Result<TerminalGuard<'a, T>> {
        terminal.start()?;
        Ok(TerminalGuard { terminal })
    }

    pub fn terminal(&mut self) -> &mut T {
        self.terminal
    }
}

impl<T: Terminal> Drop for TerminalGuard<'_, T> {
    fn drop(&mut self) {
        let _ = self.terminal.stop();
    }
}

/// In-memory terminal for tests: scripted input, captured output.
pub struct HeadlessTerminal {
    pub columns: u16,
    pub rows: u16,
    pub started: bool,
    pub resize_pending: bool,
    input: Vec<String>,
    pub output: String,
}

impl HeadlessTerminal {
    pub fn new(columns: u16, rows: u16) -> HeadlessTerminal {
        HeadlessTerminal {
            columns,
            rows,
            started: false,
            resize_pending: false,
            input: Vec::new(),
            output: String::new(),
        }
    }

    /// Queue bytes to be returned by the next `read_available` call.
    pub fn feed(&mut self, data: &str) {
        self.input.push(data.to_string());
    }

    pub fn resize(&mut self, columns: u16, rows: u16) {
        self.columns = columns;
        self.rows = rows;
        self.resize_pending = true;
    }

    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }
}

impl Terminal for HeadlessTerminal {
    fn start(&mut self) -> io::Result<()> {
        self.started = true;
        Ok(())
    }

    fn stop(&mut self) -> io::Result<()> {
        self.started = false;
        Ok(())
    }

    fn read_available(&mut self) -> io::Result<String> {
        if self.input.is_empty() {
            return Ok(String::new());
        }
        Ok(self.input.drain(..).collect())
    }

    fn write(&mut self, data: &str) {
        self.output.push_str(data);
    }

    fn flush(&mut self) {}

    fn columns(&self) -> u16 {
        self.columns
    }

    fn rows(&self) -> u16 {
        self.rows
    }

    fn poll_resize(&mut self) -> bool {
        std::mem::take(&mut self.resize_pending)
    }
}
