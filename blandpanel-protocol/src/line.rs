//! Line assembly for the serial command channel
//!
//! Bytes arrive in arbitrary chunks. The [`LineBuffer`] collects them until
//! a newline and hands back the completed line. Carriage returns are
//! dropped so both `\n` and `\r\n` hosts work.

use heapless::Vec;

use crate::command::MAX_LINE_LEN;

/// Errors that can occur while assembling a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError {
    /// Line exceeded [`MAX_LINE_LEN`]; the whole line was discarded
    Overflow,
    /// Line was not valid UTF-8
    InvalidUtf8,
}

impl core::fmt::Display for LineError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LineError::Overflow => f.write_str("Line too long"),
            LineError::InvalidUtf8 => f.write_str("Line is not valid text"),
        }
    }
}

/// Accumulator turning a byte stream into lines
#[derive(Debug, Clone)]
pub struct LineBuffer {
    buffer: Vec<u8, MAX_LINE_LEN>,
    /// Bytes were dropped from the current line
    overflowed: bool,
    /// The buffer holds a line already handed out
    complete: bool,
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl LineBuffer {
    /// Create an empty line buffer
    pub const fn new() -> Self {
        Self {
            buffer: Vec::new(),
            overflowed: false,
            complete: false,
        }
    }

    /// Discard any partial line
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.overflowed = false;
        self.complete = false;
    }

    /// Feed a single byte
    ///
    /// Returns `Ok(Some(line))` when a newline completes a line,
    /// `Ok(None)` when more bytes are needed, or `Err` if the finished
    /// line had to be discarded.
    pub fn feed(&mut self, byte: u8) -> Result<Option<&str>, LineError> {
        if self.complete {
            self.reset();
        }

        match byte {
            b'\n' => {
                if self.overflowed {
                    self.reset();
                    return Err(LineError::Overflow);
                }
                self.complete = true;
                match core::str::from_utf8(&self.buffer) {
                    Ok(line) => Ok(Some(line)),
                    Err(_) => Err(LineError::InvalidUtf8),
                }
            }
            b'\r' => Ok(None),
            _ => {
                if self.buffer.push(byte).is_err() {
                    self.overflowed = true;
                }
                Ok(None)
            }
        }
    }
}
