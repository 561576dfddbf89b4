//! BLandPanel Serial Command Protocol
//!
//! This crate defines the text protocol spoken between the host computer
//! and the panel controller, and the interpreter that maps it onto the
//! device controller.
//!
//! # Protocol Overview
//!
//! One command per line, one response per line:
//! ```text
//! host  → BRIGHT 0.5\n
//! panel ← OK\r\n
//! host  → COMMAND:PING\n
//! panel ← RESULT:PING:OK:<guid>\r\n
//! ```
//!
//! Two command families share the channel with no mode switch:
//! - Shorthand: whitespace-separated verbs for interactive use
//!   (`STATUS`, `ON 0.5`, `OPEN`, `ANGLE 90`, `ESTOP`, ...)
//! - Structured: colon-separated `COMMAND:` lines compatible with the
//!   INDI flat-panel driver (`COMMAND:CALIBRATOR:ON:0.3`, ...)
//!
//! Input is case-insensitive. Lines shorter than two characters are
//! ignored without a response.
//!
//! The [`client`] module is the host side: it builds the command sequences
//! the INDI light box driver sends and checks each reply.

#![no_std]
#![deny(unsafe_code)]

pub mod client;
pub mod command;
pub mod interpreter;
pub mod line;
pub mod response;

pub use client::{ClientError, LightBox, Link, Reply};
pub use command::{Command, CommandError, Token, MAX_LINE_LEN};
pub use interpreter::{ExitKind, Interpreter, Outcome};
pub use line::{LineBuffer, LineError};
pub use response::{Response, MAX_RESPONSE_LEN, RESPONSE_TERMINATOR};
