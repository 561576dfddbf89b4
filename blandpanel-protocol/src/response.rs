//! Response formatting
//!
//! Every reply is a single line. [`Response`] renders the line body through
//! `Display`; the transport appends [`RESPONSE_TERMINATOR`].

use core::fmt::{self, Write};

use heapless::String;

use blandpanel_core::state::ShutterPosition;

use crate::command::CommandError;

/// Line terminator appended to every response
pub const RESPONSE_TERMINATOR: &str = "\r\n";

/// Capacity of an encoded response, terminator included
pub const MAX_RESPONSE_LEN: usize = 160;

/// Hint sent for unrecognized shorthand commands
pub const USAGE: &str = "Useful Commands: STATUS, STATE [open|closed], ON [0-1], BRIGHT [0-1], OFF, OPEN, CLOSE, ANGLE [0-270]";

/// A single response line
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Response<'a> {
    /// Command succeeded
    Ok,
    /// Motion completed but the shutter did not reach its target
    Fail,
    /// Emergency stop acknowledged
    Estopped,
    /// `STATUS` report
    Status {
        position: ShutterPosition,
        brightness: f32,
        enabled: bool,
    },
    /// Stored brightness
    Brightness(f32),
    /// Classified shutter position
    Position(ShutterPosition),
    /// Measured shutter angle in degrees
    Angle(f32),
    /// `COMMAND:PING` reply
    Pong { guid: &'a str },
    /// `COMMAND:INFO` reply
    Info { name: &'a str },
    /// `COMMAND:CALIBRATOR:GETBRIGHTNESS` reply
    CalibratorBrightness(f32),
    /// Unknown structured command
    InvalidCommand,
    /// Unknown shorthand command
    Usage,
    /// Service loop is ending
    Goodbye,
    /// Command failed
    Fault(CommandError),
}

impl Response<'_> {
    /// Render the full wire line, terminator included
    pub fn encode(&self) -> Result<String<MAX_RESPONSE_LEN>, fmt::Error> {
        let mut line = String::new();
        write!(line, "{}{}", self, RESPONSE_TERMINATOR)?;
        Ok(line)
    }
}

impl fmt::Display for Response<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Ok => f.write_str("OK"),
            Response::Fail => f.write_str("FAIL"),
            Response::Estopped => f.write_str("ESTOP: ALLCLEAR REQUIRED TO RESUME MOTION"),
            Response::Status {
                position,
                brightness,
                enabled,
            } => write!(
                f,
                "OK STATE: {} BRIGHTNESS: {:.2} ENABLED: {}",
                position,
                brightness,
                if *enabled { "TRUE" } else { "FALSE" }
            ),
            Response::Brightness(value) => write!(f, "{:.2}", value),
            Response::Position(position) => write!(f, "{}", position),
            Response::Angle(angle) => write!(f, "{}", angle),
            Response::Pong { guid } => write!(f, "RESULT:PING:OK:{}", guid),
            Response::Info { name } => write!(f, "RESULT:INFO:{}", name),
            Response::CalibratorBrightness(value) => {
                write!(f, "RESULT:CALIBRATOR:BRIGHTNESS:{:.2}", value)
            }
            Response::InvalidCommand => f.write_str("ERROR:INVALID_COMMAND"),
            Response::Usage => f.write_str(USAGE),
            Response::Goodbye => f.write_str("GOODBYE"),
            Response::Fault(e) => write!(f, "FAULT: {}", e),
        }
    }
}
