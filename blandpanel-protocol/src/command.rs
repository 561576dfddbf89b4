//! Command parsing
//!
//! Turns one line of input into a [`Command`]. Input is trimmed and
//! upper-cased first, so every comparison below is against upper case.
//!
//! Shorthand commands are whitespace-separated and matched on their first
//! word. Structured commands start with `COMMAND:` and are colon-separated.

use core::fmt;

use heapless::String;

use blandpanel_core::controller::ControllerError;
use blandpanel_core::state::TargetState;

use crate::line::LineError;

/// Maximum accepted line length in bytes, excluding the terminator
pub const MAX_LINE_LEN: usize = 80;

/// Maximum length of an offending token echoed back in a fault
pub const MAX_TOKEN_LEN: usize = 16;

/// Offending input echoed back in a fault message
pub type Token = String<MAX_TOKEN_LEN>;

/// Prefix of the structured command family
pub const STRUCTURED_PREFIX: &str = "COMMAND:";

/// Errors raised while parsing or executing a command
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Numeric argument did not parse
    InvalidNumber(Token),
    /// Shutter target was not `OPEN[ED]` or `CLOSE[D]`
    InvalidState(Token),
    /// Device controller rejected the operation
    Controller(ControllerError),
    /// Line could not be assembled
    Line(LineError),
}

impl From<ControllerError> for CommandError {
    fn from(e: ControllerError) -> Self {
        CommandError::Controller(e)
    }
}

impl From<LineError> for CommandError {
    fn from(e: LineError) -> Self {
        CommandError::Line(e)
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::InvalidNumber(token) => write!(f, "Invalid number {}", token),
            CommandError::InvalidState(token) => write!(f, "Invalid state {}", token),
            CommandError::Controller(e) => write!(f, "{}", e),
            CommandError::Line(e) => write!(f, "{}", e),
        }
    }
}

/// A parsed command line
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    // Shorthand family
    /// Latch the emergency stop
    Estop,
    /// Clear the emergency stop
    AllClear,
    /// Report shutter, brightness and enable state
    Status,
    /// Optionally set brightness, then switch the panel on
    On(Option<f32>),
    /// Switch the panel off
    Off,
    /// Set brightness, or query it when no value is given
    Bright(Option<f32>),
    /// Open the shutter and verify
    Open,
    /// Close the shutter and verify
    Close,
    /// Drive to a target and verify, or query the position
    State(Option<TargetState>),
    /// Move to an angle and verify, or query the angle
    Angle(Option<f32>),
    /// Leave the command loop
    Repl,
    /// Leave the command loop and restart the device
    Reset,
    /// Unrecognized shorthand; answered with a usage hint
    Help,

    // Structured family
    /// `COMMAND:PING`
    Ping,
    /// `COMMAND:INFO`
    Info,
    /// `COMMAND:CALIBRATOR:GETBRIGHTNESS`
    GetBrightness,
    /// `COMMAND:CALIBRATOR:BRIGHTNESS:<v>`
    SetBrightness(f32),
    /// `COMMAND:CALIBRATOR:ON[:<v>]`
    CalibratorOn(Option<f32>),
    /// `COMMAND:CALIBRATOR:OFF`
    CalibratorOff,
    /// Unrecognized `COMMAND:` line
    InvalidStructured,
}

impl Command {
    /// Parse one line of input
    ///
    /// Returns `Ok(None)` for lines shorter than two characters after
    /// trimming; those are ignored without a response.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        if line.chars().count() < 2 {
            return Ok(None);
        }
        if line.len() > MAX_LINE_LEN {
            return Err(CommandError::Line(LineError::Overflow));
        }

        let mut upper: String<MAX_LINE_LEN> = String::new();
        for c in line.chars() {
            upper
                .push(c.to_ascii_uppercase())
                .map_err(|_| CommandError::Line(LineError::Overflow))?;
        }

        let command = match upper.strip_prefix(STRUCTURED_PREFIX) {
            Some(rest) => Self::parse_structured(rest)?,
            None => Self::parse_shorthand(&upper)?,
        };
        Ok(Some(command))
    }

    fn parse_shorthand(line: &str) -> Result<Self, CommandError> {
        let mut fields = line.split_whitespace();
        let verb = fields.next().unwrap_or("");
        let arg = fields.next();

        let command = match verb {
            "ESTOP" => Command::Estop,
            "ALLCLEAR" => Command::AllClear,
            "STATUS" => Command::Status,
            "ON" => Command::On(arg.map(parse_number).transpose()?),
            "OFF" => Command::Off,
            "BRIGHT" | "BRIGHTNESS" => Command::Bright(arg.map(parse_number).transpose()?),
            "OPEN" => Command::Open,
            "CLOSE" => Command::Close,
            "STATE" => Command::State(arg.map(parse_target).transpose()?),
            "ANGLE" => Command::Angle(arg.map(parse_number).transpose()?),
            "REPL" => Command::Repl,
            "RESET" => Command::Reset,
            _ => Command::Help,
        };
        Ok(command)
    }

    fn parse_structured(rest: &str) -> Result<Self, CommandError> {
        let mut parts = rest.split(':');

        let command = match (parts.next(), parts.next()) {
            (Some("PING"), None) => Command::Ping,
            (Some("INFO"), None) => Command::Info,
            (Some("CALIBRATOR"), Some(sub)) => match (sub, parts.next()) {
                ("GETBRIGHTNESS", None) => Command::GetBrightness,
                ("BRIGHTNESS", Some(value)) => Command::SetBrightness(parse_number(value)?),
                ("ON", value) => Command::CalibratorOn(value.map(parse_number).transpose()?),
                ("OFF", None) => Command::CalibratorOff,
                _ => Command::InvalidStructured,
            },
            _ => Command::InvalidStructured,
        };
        Ok(command)
    }
}

/// Canonical line for a command, as a host driver would send it
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Estop => f.write_str("ESTOP"),
            Command::AllClear => f.write_str("ALLCLEAR"),
            Command::Status => f.write_str("STATUS"),
            Command::On(None) => f.write_str("ON"),
            Command::On(Some(v)) => write!(f, "ON {}", v),
            Command::Off => f.write_str("OFF"),
            Command::Bright(None) => f.write_str("BRIGHT"),
            Command::Bright(Some(v)) => write!(f, "BRIGHT {}", v),
            Command::Open => f.write_str("OPEN"),
            Command::Close => f.write_str("CLOSE"),
            Command::State(None) => f.write_str("STATE"),
            Command::State(Some(target)) => write!(f, "STATE {}", target),
            Command::Angle(None) => f.write_str("ANGLE"),
            Command::Angle(Some(v)) => write!(f, "ANGLE {}", v),
            Command::Repl => f.write_str("REPL"),
            Command::Reset => f.write_str("RESET"),
            Command::Help => f.write_str("HELP"),
            Command::Ping => write!(f, "{}PING", STRUCTURED_PREFIX),
            Command::Info => write!(f, "{}INFO", STRUCTURED_PREFIX),
            Command::GetBrightness => write!(f, "{}CALIBRATOR:GETBRIGHTNESS", STRUCTURED_PREFIX),
            Command::SetBrightness(v) => {
                write!(f, "{}CALIBRATOR:BRIGHTNESS:{}", STRUCTURED_PREFIX, v)
            }
            Command::CalibratorOn(None) => write!(f, "{}CALIBRATOR:ON", STRUCTURED_PREFIX),
            Command::CalibratorOn(Some(v)) => {
                write!(f, "{}CALIBRATOR:ON:{}", STRUCTURED_PREFIX, v)
            }
            Command::CalibratorOff => write!(f, "{}CALIBRATOR:OFF", STRUCTURED_PREFIX),
            Command::InvalidStructured => f.write_str(STRUCTURED_PREFIX),
        }
    }
}

fn parse_number(field: &str) -> Result<f32, CommandError> {
    let field = field.trim();
    field
        .parse::<f32>()
        .map_err(|_| CommandError::InvalidNumber(token(field)))
}

fn parse_target(field: &str) -> Result<TargetState, CommandError> {
    TargetState::from_name(field).ok_or_else(|| CommandError::InvalidState(token(field)))
}

/// Copy as much of `field` as fits into a [`Token`]
fn token(field: &str) -> Token {
    let mut out = Token::new();
    for c in field.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
