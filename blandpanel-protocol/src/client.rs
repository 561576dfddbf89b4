//! Host-side light box client
//!
//! Drives a panel the way the INDI flat-panel driver does: shorthand
//! commands, each answered by one line that must read `OK`. The transport
//! sits behind [`Link`], so the same sequences run over a serial port or
//! straight into an [`Interpreter`](crate::Interpreter).

use core::fmt::Write;

use heapless::String;

use blandpanel_core::state::TargetState;

use crate::command::{Command, MAX_LINE_LEN};
use crate::response::MAX_RESPONSE_LEN;

/// Full-scale brightness on the INDI light box interface
pub const INDI_BRIGHTNESS_MAX: u16 = 255;

/// A command line, terminator not included
pub type CommandLine = String<MAX_LINE_LEN>;

/// A reply line as read back from the panel
pub type ReplyLine = String<MAX_RESPONSE_LEN>;

/// How the host classifies a reply to a shorthand command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reply {
    /// `OK`
    Ok,
    /// `FAIL`: motion finished short of its target
    Fail,
    /// `FAULT: ...`
    Fault,
    /// Anything else, including no reply
    Other,
}

impl Reply {
    /// Classify one reply line, with or without its terminator
    pub fn from_line(line: &str) -> Self {
        match line.trim_end() {
            "OK" => Reply::Ok,
            "FAIL" => Reply::Fail,
            other if other.starts_with("FAULT") => Reply::Fault,
            _ => Reply::Other,
        }
    }

    /// Check if the command succeeded
    pub fn is_ok(self) -> bool {
        matches!(self, Reply::Ok)
    }
}

/// Errors returned by [`LightBox`] operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClientError<E> {
    /// Transport failed
    Link(E),
    /// Command line did not fit the line buffer
    Encode,
    /// Panel answered something other than `OK`
    Rejected(Reply),
}

/// Transport carrying one command line and bringing back its reply
pub trait Link {
    type Error;

    /// Send `line`, adding the line terminator, and read one reply line
    fn transact(&mut self, line: &str) -> Result<ReplyLine, Self::Error>;
}

/// Light box driven over a [`Link`]
pub struct LightBox<L> {
    link: L,
}

impl<L: Link> LightBox<L> {
    pub fn new(link: L) -> Self {
        Self { link }
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Set brightness from the INDI 0-255 scale
    pub fn set_brightness(&mut self, value: u16) -> Result<(), ClientError<L::Error>> {
        let level = f32::from(value) / f32::from(INDI_BRIGHTNESS_MAX);
        self.send(Command::Bright(Some(level)))
    }

    /// Enter or leave flat-field mode
    ///
    /// Enabling closes the shutter before lighting the panel; disabling
    /// darkens the panel before opening. The sequence stops at the first
    /// reply that is not `OK`.
    pub fn enable(&mut self, enable: bool) -> Result<(), ClientError<L::Error>> {
        if enable {
            self.send(Command::State(Some(TargetState::Closed)))?;
            self.send(Command::On(None))
        } else {
            self.send(Command::Off)?;
            self.send(Command::State(Some(TargetState::Opened)))
        }
    }

    fn send(&mut self, command: Command) -> Result<(), ClientError<L::Error>> {
        let mut line = CommandLine::new();
        write!(line, "{}", command).map_err(|_| ClientError::Encode)?;

        let reply = self.link.transact(&line).map_err(ClientError::Link)?;
        match Reply::from_line(&reply) {
            Reply::Ok => Ok(()),
            other => Err(ClientError::Rejected(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::vec::Vec;

    use super::*;
    use crate::interpreter::Interpreter;
    use blandpanel_core::mock::{
        Bench, Event, SimDelay, SimPanel, SimRail, SimSensor, SimServo,
    };
    use blandpanel_core::state::ShutterPosition;

    type BenchInterpreter<'a> =
        Interpreter<SimServo<'a>, SimSensor<'a>, SimPanel<'a>, SimRail<'a>, SimDelay<'a>>;

    /// Link wired straight into an interpreter, keeping every line sent
    struct LoopbackLink<'a> {
        interpreter: BenchInterpreter<'a>,
        sent: Vec<std::string::String>,
    }

    impl Link for LoopbackLink<'_> {
        type Error = core::fmt::Error;

        fn transact(&mut self, line: &str) -> Result<ReplyLine, Self::Error> {
            self.sent.push(line.into());
            match self.interpreter.handle(line).response() {
                Some(response) => response.encode(),
                None => Ok(ReplyLine::new()),
            }
        }
    }

    fn light_box(bench: &Bench) -> LightBox<LoopbackLink<'_>> {
        LightBox::new(LoopbackLink {
            interpreter: Interpreter::new(bench.controller()),
            sent: Vec::new(),
        })
    }

    #[test]
    fn test_reply_from_line() {
        assert_eq!(Reply::from_line("OK\r\n"), Reply::Ok);
        assert_eq!(Reply::from_line("OK"), Reply::Ok);
        assert_eq!(Reply::from_line("FAIL\r\n"), Reply::Fail);
        assert_eq!(Reply::from_line("FAULT: Angle out of bounds\r\n"), Reply::Fault);
        assert_eq!(Reply::from_line("OK STATE: CLOSED"), Reply::Other);
        assert_eq!(Reply::from_line(""), Reply::Other);
        assert!(Reply::Ok.is_ok());
        assert!(!Reply::Fail.is_ok());
    }

    #[test]
    fn test_set_brightness_scales_from_255() {
        let bench = Bench::closed();
        let mut lb = light_box(&bench);

        lb.set_brightness(51).unwrap();
        assert_eq!(lb.link().sent, ["BRIGHT 0.2"]);
        assert_eq!(lb.link().interpreter.controller().get_brightness(), 0.2);

        lb.set_brightness(255).unwrap();
        assert_eq!(lb.link().interpreter.controller().get_brightness(), 1.0);
    }

    #[test]
    fn test_set_brightness_above_scale_rejected() {
        let bench = Bench::closed();
        let mut lb = light_box(&bench);

        assert_eq!(
            lb.set_brightness(300),
            Err(ClientError::Rejected(Reply::Fault))
        );
        assert_eq!(lb.link().interpreter.controller().get_brightness(), 0.75);
    }

    #[test]
    fn test_enable_closes_then_lights() {
        let bench = Bench::opened();
        let mut lb = light_box(&bench);
        bench.clear_events();

        lb.enable(true).unwrap();
        assert_eq!(lb.link().sent, ["STATE CLOSED", "ON"]);
        assert_eq!(
            lb.link_mut().interpreter.controller_mut().get_state().unwrap(),
            ShutterPosition::Closed
        );
        assert_eq!(bench.panel_level(), 0.75);

        let events = bench.events();
        assert!(matches!(events.first(), Some(Event::Servo(_))));
        assert_eq!(events.last(), Some(&Event::Panel(0.75)));
    }

    #[test]
    fn test_disable_darkens_then_opens() {
        let bench = Bench::closed();
        let mut lb = light_box(&bench);

        lb.enable(true).unwrap();
        bench.clear_events();
        lb.enable(false).unwrap();

        assert_eq!(lb.link().sent, ["STATE CLOSED", "ON", "OFF", "STATE OPENED"]);
        let events = bench.events();
        assert_eq!(events.first(), Some(&Event::Panel(0.0)));
        assert!(matches!(events.last(), Some(Event::Servo(_))));
        assert_eq!(
            lb.link_mut().interpreter.controller_mut().get_state().unwrap(),
            ShutterPosition::Opened
        );
    }

    #[test]
    fn test_enable_stops_when_shutter_fails() {
        let bench = Bench::opened();
        let mut lb = light_box(&bench);

        lb.link_mut().interpreter.handle("ESTOP");
        lb.link_mut().sent.clear();

        assert_eq!(lb.enable(true), Err(ClientError::Rejected(Reply::Fail)));
        assert_eq!(lb.link().sent, ["STATE CLOSED"]);
        assert_eq!(bench.panel_level(), 0.0);
    }
}
