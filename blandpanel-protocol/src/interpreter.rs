//! Command interpreter
//!
//! Maps parsed commands onto the [`DeviceController`] and turns the result
//! into at most one response line. Every error raised while handling a
//! line becomes a single `FAULT:` response; none of them end the loop.

use embedded_hal::delay::DelayNs;

use blandpanel_core::controller::DeviceController;
use blandpanel_core::state::TargetState;
use blandpanel_core::traits::{PanelOutput, PositionSensor, PowerRail, ServoActuator};

use crate::command::{Command, CommandError};
use crate::response::Response;

/// Why the service loop is ending
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExitKind {
    /// Return to the host shell
    Repl,
    /// Restart the device
    Reset,
}

/// Result of handling one line
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome<'a> {
    /// Line too short; nothing to send
    Ignored,
    /// Command ran; the structured family sends nothing back
    Silent,
    /// Send this response and keep going
    Reply(Response<'a>),
    /// Send `GOODBYE` and stop the loop
    Exit(ExitKind),
}

impl<'a> Outcome<'a> {
    /// The line to send back, if any
    pub fn response(&self) -> Option<Response<'a>> {
        match self {
            Outcome::Ignored | Outcome::Silent => None,
            Outcome::Reply(response) => Some(response.clone()),
            Outcome::Exit(_) => Some(Response::Goodbye),
        }
    }
}

/// Line interpreter bound to one device controller
pub struct Interpreter<S, A, P, R, D> {
    controller: DeviceController<S, A, P, R, D>,
}

impl<S, A, P, R, D> Interpreter<S, A, P, R, D>
where
    S: ServoActuator,
    A: PositionSensor,
    P: PanelOutput,
    R: PowerRail,
    D: DelayNs,
{
    pub fn new(controller: DeviceController<S, A, P, R, D>) -> Self {
        Self { controller }
    }

    pub fn controller(&self) -> &DeviceController<S, A, P, R, D> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut DeviceController<S, A, P, R, D> {
        &mut self.controller
    }

    /// Handle one input line
    pub fn handle(&mut self, line: &str) -> Outcome<'static> {
        let result = match Command::parse(line) {
            Ok(Some(command)) => self.execute(command),
            Ok(None) => Ok(Outcome::Ignored),
            Err(e) => Err(e),
        };
        result.unwrap_or_else(|e| Outcome::Reply(Response::Fault(e)))
    }

    /// Run an already-parsed command
    pub fn execute(&mut self, command: Command) -> Result<Outcome<'static>, CommandError> {
        let ctl = &mut self.controller;

        let response = match command {
            Command::Estop => {
                ctl.estop()?;
                Response::Estopped
            }
            Command::AllClear => {
                ctl.allclear()?;
                Response::Ok
            }
            Command::Status => Response::Status {
                position: ctl.get_state()?,
                brightness: ctl.get_brightness(),
                enabled: ctl.get_enabled(),
            },
            Command::On(value) => {
                if let Some(value) = value {
                    ctl.set_brightness(value)?;
                }
                ctl.set_enabled(true)?;
                Response::Ok
            }
            Command::Off => {
                ctl.set_enabled(false)?;
                Response::Ok
            }
            Command::Bright(Some(value)) => {
                ctl.set_brightness(value)?;
                Response::Ok
            }
            Command::Bright(None) => Response::Brightness(ctl.get_brightness()),
            Command::Open => self.move_and_verify(TargetState::Opened)?,
            Command::Close => self.move_and_verify(TargetState::Closed)?,
            Command::State(Some(target)) => self.move_and_verify(target)?,
            Command::State(None) => Response::Position(ctl.get_state()?),
            Command::Angle(Some(target)) => {
                ctl.set_angle(target)?;
                let measured = ctl.get_angle()?;
                if ctl.angle_matches(measured, target) {
                    Response::Ok
                } else {
                    Response::Fail
                }
            }
            Command::Angle(None) => Response::Angle(ctl.get_angle()?),
            Command::Repl => return Ok(Outcome::Exit(ExitKind::Repl)),
            Command::Reset => return Ok(Outcome::Exit(ExitKind::Reset)),
            Command::Help => Response::Usage,

            Command::Ping => Response::Pong {
                guid: ctl.config().guid,
            },
            Command::Info => Response::Info {
                name: ctl.config().name,
            },
            Command::GetBrightness => Response::CalibratorBrightness(ctl.get_brightness()),
            Command::SetBrightness(value) => {
                ctl.set_brightness(value)?;
                return Ok(Outcome::Silent);
            }
            Command::CalibratorOn(value) => {
                let level = value.unwrap_or(ctl.config().default_brightness);
                ctl.check_brightness(level)?;
                ctl.set_state(TargetState::Closed)?;
                ctl.set_brightness(level)?;
                ctl.set_enabled(true)?;
                return Ok(Outcome::Silent);
            }
            Command::CalibratorOff => {
                ctl.set_enabled(false)?;
                ctl.set_state(TargetState::Opened)?;
                return Ok(Outcome::Silent);
            }
            Command::InvalidStructured => Response::InvalidCommand,
        };

        Ok(Outcome::Reply(response))
    }

    fn move_and_verify(&mut self, target: TargetState) -> Result<Response<'static>, CommandError> {
        self.controller.set_state(target)?;
        if self.controller.get_state()? == target.position() {
            Ok(Response::Ok)
        } else {
            Ok(Response::Fail)
        }
    }
}
