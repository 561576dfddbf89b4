//! Property tests for the calibration model and device controller.
//!
//! Runs on host only, against the simulated bench.

use blandpanel_core::calibration::ShutterCalibration;
use blandpanel_core::config::CalibrationPoints;
use blandpanel_core::controller::{ControllerError, Quantity};
use blandpanel_core::mock::Bench;
use blandpanel_core::state::{ShutterPosition, TargetState};
use proptest::prelude::*;

fn arb_target() -> impl Strategy<Value = TargetState> {
    prop_oneof![Just(TargetState::Opened), Just(TargetState::Closed)]
}

proptest! {
    /// Commanding an angle through the servo curve and reading it back
    /// through the sensor curve recovers the angle.
    #[test]
    fn angle_round_trip(angle in 0.0f32..=270.0) {
        let bench = Bench::closed();
        let mut ctl = bench.controller();

        ctl.set_angle(angle).unwrap();
        let measured = ctl.get_angle().unwrap();

        prop_assert!((measured - angle).abs() < 0.05, "{} read back as {}", angle, measured);
    }

    /// The two curves are exact inverses of each other.
    #[test]
    fn curves_invert(angle in -20.0f32..=290.0) {
        let cal = ShutterCalibration::new(&CalibrationPoints::default()).unwrap();

        let pulse = cal.angle_to_pulse_fraction(angle);
        prop_assert!((cal.pulse_fraction_to_angle(pulse) - angle).abs() < 1e-3);

        let raw = cal.angle_to_sensor(angle);
        prop_assert!((cal.sensor_to_angle(raw) - angle).abs() < 1e-3);
    }

    /// A shutter already at the target is never driven.
    #[test]
    fn set_state_at_target_is_silent(target in arb_target(), offset in -9.0f32..9.0) {
        let bench = Bench::at_angle(target.angle() + offset);
        let mut ctl = bench.controller();

        ctl.set_state(target).unwrap();

        prop_assert_eq!(bench.servo_writes(), 0);
        prop_assert_eq!(bench.settle_count(), 0);
    }

    /// Any reachable starting angle ends at the commanded target.
    #[test]
    fn set_state_reaches_target(start in -20.0f32..=290.0, target in arb_target()) {
        let bench = Bench::at_angle(start);
        let mut ctl = bench.controller();

        ctl.set_state(target).unwrap();

        prop_assert_eq!(ctl.get_state().unwrap(), target.position());
    }

    /// Brightness is accepted exactly on [0, 1].
    #[test]
    fn brightness_bounds(value in -2.0f32..3.0) {
        let bench = Bench::closed();
        let mut ctl = bench.controller();

        let result = ctl.set_brightness(value);
        if (0.0..=1.0).contains(&value) {
            prop_assert!(result.is_ok());
            prop_assert_eq!(ctl.get_brightness(), value);
        } else {
            prop_assert_eq!(result, Err(ControllerError::OutOfRange(Quantity::Brightness)));
            prop_assert_eq!(ctl.get_brightness(), 0.75);
        }
    }

    /// While estopped, no sequence of motion commands re-energizes the rail.
    #[test]
    fn estop_holds_through_motion(
        moves in proptest::collection::vec(
            prop_oneof![
                (-20.0f32..=290.0).prop_map(Some),
                arb_target().prop_map(|t| Some(t.angle())),
                Just(None),
            ],
            1..8,
        )
    ) {
        let bench = Bench::closed();
        let mut ctl = bench.controller();
        ctl.estop().unwrap();

        for step in moves {
            match step {
                Some(angle) => ctl.set_angle(angle).unwrap(),
                None => ctl.set_state(TargetState::Opened).unwrap(),
            }
            prop_assert!(!bench.rail_energized());
        }

        prop_assert_eq!(ctl.get_state().unwrap(), ShutterPosition::Closed);
    }
}
