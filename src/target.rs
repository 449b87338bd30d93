//! Desired actuator state, validated before it ever reaches the codec.

use serde::{Deserialize, Serialize};

use crate::registers::{Actuator, GripperMode};
use crate::RobotiqError;

/// One settable field of a motion target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetField {
    Position,
    Speed,
    Force,
}

/// Requested position, speed and force for one actuator.
///
/// Position `0x00` and `0xFF` correspond respectively to the fully opened
/// and fully closed mechanical stops. Speed and force span minimum to
/// maximum over the same range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotionTarget {
    pub position: u8,
    pub speed: u8,
    pub force: u8,
}

/// The latest commanded state of the hand, the single source the codec
/// encodes from.
///
/// All setters validate before mutating: values above `0xFF` are rejected
/// with [`RobotiqError::OutOfRange`] and targets for actuators that the
/// current mode and option bits leave uncontrolled are rejected with
/// [`RobotiqError::InvalidModeTransition`]. Clearing the activation bit
/// mirrors the controller, which zeroes its own motion registers on reset:
/// all targets are invalidated and must be re-asserted after reactivation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActuatorTarget {
    act: bool,
    gto: bool,
    mode: GripperMode,
    auto_release: bool,
    auto_center: bool,
    individual_fingers: bool,
    individual_scissor: bool,
    targets: [MotionTarget; 4],
}

impl ActuatorTarget {
    /// A new default target. All zero, which on the wire is the reset command.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a single target field for one actuator.
    pub fn set(
        &mut self,
        actuator: Actuator,
        field: TargetField,
        value: u16,
    ) -> Result<(), RobotiqError> {
        let value = Self::checked(field, value)?;
        self.check_commandable(actuator)?;
        let slot = &mut self.targets[actuator.index()];
        match field {
            TargetField::Position => slot.position = value,
            TargetField::Speed => slot.speed = value,
            TargetField::Force => slot.force = value,
        }
        Ok(())
    }

    /// Set position, speed and force for one actuator. Validates everything
    /// up front, a rejected call leaves the previous target intact.
    pub fn set_target(
        &mut self,
        actuator: Actuator,
        position: u16,
        speed: u16,
        force: u16,
    ) -> Result<(), RobotiqError> {
        let position = Self::checked(TargetField::Position, position)?;
        let speed = Self::checked(TargetField::Speed, speed)?;
        let force = Self::checked(TargetField::Force, force)?;
        self.check_commandable(actuator)?;
        self.targets[actuator.index()] = MotionTarget {
            position,
            speed,
            force,
        };
        Ok(())
    }

    /// Select the operation mode. Stored targets survive a mode change but
    /// actuators the new mode leaves uncontrolled encode as neutral.
    pub fn set_mode(&mut self, mode: GripperMode) {
        self.mode = mode;
    }

    /// Set or clear the activation bit, `rACT`.
    ///
    /// Clearing it resets the gripper and invalidates every motion target,
    /// the go-to bit and a pending automatic release.
    pub fn set_activation(&mut self, act: bool) {
        self.act = act;
        if !act {
            self.targets = [MotionTarget::default(); 4];
            self.gto = false;
            self.auto_release = false;
        }
    }

    /// Set or clear the go-to bit, `rGTO`. Motion starts only while this is set.
    pub fn set_go_to(&mut self, gto: bool) {
        self.gto = gto;
    }

    /// Request the automatic release routine, `rATR`. Overrides all other
    /// commands except activation.
    pub fn set_auto_release(&mut self, atr: bool) {
        self.auto_release = atr;
    }

    /// Let the controller keep the scissor axis centered, `rACR`.
    pub fn set_auto_center(&mut self, acr: bool) {
        self.auto_center = acr;
    }

    /// Enable individual control of fingers B and C, `rICF`. While clear,
    /// both follow the finger A target.
    pub fn set_individual_fingers(&mut self, icf: bool) {
        self.individual_fingers = icf;
    }

    /// Enable individual control of the scissor axis outside scissor mode, `rICS`.
    pub fn set_individual_scissor(&mut self, ics: bool) {
        self.individual_scissor = ics;
    }

    /// Whether the current mode and option bits let this actuator take a target.
    pub fn commandable(&self, actuator: Actuator) -> bool {
        match actuator {
            Actuator::Scissor => self.mode == GripperMode::Scissor || self.individual_scissor,
            Actuator::FingerA => self.mode != GripperMode::Scissor,
            Actuator::FingerB | Actuator::FingerC => {
                self.mode != GripperMode::Scissor && self.individual_fingers
            }
        }
    }

    pub fn act(&self) -> bool {
        self.act
    }

    pub fn gto(&self) -> bool {
        self.gto
    }

    pub fn mode(&self) -> GripperMode {
        self.mode
    }

    pub fn auto_release(&self) -> bool {
        self.auto_release
    }

    pub fn auto_center(&self) -> bool {
        self.auto_center
    }

    pub fn individual_fingers(&self) -> bool {
        self.individual_fingers
    }

    pub fn individual_scissor(&self) -> bool {
        self.individual_scissor
    }

    pub fn motion(&self, actuator: Actuator) -> MotionTarget {
        self.targets[actuator.index()]
    }

    fn checked(field: TargetField, value: u16) -> Result<u8, RobotiqError> {
        if value > 0xFF {
            return Err(RobotiqError::OutOfRange { field, value });
        }
        Ok(value as u8)
    }

    fn check_commandable(&self, actuator: Actuator) -> Result<(), RobotiqError> {
        if !self.commandable(actuator) {
            return Err(RobotiqError::InvalidModeTransition {
                actuator,
                mode: self.mode,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_is_enforced_per_field() {
        let mut target = ActuatorTarget::new();
        for field in [TargetField::Position, TargetField::Speed, TargetField::Force] {
            assert!(matches!(
                target.set(Actuator::FingerA, field, 256),
                Err(RobotiqError::OutOfRange { value: 256, .. })
            ));
            target.set(Actuator::FingerA, field, 255).unwrap();
            target.set(Actuator::FingerA, field, 0).unwrap();
        }
    }

    #[test]
    fn scissor_mode_refuses_finger_targets() {
        let mut target = ActuatorTarget::new();
        target.set_individual_fingers(true);
        target.set_mode(GripperMode::Scissor);
        let err = target
            .set(Actuator::FingerA, TargetField::Force, 0x80)
            .unwrap_err();
        assert!(matches!(
            err,
            RobotiqError::InvalidModeTransition {
                actuator: Actuator::FingerA,
                mode: GripperMode::Scissor,
            }
        ));
        // the scissor axis itself is commandable
        target
            .set(Actuator::Scissor, TargetField::Force, 0x80)
            .unwrap();
    }

    #[test]
    fn coupled_fingers_follow_finger_a() {
        let mut target = ActuatorTarget::new();
        assert!(target.set_target(Actuator::FingerB, 1, 1, 1).is_err());
        assert!(target.set_target(Actuator::FingerC, 1, 1, 1).is_err());
        target.set_individual_fingers(true);
        target.set_target(Actuator::FingerB, 1, 1, 1).unwrap();
        target.set_target(Actuator::FingerC, 1, 1, 1).unwrap();
    }

    #[test]
    fn scissor_needs_mode_or_option_bit() {
        let mut target = ActuatorTarget::new();
        assert!(target.set_target(Actuator::Scissor, 1, 1, 1).is_err());
        target.set_individual_scissor(true);
        target.set_target(Actuator::Scissor, 1, 1, 1).unwrap();
    }

    #[test]
    fn deactivation_invalidates_targets() {
        let mut target = ActuatorTarget::new();
        target.set_activation(true);
        target.set_go_to(true);
        target.set_auto_release(true);
        target.set_target(Actuator::FingerA, 0xFF, 0xFF, 0xFF).unwrap();

        target.set_activation(false);
        assert!(!target.gto());
        assert!(!target.auto_release());
        assert_eq!(target.motion(Actuator::FingerA), MotionTarget::default());

        // targets must be re-asserted once reactivated
        target.set_activation(true);
        assert_eq!(target.motion(Actuator::FingerA), MotionTarget::default());
        target.set_target(Actuator::FingerA, 0x10, 0x20, 0x30).unwrap();
        assert_eq!(target.motion(Actuator::FingerA).position, 0x10);
    }

    #[test]
    fn partial_set_target_does_not_write() {
        let mut target = ActuatorTarget::new();
        target.set_target(Actuator::FingerA, 5, 5, 5).unwrap();
        assert!(target.set_target(Actuator::FingerA, 6, 6, 300).is_err());
        assert_eq!(
            target.motion(Actuator::FingerA),
            MotionTarget {
                position: 5,
                speed: 5,
                force: 5
            }
        );
    }
}
