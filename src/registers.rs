//! Register map of the 3-Finger Adaptive Gripper and the pure codec over it.
//!
//! The controller exposes two fixed-layout register banks: the robot output
//! registers (host writes, [`encode`]) and the robot input registers (host
//! reads, [`decode`]). Field widths, byte order and bit offsets are protocol
//! constants; the controller matches them bit for bit, so nothing in here is
//! an implementation choice.

use num::FromPrimitive;
use num_derive::FromPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::target::ActuatorTarget;
use crate::RobotiqError;

/// Length of the command frame written once per cycle.
pub const COMMAND_FRAME_LEN: usize = 43;
/// Length of the controller's acknowledgment of a command write.
pub const ACK_FRAME_LEN: usize = 12;
/// Length of the status poll request frame.
pub const STATUS_REQUEST_LEN: usize = 12;
/// Length of the controller's response to a status poll.
pub const STATUS_RESPONSE_LEN: usize = 21;
/// Length of the status register image carried inside the poll response.
pub const STATUS_REGISTER_LEN: usize = 12;

/// Flag for `rACT` and `gACT`
static FLAG_ACT: u8 = 1 << 0;
/// Flag for `rGTO` and `gGTO`
static FLAG_GTO: u8 = 1 << 3;
/// Flag for `rATR`
static FLAG_ATR: u8 = 1 << 4;
/// Flag for `rACR`, GRIPPER OPTIONS byte
static FLAG_ACR: u8 = 1 << 1;
/// Flag for `rICF`, GRIPPER OPTIONS byte
static FLAG_ICF: u8 = 1 << 2;
/// Flag for `rICS`, GRIPPER OPTIONS byte
static FLAG_ICS: u8 = 1 << 3;

/// `rMOD`/`gMOD` occupy bits 1..2 of the action byte.
const MODE_SHIFT: u8 = 1;
/// `gFLT` occupies the low nibble of the fault byte; the high nibble is reserved.
const FAULT_MASK: u8 = 0x0F;

const UNIT_ID: u8 = 0x02;
const FC_WRITE_REGISTERS: u8 = 0x10;
const FC_READ_REGISTERS: u8 = 0x04;
const FC_EXCEPTION: u8 = 0x90;

// Command frame offsets. The 13 byte header is fixed; the payload mirrors the
// robot output register bank.
const OFF_LENGTH: usize = 4;
const OFF_UNIT: usize = 6;
const OFF_FUNCTION: usize = 7;
const OFF_REGISTER_COUNT: usize = 10;
const OFF_BYTE_COUNT: usize = 12;
const OFF_ACTION: usize = 13;
const OFF_OPTIONS: usize = 14;
const OFF_TARGETS: usize = 16;

const COMMAND_BODY_LEN: u16 = 37;
const COMMAND_REGISTER_COUNT: u16 = 15;
const COMMAND_BYTE_COUNT: u8 = 30;

const STATUS_BODY_LEN: u16 = 6;
const STATUS_REGISTER_COUNT: u16 = 6;

// Status register image offsets.
const IMG_GRIPPER_STATUS: usize = 0;
const IMG_OBJECT_STATUS: usize = 1;
const IMG_FAULT_STATUS: usize = 2;
const IMG_ACTUATORS: usize = 3;
const IMG_RESERVED: usize = 11;

/// One independently controllable axis of the gripper, three fingers plus
/// the scissor axis between fingers B and C.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Actuator {
    FingerA = 0,
    FingerB = 1,
    FingerC = 2,
    Scissor = 3,
}

impl Actuator {
    pub const ALL: [Actuator; 4] = [
        Actuator::FingerA,
        Actuator::FingerB,
        Actuator::FingerC,
        Actuator::Scissor,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_finger(self) -> bool {
        !matches!(self, Actuator::Scissor)
    }
}

/// Operation mode of the gripper, `rMOD`/`gMOD`.
///
/// The mode decides how the fingers are mechanically coupled. BASIC, PINCH
/// and WIDE drive the three fingers against different scissor presets, while
/// SCISSOR drives the scissor axis alone and ignores individual finger
/// targets.
#[repr(u8)]
#[derive(Debug, Clone, Copy, FromPrimitive, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GripperMode {
    Basic = 0,
    Pinch = 1,
    Wide = 2,
    Scissor = 3,
}

impl Default for GripperMode {
    fn default() -> Self {
        GripperMode::Basic
    }
}

/// The gripper's activation and mode-change status, `gIMC`.
#[repr(u8)]
#[derive(Debug, Clone, Copy, FromPrimitive, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationStatus {
    /// Gripper is in reset (or automatic release) state. See fault status.
    InReset,
    /// Activation in progress
    Activating,
    /// Mode change in progress
    ChangingMode,
    /// Activation and mode change are completed
    Completed,
}

/// Motion status of the fingers as a group, `gSTA`. Ignore if `gGTO == 0`.
#[repr(u8)]
#[derive(Debug, Clone, Copy, FromPrimitive, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionStatus {
    /// Gripper is in motion towards requested position
    InMotion,
    /// One or two fingers stopped before requested position
    OneOrTwoStopped,
    /// All fingers stopped before requested position
    AllStopped,
    /// All fingers reached requested position
    AllAtRequested,
}

/// Object detection status per actuator, `gDTA`/`gDTB`/`gDTC`/`gDTS`.
///
/// A built-in feature that provides information on possible object pick-up.
/// The detection already applies hysteresis in hardware; the raw motor
/// current never needs to be thresholded host-side. Ignore if `gGTO == 0`.
#[repr(u8)]
#[derive(Debug, Clone, Copy, FromPrimitive, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjDetectStatus {
    /// Actuator is in motion towards requested position. No object detected
    InMotion,
    /// Actuator has stopped due to a contact while opening before requested position.
    /// Object detected opening.
    DetectedOpen,
    /// Actuator has stopped due to a contact while closing before requested position.
    /// Object detected closing.
    DetectedClose,
    /// Actuator is at requested position. No object detected or object has been lost/dropped.
    NoObject,
}

impl ObjDetectStatus {
    pub fn detected_obj(&self) -> bool {
        matches!(self, ObjDetectStatus::DetectedClose | ObjDetectStatus::DetectedOpen)
    }
}

/// Fault status, `gFLT`. General error messages useful for troubleshooting.
///
/// The low nibble of the fault byte carries the code; the high nibble is
/// reserved and always zero. Codes outside this list are undocumented and
/// treated as protocol desync by [`decode`].
#[repr(u8)]
#[derive(Debug, Clone, Copy, FromPrimitive, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GripperFault {
    /// No fault (solid blue LED)
    NoFault = 0x00,

    /// Action delayed, activation (re-activation) must be completed prior to action
    ActionDelay = 0x05,
    /// Action delayed, mode change must be completed prior to action
    ModeDelay = 0x06,
    /// The activation bit must be set prior to action
    NotActivated = 0x07,

    /// Communication chip is not ready (may be booting)
    CommNotReady = 0x09,
    /// Changing mode fault, interference detected on scissor axis
    ModeFault = 0x0A,
    /// Automatic release in progress
    Releasing = 0x0B,
    /// Automatic release completed, reset and reactivation required
    AutomaticReleaseCompleted = 0x0F,
}

impl GripperFault {
    /// For major faults, a reset is required (rising edge on the `rACT` bit).
    pub fn reset_required(&self) -> bool {
        *self as u8 >= 0x0A
    }

    /// Whether the code fails a command cycle. The automatic release
    /// progress and completion codes are informational, the routine could
    /// never be polled to completion otherwise.
    pub fn is_failure(&self) -> bool {
        !matches!(
            self,
            GripperFault::NoFault
                | GripperFault::Releasing
                | GripperFault::AutomaticReleaseCompleted
        )
    }
}

impl std::fmt::Display for GripperFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Robot Input / Status of the gripper.
///
/// Decoded image of the status register bank, 12 bytes of data: activation,
/// mode and motion echoes, per-actuator object detection, the fault code and
/// per-actuator position and current feedback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusFeedback {
    /// Activation status, echo of the `rACT` bit.
    pub act: bool,
    /// Mode status, echo of the requested `rMOD` field.
    pub mode: GripperMode,
    /// Action status, echo of the `rGTO` bit.
    pub gto: bool,
    /// Activation and mode-change status of the gripper.
    pub sta: ActivationStatus,
    /// Motion status of the fingers as a group.
    pub motion: MotionStatus,
    /// Object detection status per actuator, indexed by [`Actuator`].
    pub obj: [ObjDetectStatus; 4],
    /// Fault status returns general error messages useful for troubleshooting.
    pub fault: GripperFault,
    /// Actual position per actuator obtained via the encoders, `0x00` open to `0xFF` closed.
    pub pos: [u8; 4],
    /// Instantaneous motor current per actuator, approximate equivalent is `10 * current` in mA.
    pub cur: [u8; 4],
}

impl StatusFeedback {
    pub fn detection(&self, actuator: Actuator) -> ObjDetectStatus {
        self.obj[actuator.index()]
    }

    pub fn position(&self, actuator: Actuator) -> u8 {
        self.pos[actuator.index()]
    }

    pub fn current(&self, actuator: Actuator) -> u8 {
        self.cur[actuator.index()]
    }

    /// Whether any actuator reports contact with an object.
    pub fn object_detected(&self) -> bool {
        self.obj.iter().any(|o| o.detected_obj())
    }
}

/// Encode the command register image for a target state.
///
/// Pure and total: every valid [`ActuatorTarget`] maps to exactly one byte
/// sequence. Actuators that are not commandable under the current mode and
/// options encode as the neutral value zero, never as leftovers.
pub fn encode(target: &ActuatorTarget) -> [u8; COMMAND_FRAME_LEN] {
    let mut frame = [0u8; COMMAND_FRAME_LEN];

    // Fixed header. Transaction and protocol ids stay zero, the session
    // carries a single outstanding exchange.
    frame[OFF_LENGTH..OFF_LENGTH + 2].copy_from_slice(&COMMAND_BODY_LEN.to_be_bytes());
    frame[OFF_UNIT] = UNIT_ID;
    frame[OFF_FUNCTION] = FC_WRITE_REGISTERS;
    frame[OFF_REGISTER_COUNT..OFF_REGISTER_COUNT + 2]
        .copy_from_slice(&COMMAND_REGISTER_COUNT.to_be_bytes());
    frame[OFF_BYTE_COUNT] = COMMAND_BYTE_COUNT;

    let mut action = (target.mode() as u8) << MODE_SHIFT;
    if target.act() {
        action |= FLAG_ACT;
    }
    if target.gto() {
        action |= FLAG_GTO;
    }
    if target.auto_release() {
        action |= FLAG_ATR;
    }
    frame[OFF_ACTION] = action;

    let mut options = 0u8;
    if target.auto_center() {
        options |= FLAG_ACR;
    }
    if target.individual_fingers() {
        options |= FLAG_ICF;
    }
    if target.individual_scissor() {
        options |= FLAG_ICS;
    }
    frame[OFF_OPTIONS] = options;

    for actuator in Actuator::ALL {
        if !target.commandable(actuator) {
            continue;
        }
        let motion = target.motion(actuator);
        let off = OFF_TARGETS + 3 * actuator.index();
        frame[off] = motion.position;
        frame[off + 1] = motion.speed;
        frame[off + 2] = motion.force;
    }

    frame
}

/// The fixed status poll request, also sent verbatim as the link heartbeat.
pub fn status_request() -> [u8; STATUS_REQUEST_LEN] {
    let mut frame = [0u8; STATUS_REQUEST_LEN];
    frame[OFF_LENGTH..OFF_LENGTH + 2].copy_from_slice(&STATUS_BODY_LEN.to_be_bytes());
    frame[OFF_UNIT] = UNIT_ID;
    frame[OFF_FUNCTION] = FC_READ_REGISTERS;
    frame[OFF_REGISTER_COUNT..OFF_REGISTER_COUNT + 2]
        .copy_from_slice(&STATUS_REGISTER_COUNT.to_be_bytes());
    frame
}

/// Check the controller's acknowledgment of a command write.
///
/// An exception function byte means the controller declined the command and
/// surfaces as [`RobotiqError::Reject`] with the exception code.
pub fn parse_ack(ack: &[u8]) -> Result<(), RobotiqError> {
    if ack.len() != ACK_FRAME_LEN {
        return Err(RobotiqError::MalformedFrame {
            context: "command ack",
            expected: ACK_FRAME_LEN,
            actual: ack.len(),
        });
    }
    match ack[OFF_FUNCTION] {
        fc if fc == FC_WRITE_REGISTERS => Ok(()),
        fc if fc == FC_EXCEPTION => Err(RobotiqError::Reject {
            code: ack[OFF_FUNCTION + 1],
        }),
        fc => Err(RobotiqError::MalformedFrame {
            context: "ack function code",
            expected: FC_WRITE_REGISTERS as usize,
            actual: fc as usize,
        }),
    }
}

/// Strip the envelope of a status poll response, yielding the 12 byte
/// register image for [`decode`].
pub fn unwrap_status(response: &[u8]) -> Result<&[u8], RobotiqError> {
    if response.len() != STATUS_RESPONSE_LEN {
        return Err(RobotiqError::MalformedFrame {
            context: "status response",
            expected: STATUS_RESPONSE_LEN,
            actual: response.len(),
        });
    }
    if response[OFF_FUNCTION] != FC_READ_REGISTERS {
        return Err(RobotiqError::MalformedFrame {
            context: "status function code",
            expected: FC_READ_REGISTERS as usize,
            actual: response[OFF_FUNCTION] as usize,
        });
    }
    if response[OFF_FUNCTION + 1] as usize != STATUS_REGISTER_LEN {
        return Err(RobotiqError::MalformedFrame {
            context: "status byte count",
            expected: STATUS_REGISTER_LEN,
            actual: response[OFF_FUNCTION + 1] as usize,
        });
    }
    Ok(&response[STATUS_RESPONSE_LEN - STATUS_REGISTER_LEN..])
}

/// Decode the status register image.
///
/// Fails with [`RobotiqError::MalformedFrame`] on any length other than the
/// fixed image size and with [`RobotiqError::ReservedBitSet`] when reserved
/// bits carry data. Reserved bits going high means the stream is no longer
/// aligned on register boundaries, acting on such a frame is worse than
/// failing the cycle.
pub fn decode(image: &[u8]) -> Result<StatusFeedback, RobotiqError> {
    if image.len() != STATUS_REGISTER_LEN {
        return Err(RobotiqError::MalformedFrame {
            context: "status register",
            expected: STATUS_REGISTER_LEN,
            actual: image.len(),
        });
    }

    let gripper = image[IMG_GRIPPER_STATUS];
    let act = gripper & FLAG_ACT != 0;
    let mode = GripperMode::from_u8((gripper >> MODE_SHIFT) & 0b11).unwrap();
    let gto = gripper & FLAG_GTO != 0;
    let sta = ActivationStatus::from_u8((gripper >> 4) & 0b11).unwrap();
    let motion = MotionStatus::from_u8((gripper >> 6) & 0b11).unwrap();

    let mut obj = [ObjDetectStatus::InMotion; 4];
    for actuator in Actuator::ALL {
        let bits = (image[IMG_OBJECT_STATUS] >> (2 * actuator.index())) & 0b11;
        obj[actuator.index()] = ObjDetectStatus::from_u8(bits).unwrap();
    }

    if image[IMG_FAULT_STATUS] & !FAULT_MASK != 0 {
        return Err(RobotiqError::ReservedBitSet {
            byte: IMG_FAULT_STATUS,
        });
    }
    let fault = GripperFault::from_u8(image[IMG_FAULT_STATUS] & FAULT_MASK).ok_or(
        RobotiqError::ReservedBitSet {
            byte: IMG_FAULT_STATUS,
        },
    )?;

    if image[IMG_RESERVED] != 0 {
        return Err(RobotiqError::ReservedBitSet { byte: IMG_RESERVED });
    }

    let mut pos = [0u8; 4];
    let mut cur = [0u8; 4];
    for actuator in Actuator::ALL {
        pos[actuator.index()] = image[IMG_ACTUATORS + 2 * actuator.index()];
        cur[actuator.index()] = image[IMG_ACTUATORS + 2 * actuator.index() + 1];
    }

    Ok(StatusFeedback {
        act,
        mode,
        gto,
        sta,
        motion,
        obj,
        fault,
        pos,
        cur,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::TargetField;

    fn image(
        act: bool,
        mode: u8,
        gto: bool,
        imc: u8,
        sta: u8,
        obj: [u8; 4],
        fault: u8,
        pos: [u8; 4],
        cur: [u8; 4],
    ) -> [u8; STATUS_REGISTER_LEN] {
        let mut b0 = (mode << 1) | (imc << 4) | (sta << 6);
        if act {
            b0 |= 0x01;
        }
        if gto {
            b0 |= 0x08;
        }
        let b1 = obj[0] | obj[1] << 2 | obj[2] << 4 | obj[3] << 6;
        [
            b0, b1, fault, pos[0], cur[0], pos[1], cur[1], pos[2], cur[2], pos[3], cur[3], 0,
        ]
    }

    #[test]
    fn command_register_layout_is_bit_exact() {
        let mut target = ActuatorTarget::new();
        target.set_activation(true);
        target.set_go_to(true);
        target.set_individual_fingers(true);
        target
            .set_target(Actuator::FingerA, 0xFF, 0x80, 0x40)
            .unwrap();
        target
            .set_target(Actuator::FingerB, 0x11, 0x22, 0x33)
            .unwrap();

        let frame = encode(&target);
        assert_eq!(frame.len(), COMMAND_FRAME_LEN);
        // header
        assert_eq!(&frame[0..4], &[0, 0, 0, 0]);
        assert_eq!(&frame[4..6], &[0x00, 0x25]);
        assert_eq!(frame[6], 0x02);
        assert_eq!(frame[7], 0x10);
        assert_eq!(&frame[8..10], &[0x00, 0x00]);
        assert_eq!(&frame[10..12], &[0x00, 0x0F]);
        assert_eq!(frame[12], 0x1E);
        // action request: rACT | rGTO, basic mode
        assert_eq!(frame[13], 0b0000_1001);
        // gripper options: rICF
        assert_eq!(frame[14], 0b0000_0100);
        assert_eq!(frame[15], 0x00);
        // finger A then finger B triplets
        assert_eq!(&frame[16..19], &[0xFF, 0x80, 0x40]);
        assert_eq!(&frame[19..22], &[0x11, 0x22, 0x33]);
        // finger C untouched, scissor not commandable
        assert_eq!(&frame[22..28], &[0; 6]);
        // reserved tail
        assert!(frame[28..].iter().all(|b| *b == 0));
    }

    #[test]
    fn scissor_mode_encodes_fingers_as_neutral() {
        let mut target = ActuatorTarget::new();
        target.set_activation(true);
        target.set_individual_fingers(true);
        target
            .set_target(Actuator::FingerA, 0xAA, 0xBB, 0xCC)
            .unwrap();
        target.set_mode(GripperMode::Scissor);
        target
            .set_target(Actuator::Scissor, 0x10, 0x20, 0x30)
            .unwrap();
        target.set_go_to(true);

        let frame = encode(&target);
        // scissor mode in the action byte
        assert_eq!(frame[13] >> 1 & 0b11, GripperMode::Scissor as u8);
        // finger slots are neutral even though finger A holds a stale target
        assert!(frame[16..25].iter().all(|b| *b == 0));
        assert_eq!(&frame[25..28], &[0x10, 0x20, 0x30]);
    }

    #[test]
    fn encode_is_deterministic() {
        let mut target = ActuatorTarget::new();
        target.set_activation(true);
        target
            .set_target(Actuator::FingerA, 0x7F, 0x10, 0x10)
            .unwrap();
        assert_eq!(encode(&target), encode(&target));
    }

    #[test]
    fn decode_healthy_frame() {
        let img = image(
            true,
            GripperMode::Pinch as u8,
            true,
            0b11,
            0b00,
            [0, 2, 1, 0],
            0x00,
            [10, 20, 30, 40],
            [1, 2, 3, 4],
        );
        let status = decode(&img).unwrap();
        assert!(status.act);
        assert!(status.gto);
        assert_eq!(status.mode, GripperMode::Pinch);
        assert_eq!(status.sta, ActivationStatus::Completed);
        assert_eq!(status.motion, MotionStatus::InMotion);
        assert_eq!(status.detection(Actuator::FingerA), ObjDetectStatus::InMotion);
        assert_eq!(
            status.detection(Actuator::FingerB),
            ObjDetectStatus::DetectedClose
        );
        assert_eq!(
            status.detection(Actuator::FingerC),
            ObjDetectStatus::DetectedOpen
        );
        assert_eq!(status.fault, GripperFault::NoFault);
        assert_eq!(status.position(Actuator::FingerC), 30);
        assert_eq!(status.current(Actuator::Scissor), 4);
        assert!(status.object_detected());
    }

    #[test]
    fn target_echo_round_trips_through_status() {
        let mut target = ActuatorTarget::new();
        target.set_activation(true);
        target.set_go_to(true);
        target.set_individual_fingers(true);
        target.set_individual_scissor(true);
        for (actuator, base) in Actuator::ALL.into_iter().zip([0x10u16, 0x20, 0x30, 0x40]) {
            target
                .set_target(actuator, base, base + 1, base + 2)
                .unwrap();
        }

        // a fault free controller that reached every target echoes the
        // requested positions back as measured positions
        let frame = encode(&target);
        let mut echoed = [0u8; 4];
        for actuator in Actuator::ALL {
            echoed[actuator.index()] = frame[16 + 3 * actuator.index()];
        }
        let img = image(
            true,
            GripperMode::Basic as u8,
            true,
            0b11,
            0b11,
            [3, 3, 3, 3],
            0x00,
            echoed,
            [0; 4],
        );
        let status = decode(&img).unwrap();
        for actuator in Actuator::ALL {
            assert_eq!(
                status.position(actuator),
                target.motion(actuator).position,
                "{actuator:?} echo"
            );
        }
    }

    #[test]
    fn decode_rejects_wrong_length() {
        let err = decode(&[0u8; 11]).unwrap_err();
        assert!(matches!(
            err,
            RobotiqError::MalformedFrame {
                expected: STATUS_REGISTER_LEN,
                actual: 11,
                ..
            }
        ));
    }

    #[test]
    fn decode_rejects_reserved_fault_bits() {
        let mut img = image(true, 0, false, 0b11, 0b11, [3; 4], 0x00, [0; 4], [0; 4]);
        img[2] = 0x40;
        assert!(matches!(
            decode(&img).unwrap_err(),
            RobotiqError::ReservedBitSet { byte: 2 }
        ));
    }

    #[test]
    fn decode_rejects_undocumented_fault_code() {
        let img = image(true, 0, false, 0b11, 0b11, [3; 4], 0x03, [0; 4], [0; 4]);
        assert!(matches!(
            decode(&img).unwrap_err(),
            RobotiqError::ReservedBitSet { byte: 2 }
        ));
    }

    #[test]
    fn decode_rejects_reserved_tail_byte() {
        let mut img = image(true, 0, false, 0b11, 0b11, [3; 4], 0x00, [0; 4], [0; 4]);
        img[11] = 0x01;
        assert!(matches!(
            decode(&img).unwrap_err(),
            RobotiqError::ReservedBitSet { byte: 11 }
        ));
    }

    #[test]
    fn ack_accepts_and_rejects() {
        let ok = [0, 0, 0, 0, 0, 6, 2, 0x10, 0, 0, 0, 15];
        assert!(parse_ack(&ok).is_ok());

        let nak = [0, 0, 0, 0, 0, 6, 2, 0x90, 0x03, 0, 0, 0];
        assert!(matches!(
            parse_ack(&nak).unwrap_err(),
            RobotiqError::Reject { code: 0x03 }
        ));

        assert!(parse_ack(&ok[..7]).is_err());
    }

    #[test]
    fn status_envelope_unwraps_to_image() {
        let img = image(true, 0, true, 0b11, 0b00, [0; 4], 0x00, [5; 4], [6; 4]);
        let mut response = vec![0, 0, 0, 0, 0, 15, 2, 0x04, 12];
        response.extend_from_slice(&img);
        assert_eq!(unwrap_status(&response).unwrap(), &img);

        response[7] = 0x03;
        assert!(unwrap_status(&response).is_err());
        assert!(unwrap_status(&response[..20]).is_err());
    }

    #[test]
    fn status_request_is_fixed() {
        let frame = status_request();
        assert_eq!(frame, [0, 0, 0, 0, 0, 6, 2, 0x04, 0, 0, 0, 6]);
    }

    #[test]
    fn feedback_serializes() {
        let img = image(true, 2, true, 0b11, 0b11, [3; 4], 0x00, [9; 4], [1; 4]);
        let status = decode(&img).unwrap();
        let json = serde_json::to_string(&status).unwrap();
        let back: StatusFeedback = serde_json::from_str(&json).unwrap();
        assert_eq!(status, back);
    }

    #[test]
    fn out_of_range_field_reported() {
        let mut target = ActuatorTarget::new();
        let err = target
            .set(Actuator::FingerA, TargetField::Speed, 0x100)
            .unwrap_err();
        assert!(matches!(
            err,
            RobotiqError::OutOfRange {
                field: TargetField::Speed,
                value: 0x100
            }
        ));
    }
}
