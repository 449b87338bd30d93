//! # Robotiq-3F-rs
//!
//! [![Static Badge](https://img.shields.io/badge/crate-robotiq_3f_rs-red)](https://crates.io/crates/robotiq-3f-rs)
//! [![docs.rs](https://img.shields.io/docsrs/robotiq-3f-rs)](https://docs.rs/robotiq-3f-rs/latest/robotiq_3f_rs/)
//!
//! `robotiq-3f-rs` is a library for interfacing with the Robotiq 3-Finger
//! Adaptive Gripper over its register protocol: three fingers (A, B, C) plus
//! the scissor axis between fingers B and C, each with its own position,
//! speed and force target.
//! ### Compatiable product
//! - [x] 3-Finger Adaptive Gripper
//! - [ ] 2F-85 / 2F-140 / HandE (see `robotiq-rs`)
//!
//! The crate talks to an already-established session (TCP or serial), writes
//! the 43 byte command register, polls the 12 byte status register and turns
//! the polled feedback into grasp states and one-shot transition events. A
//! background heartbeat keeps the controller from dropping an idle session.
//!
//! ## Example
//! ```no_run
//! use robotiq_3f_rs::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), RobotiqError> {
//!     // the controller keeps a command session open on this port
//!     let mut gripper = Robotiq3fGripper::connect("192.168.1.11:502").await?;
//!
//!     // Reset and Activation of Gripper
//!     //
//!     // reset first, then activate; activation runs the fingers through a
//!     // full open and close
//!     gripper.reset().await?.activate().await?.await_activate().await?;
//!     println!("finished activation.");
//!
//!     // Basic Gripper Command
//!     //
//!     // close all fingers at half speed, full force
//!     gripper.go_to(0xFF, 0x80, 0xFF).await?;
//!     let snapshot = gripper.await_go_to().await?;
//!     for actuator in Actuator::ALL {
//!         println!("{:?} -> {:?}", actuator, snapshot.state(actuator));
//!     }
//!     for event in gripper.take_events() {
//!         println!("{:?} entered {:?}", event.actuator, event.state);
//!     }
//!
//!     // Individual finger control
//!     //
//!     // per-actuator targets need the individual finger control option
//!     gripper.set_individual_fingers(true);
//!     gripper.set_target(Actuator::FingerB, 0x40, 0xFF, 0x20)?;
//!     gripper.set_go_to(true);
//!     let feedback = gripper.issue_cycle().await?;
//!     println!(
//!         "finger B at {} drawing about {} mA",
//!         feedback.position(Actuator::FingerB),
//!         10 * feedback.current(Actuator::FingerB) as u32,
//!     );
//!
//!     // Scissor mode
//!     //
//!     // the scissor axis is driven alone, finger targets are ignored
//!     gripper.set_mode(GripperMode::Scissor);
//!     gripper.set_target(Actuator::Scissor, 0x00, 0x40, 0x40)?;
//!     gripper.set_go_to(true);
//!     gripper.issue_cycle().await?;
//!     let snapshot = gripper.await_go_to().await?;
//!     println!("scissor at target: {}", snapshot.all_at_target);
//!
//!     // Automatic Release Routine
//!     //
//!     // slowly opens every axis to its mechanical limit; the gripper must
//!     // be reset and reactivated afterwards
//!     gripper.set_mode(GripperMode::Basic);
//!     gripper.automatic_release().await?.await_automatic_release().await?;
//!     gripper.reset().await?.activate().await?.await_activate().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod grasp;
pub mod gripper;
pub mod registers;
pub mod target;

pub use grasp::*;
pub use gripper::*;
pub use registers::*;
pub use target::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RobotiqError {
    #[error("std io error, transport comm error")]
    IOError(#[from] std::io::Error),
    #[error("target {field:?} value {value} outside of protocol range 0x00-0xFF")]
    OutOfRange { field: TargetField, value: u16 },
    #[error("{actuator:?} takes no target in {mode:?} mode")]
    InvalidModeTransition {
        actuator: Actuator,
        mode: GripperMode,
    },
    #[error("malformed {context}, expected {expected}, got {actual}")]
    MalformedFrame {
        context: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("reserved bits set in status byte {byte}, protocol desync")]
    ReservedBitSet { byte: usize },
    #[error("controller rejected command, exception code 0x{code:02X}")]
    Reject { code: u8 },
    #[error("gripper fault")]
    GripperFault(#[from] GripperFault),
    #[error("controller response timed out")]
    Timeout,
    #[error("heartbeat lost contact with controller")]
    LinkLost,
}
