//! Grasp state derived from polled status feedback.
//!
//! The controller reports levels: an actuator that clamped an object keeps
//! its detection bits set for as long as the grip holds. Callers want edges,
//! "an object was just detected", reported once. The tracker keeps the
//! previous cycle's feedback and a small per-actuator state machine and
//! emits an event only when a state is entered.

use serde::{Deserialize, Serialize};

use crate::registers::{Actuator, GripperFault, GripperMode, ObjDetectStatus, StatusFeedback};

/// Semantic state of one actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GraspState {
    /// No motion requested, or the actuator is uncontrolled in the current mode.
    Idle,
    /// Moving towards the requested position.
    Moving,
    /// Reached the requested position without contact.
    AtTarget,
    /// Stopped against an object while closing.
    ObjectDetectedClosing,
    /// Stopped against an object while opening.
    ObjectDetectedOpening,
}

impl GraspState {
    pub fn object_detected(self) -> bool {
        matches!(
            self,
            GraspState::ObjectDetectedClosing | GraspState::ObjectDetectedOpening
        )
    }
}

impl Default for GraspState {
    fn default() -> Self {
        GraspState::Idle
    }
}

/// Edge event emitted when an actuator enters a new state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraspEvent {
    pub actuator: Actuator,
    pub state: GraspState,
}

/// Read-only view of the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraspSnapshot {
    /// Per-actuator state, indexed by [`Actuator`].
    pub states: [GraspState; 4],
    /// Conjunction of [`GraspState::AtTarget`] over the actuators active
    /// under the last reported mode. Actuators the mode leaves uncontrolled
    /// are excluded, stale finger positions in scissor mode cannot veto it.
    pub all_at_target: bool,
}

impl GraspSnapshot {
    pub fn state(&self, actuator: Actuator) -> GraspState {
        self.states[actuator.index()]
    }

    pub fn any_moving(&self) -> bool {
        self.states.contains(&GraspState::Moving)
    }
}

/// Per-actuator grasp state machine fed by decoded status frames.
#[derive(Debug, Default)]
pub struct GraspTracker {
    states: [GraspState; 4],
    prev: Option<StatusFeedback>,
}

impl GraspTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything and return every actuator to Idle. Used on
    /// deactivation and after a session is re-established.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Fold one decoded status frame into the tracker.
    ///
    /// Returns the transitions this frame caused, at most one per actuator.
    /// A detection level held across consecutive polls produces a single
    /// event, the retained previous frame is what distinguishes a fresh
    /// edge from a sustained report. The detection bits themselves are
    /// trusted as-is, the controller already debounces them in hardware.
    pub fn update(&mut self, status: &StatusFeedback) -> Vec<GraspEvent> {
        let mut events = Vec::new();
        for actuator in Actuator::ALL {
            let next = self.next_state(actuator, status);
            let entered = next != self.states[actuator.index()];
            self.states[actuator.index()] = next;
            if entered && next != GraspState::Idle && self.changed_since_prev(actuator, status) {
                events.push(GraspEvent {
                    actuator,
                    state: next,
                });
            }
        }
        self.prev = Some(status.clone());
        events
    }

    /// Latest per-actuator states plus the gripper-level conjunction.
    pub fn snapshot(&self) -> GraspSnapshot {
        let all_at_target = match &self.prev {
            Some(status) => Actuator::ALL
                .into_iter()
                .filter(|a| Self::active_in(status.mode, *a))
                .all(|a| self.states[a.index()] == GraspState::AtTarget),
            None => false,
        };
        GraspSnapshot {
            states: self.states,
            all_at_target,
        }
    }

    /// The feedback frame the last update was compared against.
    pub fn history(&self) -> Option<&StatusFeedback> {
        self.prev.as_ref()
    }

    pub fn state(&self, actuator: Actuator) -> GraspState {
        self.states[actuator.index()]
    }

    /// Which actuators the reported mode actually drives.
    fn active_in(mode: GripperMode, actuator: Actuator) -> bool {
        match mode {
            GripperMode::Scissor => actuator == Actuator::Scissor,
            _ => actuator.is_finger(),
        }
    }

    fn next_state(&self, actuator: Actuator, status: &StatusFeedback) -> GraspState {
        if !status.act || !status.gto || !Self::active_in(status.mode, actuator) {
            return GraspState::Idle;
        }
        match status.detection(actuator) {
            ObjDetectStatus::InMotion => GraspState::Moving,
            ObjDetectStatus::DetectedOpen => GraspState::ObjectDetectedOpening,
            ObjDetectStatus::DetectedClose => GraspState::ObjectDetectedClosing,
            ObjDetectStatus::NoObject => {
                if status.fault == GripperFault::NoFault {
                    GraspState::AtTarget
                } else {
                    // a faulted at-position report is not a completed move,
                    // hold the last state until the fault clears
                    self.states[actuator.index()]
                }
            }
        }
    }

    fn changed_since_prev(&self, actuator: Actuator, status: &StatusFeedback) -> bool {
        match &self.prev {
            Some(prev) => {
                prev.detection(actuator) != status.detection(actuator)
                    || prev.act != status.act
                    || prev.gto != status.gto
                    || prev.mode != status.mode
            }
            None => true,
        }
    }
}
