//! Gripper session: the command cycle driver and the link keeper.
//!
//! A session owns the target store, the grasp tracker and a shared handle to
//! an already-established transport. Commands run one cycle at a time
//! through [`Robotiq3fGripper::issue_cycle`]; a background heartbeat keeps
//! the controller from dropping the session between cycles. The two only
//! contend for the transport lock, so a heartbeat can never interleave with
//! a command exchange mid-frame.

use std::future::Future;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, timeout, MissedTickBehavior};
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, trace, warn};

use crate::grasp::{GraspEvent, GraspSnapshot, GraspState, GraspTracker};
use crate::registers::{
    self, ActivationStatus, Actuator, GripperFault, GripperMode, StatusFeedback, ACK_FRAME_LEN,
    STATUS_RESPONSE_LEN,
};
use crate::target::{ActuatorTarget, TargetField};
use crate::RobotiqError;

/// Byte transport over an already-established controller session.
///
/// The session is opened, configured and re-established elsewhere; this
/// trait only moves whole frames. Any `AsyncRead + AsyncWrite` stream
/// implements it, so TCP sockets, serial ports and in-memory pipes all fit.
pub trait Transport: Send {
    /// Write one whole frame.
    fn send(&mut self, frame: &[u8]) -> impl Future<Output = io::Result<()>> + Send;
    /// Read exactly `buf.len()` bytes.
    fn recv(&mut self, buf: &mut [u8]) -> impl Future<Output = io::Result<()>> + Send;
}

impl<S> Transport for S
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, frame: &[u8]) -> io::Result<()> {
        AsyncWriteExt::write_all(self, frame).await?;
        AsyncWriteExt::flush(self).await
    }

    async fn recv(&mut self, buf: &mut [u8]) -> io::Result<()> {
        AsyncReadExt::read_exact(self, buf).await.map(|_| ())
    }
}

/// Timing knobs of a gripper session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Bound on each transport read or write inside a command cycle.
    pub cycle_timeout: Duration,
    /// Period of the background heartbeat.
    pub heartbeat_period: Duration,
    /// Consecutive heartbeat misses tolerated before the link counts as lost.
    pub heartbeat_misses: u32,
    /// Poll period of the `await_*` routines.
    pub poll_period: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cycle_timeout: Duration::from_millis(500),
            heartbeat_period: Duration::from_secs(1),
            heartbeat_misses: 3,
            poll_period: Duration::from_millis(100),
        }
    }
}

/// Background task that keeps the controller session alive between command
/// cycles by polling the status registers on a timer.
///
/// Individual misses are retried transparently on the next tick. A run of
/// consecutive misses latches the lost flag, which fails every later cycle
/// with [`RobotiqError::LinkLost`] until the session is re-established.
#[derive(Debug)]
struct LinkKeeper {
    link_lost: Arc<AtomicBool>,
    shutdown: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl LinkKeeper {
    fn spawn<T: Transport + 'static>(transport: Arc<Mutex<T>>, config: &SessionConfig) -> Self {
        let link_lost = Arc::new(AtomicBool::new(false));
        let shutdown = Arc::new(AtomicBool::new(false));
        let task = tokio::spawn(Self::run(
            transport,
            config.heartbeat_period,
            config.cycle_timeout,
            config.heartbeat_misses,
            link_lost.clone(),
            shutdown.clone(),
        ));
        Self {
            link_lost,
            shutdown,
            task,
        }
    }

    fn is_lost(&self) -> bool {
        self.link_lost.load(Ordering::Relaxed)
    }

    async fn run<T: Transport>(
        transport: Arc<Mutex<T>>,
        period: Duration,
        step_timeout: Duration,
        allowed_misses: u32,
        link_lost: Arc<AtomicBool>,
        shutdown: Arc<AtomicBool>,
    ) {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick of an interval fires immediately
        ticker.tick().await;

        let mut misses = 0u32;
        loop {
            ticker.tick().await;
            if shutdown.load(Ordering::Relaxed) {
                return;
            }
            match Self::beat(&transport, step_timeout).await {
                Ok(()) => {
                    misses = 0;
                    trace!("heartbeat ok");
                }
                Err(err) => {
                    misses += 1;
                    warn!(error = %err, misses, "heartbeat missed");
                    if misses >= allowed_misses {
                        link_lost.store(true, Ordering::Relaxed);
                        warn!("link to controller lost");
                        return;
                    }
                }
            }
        }
    }

    async fn beat<T: Transport>(
        transport: &Mutex<T>,
        step_timeout: Duration,
    ) -> Result<(), RobotiqError> {
        let mut session = transport.lock().await;
        timeout(step_timeout, session.send(&registers::status_request()))
            .await
            .map_err(|_| RobotiqError::Timeout)??;
        let mut response = [0u8; STATUS_RESPONSE_LEN];
        timeout(step_timeout, session.recv(&mut response))
            .await
            .map_err(|_| RobotiqError::Timeout)??;
        registers::unwrap_status(&response).map(|_| ())
    }
}

impl Drop for LinkKeeper {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        self.task.abort();
    }
}

/// Data structure for interfacing with a Robotiq 3-Finger Adaptive Gripper
/// over an established register-protocol session.
pub struct Robotiq3fGripper<T> {
    transport: Arc<Mutex<T>>,
    target: ActuatorTarget,
    tracker: GraspTracker,
    pending_events: Vec<GraspEvent>,
    config: SessionConfig,
    link: LinkKeeper,
}

impl<T: Transport + 'static> Robotiq3fGripper<T> {
    /// Constructor from an established transport, with default timing.
    ///
    /// Must be called within a Tokio runtime, the link keeper starts here.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, SessionConfig::default())
    }

    /// Constructor with explicit timing knobs.
    pub fn with_config(transport: T, config: SessionConfig) -> Self {
        let transport = Arc::new(Mutex::new(transport));
        let link = LinkKeeper::spawn(transport.clone(), &config);
        Self {
            transport,
            target: ActuatorTarget::new(),
            tracker: GraspTracker::new(),
            pending_events: Vec::new(),
            config,
            link,
        }
    }

    /// Set a single target field for one actuator.
    pub fn set(
        &mut self,
        actuator: Actuator,
        field: TargetField,
        value: u16,
    ) -> Result<(), RobotiqError> {
        self.target.set(actuator, field, value)
    }

    /// Set position, speed and force for one actuator.
    pub fn set_target(
        &mut self,
        actuator: Actuator,
        position: u16,
        speed: u16,
        force: u16,
    ) -> Result<(), RobotiqError> {
        self.target.set_target(actuator, position, speed, force)
    }

    /// Select the operation mode for the next cycle.
    pub fn set_mode(&mut self, mode: GripperMode) {
        self.target.set_mode(mode);
    }

    /// Set or clear the activation bit. Clearing it invalidates every motion
    /// target and returns the grasp tracker to Idle.
    pub fn set_activation(&mut self, act: bool) {
        self.target.set_activation(act);
        if !act {
            self.tracker.reset();
            self.pending_events.clear();
        }
    }

    /// Set or clear the go-to bit.
    pub fn set_go_to(&mut self, gto: bool) {
        self.target.set_go_to(gto);
    }

    /// Request the automatic release routine on the next cycle.
    pub fn set_auto_release(&mut self, atr: bool) {
        self.target.set_auto_release(atr);
    }

    /// Let the controller keep the scissor axis centered.
    pub fn set_auto_center(&mut self, acr: bool) {
        self.target.set_auto_center(acr);
    }

    /// Enable individual control of fingers B and C.
    pub fn set_individual_fingers(&mut self, icf: bool) {
        self.target.set_individual_fingers(icf);
    }

    /// Enable individual control of the scissor axis.
    pub fn set_individual_scissor(&mut self, ics: bool) {
        self.target.set_individual_scissor(ics);
    }

    /// The currently commanded target state.
    pub fn target(&self) -> &ActuatorTarget {
        &self.target
    }

    /// Whether the link keeper still reaches the controller.
    pub fn link_alive(&self) -> bool {
        !self.link.is_lost()
    }

    /// Read-only view of the grasp tracker.
    pub fn current_grasp_state(&self) -> GraspSnapshot {
        self.tracker.snapshot()
    }

    /// The last decoded feedback frame, if any cycle completed.
    pub fn last_status(&self) -> Option<&StatusFeedback> {
        self.tracker.history()
    }

    /// Drain the grasp transitions accumulated since the last call.
    pub fn take_events(&mut self) -> Vec<GraspEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Run one command cycle: encode the current targets, write the command
    /// register, await the acknowledgment, poll and decode the status
    /// register, then fold the feedback into the grasp tracker.
    ///
    /// Every transport step is bounded by the configured timeout. A declined
    /// command surfaces as [`RobotiqError::Reject`], a failure fault code as
    /// [`RobotiqError::GripperFault`] after the tracker update, so feedback
    /// is never dropped. Motion commands are not retried here, resubmitting
    /// a physical target is the caller's decision.
    pub async fn issue_cycle(&mut self) -> Result<StatusFeedback, RobotiqError> {
        if !self.link_alive() {
            return Err(RobotiqError::LinkLost);
        }

        let frame = registers::encode(&self.target);
        let step = self.config.cycle_timeout;

        let status = {
            let mut session = self.transport.lock().await;

            timeout(step, session.send(&frame))
                .await
                .map_err(|_| RobotiqError::Timeout)??;

            let mut ack = [0u8; ACK_FRAME_LEN];
            timeout(step, session.recv(&mut ack))
                .await
                .map_err(|_| RobotiqError::Timeout)??;
            registers::parse_ack(&ack)?;

            timeout(step, session.send(&registers::status_request()))
                .await
                .map_err(|_| RobotiqError::Timeout)??;

            let mut response = [0u8; STATUS_RESPONSE_LEN];
            timeout(step, session.recv(&mut response))
                .await
                .map_err(|_| RobotiqError::Timeout)??;
            registers::decode(registers::unwrap_status(&response)?)?
        };

        let events = self.tracker.update(&status);
        debug!(
            fault = ?status.fault,
            motion = ?status.motion,
            transitions = events.len(),
            "command cycle complete"
        );
        self.pending_events.extend(events);

        if status.fault.is_failure() {
            return Err(RobotiqError::GripperFault(status.fault));
        }
        Ok(status)
    }

    /// Clear the activation bit to reset the gripper and any fault status.
    pub async fn reset(&mut self) -> Result<&mut Self, RobotiqError> {
        self.set_activation(false);
        self.issue_cycle().await?;
        Ok(self)
    }

    /// Set the activation bit to start initialization of the gripper.
    pub async fn activate(&mut self) -> Result<&mut Self, RobotiqError> {
        self.set_activation(true);
        self.issue_cycle().await?;
        Ok(self)
    }

    /// Await for the initialization process to finish.
    pub async fn await_activate(&mut self) -> Result<&mut Self, RobotiqError> {
        loop {
            let status = self.issue_cycle().await?;
            if status.sta == ActivationStatus::Completed {
                return Ok(self);
            }
            sleep(self.config.poll_period).await;
        }
    }

    /// Command the driven actuators to a set point with specified position,
    /// speed and force.
    ///
    /// In the finger modes the target goes to finger A, and to B and C as
    /// well when individual finger control is on. In scissor mode it goes to
    /// the scissor axis.
    pub async fn go_to(
        &mut self,
        position: u16,
        speed: u16,
        force: u16,
    ) -> Result<&mut Self, RobotiqError> {
        if self.target.mode() == GripperMode::Scissor {
            self.target
                .set_target(Actuator::Scissor, position, speed, force)?;
        } else {
            self.target
                .set_target(Actuator::FingerA, position, speed, force)?;
            if self.target.individual_fingers() {
                self.target
                    .set_target(Actuator::FingerB, position, speed, force)?;
                self.target
                    .set_target(Actuator::FingerC, position, speed, force)?;
            }
        }
        self.target.set_go_to(true);
        self.issue_cycle().await?;
        Ok(self)
    }

    /// Await for the go-to command to finish.
    ///
    /// Returns the final grasp snapshot once no driven actuator is still
    /// moving, whether it reached the target or clamped an object.
    pub async fn await_go_to(&mut self) -> Result<GraspSnapshot, RobotiqError> {
        loop {
            self.issue_cycle().await?;
            let snapshot = self.tracker.snapshot();
            let started = snapshot.states.iter().any(|s| *s != GraspState::Idle);
            if started && !snapshot.any_moving() {
                return Ok(snapshot);
            }
            sleep(self.config.poll_period).await;
        }
    }

    /// Start the automatic release routine. It slowly opens all axes to
    /// their mechanical limits; the gripper must be reset and reactivated
    /// afterwards.
    pub async fn automatic_release(&mut self) -> Result<&mut Self, RobotiqError> {
        self.target.set_auto_release(true);
        self.issue_cycle().await?;
        Ok(self)
    }

    /// Await for the automatic release routine to finish.
    pub async fn await_automatic_release(&mut self) -> Result<&mut Self, RobotiqError> {
        loop {
            let status = self.issue_cycle().await?;
            if status.fault == GripperFault::AutomaticReleaseCompleted {
                return Ok(self);
            }
            sleep(self.config.poll_period).await;
        }
    }
}

impl Robotiq3fGripper<TcpStream> {
    /// Constructor over the controller's TCP command endpoint.
    pub async fn connect(addr: impl ToSocketAddrs) -> Result<Self, std::io::Error> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        Ok(Self::new(stream))
    }
}

impl Robotiq3fGripper<tokio_serial::SerialStream> {
    /// Constructor from a serial port path.
    pub fn from_path(path: impl Into<String>) -> Result<Self, std::io::Error> {
        let port = tokio_serial::new(path.into(), 115_200)
            .data_bits(tokio_serial::DataBits::Eight)
            .stop_bits(tokio_serial::StopBits::One)
            .parity(tokio_serial::Parity::None)
            .timeout(Duration::from_millis(500))
            .open_native_async()?;
        Ok(Self::new(port))
    }
}
