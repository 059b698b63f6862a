//! Lock state machine.
//!
//! Interprets notification bytes from the peripheral, owns the externally
//! visible lock state, and drives the time-sync-and-replay recovery
//! protocol.
//!
//! # Architecture: Action-Based State Machine
//!
//! This state machine follows the action pattern:
//! - Methods accept time as a parameter (no stored Environment)
//! - Methods return `Vec<MachineAction>` for a driver to execute
//!
//! This keeps the protocol logic pure: no I/O, no clock reads, trivially
//! testable.
//!
//! # Optimistic vs. confirmed state
//!
//! Issuing `Lock`/`Unlock` immediately moves the state to the in-progress
//! variant before any write completes, so the entity layer reacts
//! instantly. The authoritative terminal state only arrives by
//! notification. A write that fails at the transport layer therefore
//! leaves the state parked in the in-progress variant until a later
//! notification, operation, or [`LockMachine::poll`] timeout corrects it,
//! trading strict consistency for responsiveness.
//!
//! # Recovery
//!
//! A `0x09` notification means the device clock has drifted and the frame's
//! timestamp was rejected. The machine emits exactly one time-sync command
//! plus one replay of the operation that was in progress when the
//! notification arrived. There is no retry counter: a device that keeps
//! reporting desync after a resync loops once per notification event. That
//! is the agreed behavior; capping it is a product decision.

use std::{
    fmt,
    time::{Duration, Instant},
};

use yeelock_proto::{Command, Status, decode_notification};

/// Externally visible lock state.
///
/// Only the state machine mutates this, either optimistically when an
/// operation is issued or from a notification decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    /// Bolt thrown.
    Locked,
    /// Bolt withdrawn.
    Unlocked,
    /// Lock commanded or observed in progress.
    Locking,
    /// Unlock commanded or observed in progress.
    Unlocking,
    /// The mechanism did not complete a transition, or the device reported
    /// a failure.
    Jammed,
}

impl fmt::Display for LockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Locked => "locked",
            Self::Unlocked => "unlocked",
            Self::Locking => "locking",
            Self::Unlocking => "unlocking",
            Self::Jammed => "jammed",
        })
    }
}

/// Actions returned by the state machine.
///
/// The driver executes these: announcements go to registered observers,
/// send actions are encoded fresh and written to the command
/// characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineAction {
    /// Push the new state to observers.
    Announce(LockState),
    /// Encode and write this command to the device.
    Send(Command),
}

/// State machine configuration.
#[derive(Debug, Clone)]
pub struct MachineConfig {
    /// How long an issued `Lock`/`Unlock` may wait for a notification
    /// before [`LockMachine::poll`] demotes the state to `Jammed`.
    pub command_timeout: Duration,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self { command_timeout: Duration::from_secs(15) }
    }
}

/// A `Lock`/`Unlock` awaiting its confirming notification.
#[derive(Debug, Clone, Copy)]
struct Pending {
    command: Command,
    issued_at: Instant,
}

/// Notification-driven lock state machine.
///
/// The initial state is `Locked`: the device cannot be queried for its
/// state, so the original assumption is kept and the first notification
/// corrects it if wrong.
#[derive(Debug, Clone)]
pub struct LockMachine {
    state: LockState,
    config: MachineConfig,
    pending: Option<Pending>,
}

impl LockMachine {
    /// Create a machine in the `Locked` state with no pending command.
    pub fn new(config: MachineConfig) -> Self {
        Self { state: LockState::Locked, config, pending: None }
    }

    /// Current state.
    pub fn state(&self) -> LockState {
        self.state
    }

    /// The configured pending-command timeout.
    pub fn command_timeout(&self) -> Duration {
        self.config.command_timeout
    }

    /// Record that an operation was issued, before its frame is written.
    ///
    /// `Lock`/`Unlock` transition optimistically to the in-progress state
    /// and start the timeout window. `QuickUnlock` and `TimeSync` are
    /// fire-and-forget: the device's own notifications drive any state
    /// change they cause.
    pub fn command_issued(&mut self, command: Command, now: Instant) -> Vec<MachineAction> {
        match command {
            Command::Lock => {
                self.pending = Some(Pending { command, issued_at: now });
                self.transition(LockState::Locking)
            }
            Command::Unlock => {
                self.pending = Some(Pending { command, issued_at: now });
                self.transition(LockState::Unlocking)
            }
            Command::QuickUnlock | Command::TimeSync => Vec::new(),
        }
    }

    /// Feed a notification payload from the peripheral.
    ///
    /// Never fails: anomalous input transitions to `Jammed` instead. A
    /// notification is matched to the most recent outstanding operation by
    /// state; the protocol has no correlation token.
    pub fn notification_received(&mut self, payload: &[u8]) -> Vec<MachineAction> {
        match decode_notification(payload) {
            Status::Unlocking => self.transition(LockState::Unlocking),
            Status::Locking => self.transition(LockState::Locking),
            Status::Unlocked => {
                self.pending = None;
                self.transition(LockState::Unlocked)
            }
            Status::Locked => {
                self.pending = None;
                self.transition(LockState::Locked)
            }
            Status::ClockDesync => self.recover_from_desync(),
            Status::KeyRejected => {
                tracing::error!("device rejected the command signature");
                self.pending = None;
                self.transition(LockState::Jammed)
            }
            Status::Unknown => {
                tracing::error!(?payload, "unrecognized notification");
                self.pending = None;
                self.transition(LockState::Jammed)
            }
        }
    }

    /// Check the pending-command timeout.
    ///
    /// If a `Lock`/`Unlock` has waited longer than
    /// [`MachineConfig::command_timeout`] with the state still in progress,
    /// demote to `Jammed` rather than leaving the state hung forever.
    pub fn poll(&mut self, now: Instant) -> Vec<MachineAction> {
        let Some(pending) = self.pending else {
            return Vec::new();
        };
        if now.duration_since(pending.issued_at) < self.config.command_timeout {
            return Vec::new();
        }
        self.pending = None;
        if !matches!(self.state, LockState::Locking | LockState::Unlocking) {
            return Vec::new();
        }
        tracing::warn!(command = ?pending.command, "no notification within timeout");
        self.transition(LockState::Jammed)
    }

    /// Handle a `0x09` clock-desync rejection.
    ///
    /// One time sync, then one replay of whichever operation was in flight
    /// when the notification arrived. Replays go back through the driver
    /// and re-enter via [`Self::command_issued`].
    fn recover_from_desync(&mut self) -> Vec<MachineAction> {
        tracing::warn!("device clock needs syncing");
        let prior = self.state;
        self.pending = None;

        let mut actions = self.transition(LockState::Jammed);
        actions.push(MachineAction::Send(Command::TimeSync));
        match prior {
            LockState::Locking => actions.push(MachineAction::Send(Command::Lock)),
            LockState::Unlocking => actions.push(MachineAction::Send(Command::Unlock)),
            LockState::Locked | LockState::Unlocked | LockState::Jammed => {}
        }
        actions
    }

    fn transition(&mut self, next: LockState) -> Vec<MachineAction> {
        tracing::debug!(from = %self.state, to = %next, "lock state transition");
        self.state = next;
        vec![MachineAction::Announce(next)]
    }
}
