//! Fuzz target for [`LockMachine`]
//!
//! The peripheral must never be able to wedge or crash the coordinator.
//!
//! # Strategy
//!
//! - Event sequences: arbitrary interleavings of issued commands,
//!   notification payloads, and timeout polls with advancing time
//! - Garbage payloads: empty, unknown status bytes, long trailers
//! - Desync storms: repeated 0x09 to exercise the replay path
//!
//! # Invariants
//!
//! - NEVER panic on any payload or event order
//! - At most one announcement per event, and it matches `state()`
//! - Send actions only ever follow a clock-desync notification, at most a
//!   time sync plus one replay
//! - Poll without an expired pending command produces nothing

#![no_main]

use std::time::{Duration, Instant};

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use yeelock_core::{LockMachine, MachineAction, MachineConfig};
use yeelock_proto::Command;

#[derive(Debug, Clone, Arbitrary)]
enum MachineEvent {
    IssueLock,
    IssueUnlock,
    IssueQuickUnlock,
    IssueTimeSync,
    Notification(Vec<u8>),
    Poll { advance_secs: u8 },
}

fuzz_target!(|events: Vec<MachineEvent>| {
    let mut machine = LockMachine::new(MachineConfig::default());
    let base = Instant::now();
    let mut elapsed = Duration::ZERO;

    for event in events {
        let now = base + elapsed;
        let was_desync;

        let actions = match event {
            MachineEvent::IssueLock => {
                was_desync = false;
                machine.command_issued(Command::Lock, now)
            }
            MachineEvent::IssueUnlock => {
                was_desync = false;
                machine.command_issued(Command::Unlock, now)
            }
            MachineEvent::IssueQuickUnlock => {
                was_desync = false;
                machine.command_issued(Command::QuickUnlock, now)
            }
            MachineEvent::IssueTimeSync => {
                was_desync = false;
                machine.command_issued(Command::TimeSync, now)
            }
            MachineEvent::Notification(payload) => {
                was_desync = payload.first() == Some(&0x09);
                machine.notification_received(&payload)
            }
            MachineEvent::Poll { advance_secs } => {
                was_desync = false;
                elapsed += Duration::from_secs(u64::from(advance_secs % 120));
                machine.poll(base + elapsed)
            }
        };

        let announcements =
            actions.iter().filter(|a| matches!(a, MachineAction::Announce(_))).count();
        let sends = actions.iter().filter(|a| matches!(a, MachineAction::Send(_))).count();

        assert!(announcements <= 1, "at most one announcement per event");
        if let Some(MachineAction::Announce(state)) = actions.first() {
            assert_eq!(*state, machine.state(), "announcement must match state");
        }
        if was_desync {
            assert!(sends <= 2, "desync recovery is one sync plus at most one replay");
        } else {
            assert_eq!(sends, 0, "only desync notifications send commands");
        }
    }
});
