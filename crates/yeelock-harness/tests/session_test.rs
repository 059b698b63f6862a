//! Session lifecycle tests: lazy connect, write containment, reconnects.
#![allow(clippy::unwrap_used, clippy::panic)]

use std::sync::Arc;

use yeelock_client::{
    DeviceAddress, DeviceError, DeviceIdentity, LockState, SigningKey, TransportError,
    YeelockDevice,
};
use yeelock_harness::{FakeTransport, SimEnv};
use yeelock_proto::{COMMAND_CHARACTERISTIC, Command, FRAME_LEN};

const KEY_HEX: &str = "00112233445566778899aabbccddeeff";
const UNIX_BASE: u64 = 1_700_000_000;

fn signing_key() -> SigningKey {
    SigningKey::from_hex(KEY_HEX).unwrap()
}

fn device(transport: &FakeTransport) -> Arc<YeelockDevice<FakeTransport, SimEnv>> {
    let identity = DeviceIdentity::new(
        DeviceAddress::new("F8:24:41:C5:98:8B"),
        "Front door",
        signing_key(),
    );
    YeelockDevice::new(identity, transport.clone(), SimEnv::new())
}

#[tokio::test]
async fn first_command_connects_lazily_and_writes_an_exact_frame() {
    let transport = FakeTransport::new();
    let device = device(&transport);
    assert_eq!(transport.connect_attempts(), 0);

    device.lock().await.unwrap();

    assert_eq!(transport.connect_attempts(), 1);
    assert!(device.is_connected());
    assert_eq!(device.state(), LockState::Locking);

    let writes = transport.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].0, COMMAND_CHARACTERISTIC);
    // The sim clock is pinned, so the frame is byte-exact.
    let expected = Command::Lock
        .encode(&signing_key(), UNIX_BASE)
        .unwrap();
    assert_eq!(writes[0].1, expected);
    assert_eq!(writes[0].1.len(), FRAME_LEN);
}

#[tokio::test]
async fn later_commands_reuse_the_connection() {
    let transport = FakeTransport::new();
    let device = device(&transport);

    device.lock().await.unwrap();
    device.unlock().await.unwrap();
    device.quick_unlock().await.unwrap();

    assert_eq!(transport.connect_attempts(), 1);
    assert_eq!(transport.writes().len(), 3);
}

#[tokio::test]
async fn unlock_family_mode_bytes_reach_the_wire() {
    let transport = FakeTransport::new();
    let device = device(&transport);

    device.quick_unlock().await.unwrap();
    device.unlock().await.unwrap();
    device.lock().await.unwrap();
    device.time_sync().await.unwrap();

    let writes = transport.writes();
    assert_eq!(writes[0].1[6], 0x00);
    assert_eq!(writes[1].1[6], 0x01);
    assert_eq!(writes[2].1[6], 0x02);
    assert_eq!(writes[3].1[0], 0x08);
}

#[tokio::test]
async fn write_failure_is_contained_and_leaves_optimistic_state() {
    let transport = FakeTransport::new();
    let device = device(&transport);
    transport.fail_next_write();

    // The caller sees success; the failure shows up as session state.
    device.lock().await.unwrap();

    assert!(!device.is_connected());
    assert!(transport.writes().is_empty());
    assert_eq!(device.state(), LockState::Locking);
}

#[tokio::test]
async fn next_command_reconnects_when_the_link_is_down() {
    let transport = FakeTransport::new();
    let device = device(&transport);

    transport.fail_next_write();
    device.lock().await.unwrap();
    transport.drop_link();

    device.lock().await.unwrap();

    assert_eq!(transport.connect_attempts(), 2);
    assert_eq!(transport.writes().len(), 1);
    assert!(device.is_connected());
}

#[tokio::test]
async fn unresolvable_address_surfaces_as_transient_error() {
    let transport = FakeTransport::new();
    let device = device(&transport);
    transport.fail_next_connect();

    let err = device.lock().await;
    match err {
        Err(DeviceError::Transport(TransportError::DeviceNotFound { address })) => {
            assert_eq!(address.as_str(), "F8:24:41:C5:98:8B");
        }
        other => panic!("expected DeviceNotFound, got {other:?}"),
    }

    // The optimistic transition already happened; a later retry reconnects.
    assert_eq!(device.state(), LockState::Locking);
    device.lock().await.unwrap();
    assert_eq!(transport.connect_attempts(), 2);
}

#[tokio::test]
async fn disconnect_is_idempotent() {
    let transport = FakeTransport::new();
    let device = device(&transport);

    device.lock().await.unwrap();
    device.disconnect().await;
    device.disconnect().await;
    assert!(!device.is_connected());

    device.lock().await.unwrap();
    assert_eq!(transport.connect_attempts(), 2);
}
