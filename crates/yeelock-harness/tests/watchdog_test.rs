//! Command timeout tests: an operation whose confirming notification never
//! arrives is demoted to jammed instead of hanging in progress.
#![allow(clippy::unwrap_used, clippy::panic)]

use std::{sync::Arc, time::Duration};

use yeelock_client::{DeviceAddress, DeviceIdentity, LockState, SigningKey, YeelockDevice};
use yeelock_harness::{FakeTransport, SimEnv};

fn device(transport: &FakeTransport, env: &SimEnv) -> Arc<YeelockDevice<FakeTransport, SimEnv>> {
    let key = SigningKey::from_hex("00112233445566778899aabbccddeeff").unwrap();
    let identity = DeviceIdentity::new(DeviceAddress::new("F8:24:41:C5:98:8B"), "Front door", key);
    YeelockDevice::new(identity, transport.clone(), env.clone())
}

/// Spin (in virtual time) until the condition holds.
async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached in time");
}

#[tokio::test(start_paused = true)]
async fn silent_device_times_out_to_jammed() {
    let transport = FakeTransport::new();
    let env = SimEnv::new();
    let device = device(&transport, &env);

    device.lock().await.unwrap();
    assert_eq!(device.state(), LockState::Locking);

    env.advance(Duration::from_secs(16));
    wait_until(|| device.state() == LockState::Jammed).await;
    assert_eq!(transport.writes().len(), 1, "a timeout never sends commands");
}

#[tokio::test(start_paused = true)]
async fn failed_connect_still_times_out_to_jammed() {
    let transport = FakeTransport::new();
    let env = SimEnv::new();
    let device = device(&transport, &env);
    transport.fail_next_connect();

    assert!(device.lock().await.is_err());
    assert_eq!(device.state(), LockState::Locking);

    // No write ever happened, so only the timeout can unpark the state.
    env.advance(Duration::from_secs(16));
    wait_until(|| device.state() == LockState::Jammed).await;
    assert!(transport.writes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn demotion_waits_out_the_full_window() {
    let transport = FakeTransport::new();
    let env = SimEnv::new();
    let device = device(&transport, &env);

    device.unlock().await.unwrap();
    env.advance(Duration::from_secs(10));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(device.state(), LockState::Unlocking);

    env.advance(Duration::from_secs(6));
    wait_until(|| device.state() == LockState::Jammed).await;
}

#[tokio::test(start_paused = true)]
async fn confirmed_command_is_not_demoted() {
    let transport = FakeTransport::new();
    let env = SimEnv::new();
    let device = device(&transport, &env);

    device.lock().await.unwrap();
    assert!(transport.notify(vec![0x05]).await);
    wait_until(|| device.state() == LockState::Locked).await;

    env.advance(Duration::from_secs(60));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(device.state(), LockState::Locked);
}
