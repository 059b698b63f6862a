//! Deterministic test doubles for the Yeelock driver.
//!
//! Real BLE hardware makes protocol tests non-reproducible: radios drop
//! packets at their own whim, connects take wall-clock seconds, and a lock
//! bolted to a door is a poor CI fixture. This crate replaces the two
//! injected dependencies of the driver with instrumented doubles:
//!
//! - [`SimEnv`]: a controllable clock. `unix_time` starts from a fixed base
//!   so encoded frames are byte-exact in assertions; `advance` moves both
//!   clocks and wakes expired sleepers; `sleep` completes only when the
//!   clock passes its deadline, never by consuming wall time.
//! - [`FakeTransport`]: an in-memory GATT peripheral. It counts connect
//!   attempts (for the single-in-flight-connect property), records every
//!   characteristic write, injects connect and write failures, drops the
//!   link, and pushes notification payloads into an active subscription.
//!
//! Integration tests for the session lifecycle, the recovery protocol, and
//! the concurrency properties live in `tests/`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fake_transport;
pub mod sim_env;

pub use fake_transport::{FakeConnection, FakeTransport};
pub use sim_env::SimEnv;
