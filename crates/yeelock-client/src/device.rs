//! Device facade and session management.

use std::future::Future;
use std::sync::{
    Arc, Weak,
    atomic::{AtomicBool, Ordering},
};

use tokio::sync::{Mutex, mpsc, watch};
use yeelock_core::{
    DeviceIdentity, Environment, LockConnection, LockMachine, LockState, MachineAction,
    MachineConfig, Transport,
};
use yeelock_proto::{COMMAND_CHARACTERISTIC, Command, FRAME_LEN, NOTIFY_CHARACTERISTIC};

use crate::error::DeviceError;

/// One Yeelock, composed of its identity, a lazily established session over
/// an external BLE transport, and the lock state machine.
///
/// # Concurrency
///
/// One logical connection per device. The session mutex serializes both
/// connection establishment and command writes: concurrent callers of an
/// operation await the same in-flight connect rather than racing, and no
/// command pipelining happens: the protocol has no request/response
/// correlation, so a notification is matched to the most recent operation
/// by state alone. Notification handling runs in its own task and never
/// blocks the transport's delivery path.
pub struct YeelockDevice<T: Transport, E: Environment> {
    identity: DeviceIdentity,
    transport: T,
    env: E,
    /// Connection handle; absent until first use, discarded on disconnect.
    session: Mutex<Option<T::Connection>>,
    machine: std::sync::Mutex<LockMachine>,
    state_tx: watch::Sender<LockState>,
    /// Last known transport health, for the entity layer.
    connected: AtomicBool,
}

impl<T: Transport, E: Environment> YeelockDevice<T, E> {
    /// Create a device with the default state machine configuration.
    pub fn new(identity: DeviceIdentity, transport: T, env: E) -> Arc<Self> {
        Self::with_config(identity, transport, env, MachineConfig::default())
    }

    /// Create a device with an explicit state machine configuration.
    pub fn with_config(
        identity: DeviceIdentity,
        transport: T,
        env: E,
        config: MachineConfig,
    ) -> Arc<Self> {
        let machine = LockMachine::new(config);
        let (state_tx, _) = watch::channel(machine.state());
        Arc::new(Self {
            identity,
            transport,
            env,
            session: Mutex::new(None),
            machine: std::sync::Mutex::new(machine),
            state_tx,
            connected: AtomicBool::new(false),
        })
    }

    /// The immutable identity this device was configured with.
    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// Current lock state.
    pub fn state(&self) -> LockState {
        *self.state_tx.borrow()
    }

    /// Register an observer: the receiver yields every state transition.
    pub fn state_changes(&self) -> watch::Receiver<LockState> {
        self.state_tx.subscribe()
    }

    /// Last known transport health.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Throw the bolt.
    pub async fn lock(self: &Arc<Self>) -> Result<(), DeviceError> {
        self.command(Command::Lock).await
    }

    /// Withdraw the bolt.
    pub async fn unlock(self: &Arc<Self>) -> Result<(), DeviceError> {
        self.command(Command::Unlock).await
    }

    /// Withdraw the bolt; the device relocks itself shortly after.
    ///
    /// Uses unlock framing with mode `0x00`. The relock happens on the
    /// device without a further command, so there is no distinct decode
    /// path; notifications report it like any other transition.
    pub async fn quick_unlock(self: &Arc<Self>) -> Result<(), DeviceError> {
        self.command(Command::QuickUnlock).await
    }

    /// Push the host's wall clock to the device.
    pub async fn time_sync(self: &Arc<Self>) -> Result<(), DeviceError> {
        self.command(Command::TimeSync).await
    }

    /// Close the session if one is open. Idempotent.
    pub async fn disconnect(&self) {
        let mut session = self.session.lock().await;
        if let Some(connection) = session.take() {
            if connection.is_connected() {
                if let Err(error) = connection.disconnect().await {
                    tracing::debug!(%error, device = %self.identity.address, "disconnect failed");
                }
            }
        }
        self.connected.store(false, Ordering::SeqCst);
        tracing::debug!(device = %self.identity.address, "disconnected");
    }

    /// Issue one command: optimistic transition, encode fresh, write.
    ///
    /// Boxed to break the `command` -> `ensure_connected` ->
    /// `notification_loop` -> `command` async recursion cycle.
    fn command(
        self: &Arc<Self>,
        command: Command,
    ) -> std::pin::Pin<Box<dyn Future<Output = Result<(), DeviceError>> + Send + '_>> {
        Box::pin(async move {
            let announcements = self.machine_guard().command_issued(command, self.env.now());
            let followups = self.execute(announcements);
            debug_assert!(followups.is_empty(), "issuing a command never sends another");

            // Armed before the write: a failed connect must not leave the
            // optimistic state parked past the timeout.
            self.arm_watchdog();

            // Timestamp is "now" at encode time; frames are never cached.
            let frame = command.encode(&self.identity.key, self.env.unix_time())?;
            self.write_command(&frame).await?;
            Ok(())
        })
    }

    /// Guarantee a live, notification-subscribed connection.
    ///
    /// Holding the session mutex across the connect handshake is what
    /// prevents a second physical connect attempt while one is in flight:
    /// concurrent callers queue here and find the fresh handle.
    async fn ensure_connected(self: &Arc<Self>) -> Result<(), DeviceError> {
        let mut session = self.session.lock().await;
        if let Some(connection) = session.as_ref() {
            if connection.is_connected() {
                return Ok(());
            }
        }

        tracing::debug!(device = %self.identity.address, "connecting");
        let connection = self.transport.connect(&self.identity.address).await?;
        let notifications = connection.subscribe(NOTIFY_CHARACTERISTIC).await?;
        *session = Some(connection);
        self.connected.store(true, Ordering::SeqCst);
        tracing::debug!(device = %self.identity.address, "connected, listening for notifications");

        tokio::spawn(notification_loop(Arc::downgrade(self), notifications));
        Ok(())
    }

    /// Write a frame to the command characteristic.
    ///
    /// Connect-phase errors propagate. Write failures are contained: the
    /// session is marked unhealthy and the call still succeeds, leaving any
    /// optimistic state in place until a notification, a later operation,
    /// or the watchdog corrects it. The handle is not forcibly closed: the
    /// next operation may find it still connected at the transport layer,
    /// and reconnects if not.
    async fn write_command(self: &Arc<Self>, frame: &[u8; FRAME_LEN]) -> Result<(), DeviceError> {
        self.ensure_connected().await?;

        let session = self.session.lock().await;
        if let Some(connection) = session.as_ref() {
            match connection.write(COMMAND_CHARACTERISTIC, frame).await {
                Ok(()) => tracing::debug!(device = %self.identity.address, "command written"),
                Err(error) => {
                    self.connected.store(false, Ordering::SeqCst);
                    tracing::error!(%error, device = %self.identity.address, "command write failed");
                }
            }
        }
        Ok(())
    }

    /// Demote a command that never gets a notification to `Jammed`.
    fn arm_watchdog(self: &Arc<Self>) {
        let device = Arc::downgrade(self);
        let env = self.env.clone();
        let armed_at = env.now();
        let timeout = self.machine_guard().command_timeout();
        tokio::spawn(async move {
            // The window opens at arm time, not when this task first runs.
            let elapsed = env.now().duration_since(armed_at);
            env.sleep(timeout.saturating_sub(elapsed)).await;
            if let Some(device) = device.upgrade() {
                let actions = device.machine_guard().poll(device.env.now());
                let followups = device.execute(actions);
                debug_assert!(followups.is_empty(), "a timeout never sends commands");
            }
        });
    }

    /// Execute announcements now; return commands for the caller to send.
    fn execute(&self, actions: Vec<MachineAction>) -> Vec<Command> {
        let mut sends = Vec::new();
        for action in actions {
            match action {
                MachineAction::Announce(state) => {
                    self.state_tx.send_replace(state);
                }
                MachineAction::Send(command) => sends.push(command),
            }
        }
        sends
    }

    fn machine_guard(&self) -> std::sync::MutexGuard<'_, LockMachine> {
        self.machine.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Drain the notification subscription for one session.
///
/// Runs until the subscription channel closes (connection torn down or
/// replaced) or the device is dropped. Recovery commands produced by the
/// machine re-enter the normal operation path sequentially, so the
/// time-sync frame always precedes the replayed operation on the wire.
async fn notification_loop<T: Transport, E: Environment>(
    device: Weak<YeelockDevice<T, E>>,
    mut notifications: mpsc::Receiver<Vec<u8>>,
) {
    while let Some(payload) = notifications.recv().await {
        let Some(device) = device.upgrade() else {
            return;
        };
        tracing::debug!(?payload, device = %device.identity.address, "notification received");

        let actions = device.machine_guard().notification_received(&payload);
        for command in device.execute(actions) {
            if let Err(error) = device.command(command).await {
                tracing::error!(%error, device = %device.identity.address, "recovery command failed");
            }
        }
    }
}
