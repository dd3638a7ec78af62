use crate::statv::{StatSnapshot, Statv};

/// Stats carried by a [`ConnectionStatus`].
///
/// `drop` is a transient end-of-use signal modeled as an additional stat:
/// the client rider's connect task sets it to request its own teardown,
/// then waits for `connected` to flip false in turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConnectionSnapshot {
    pub connected: bool,
    pub succeed: bool,
    pub drop: bool,
}

impl ConnectionSnapshot {
    pub fn closed(&self) -> bool {
        !self.connected
    }
}

impl StatSnapshot for ConnectionSnapshot {
    fn available(&self) -> bool {
        self.connected
    }
}

/// `Statv` specialization tracking a single connection's liveness.
#[derive(Debug)]
pub struct ConnectionStatus {
    inner: Statv<ConnectionSnapshot>,
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionStatus {
    pub fn new() -> Self {
        Self {
            inner: Statv::new(ConnectionSnapshot::default()),
        }
    }

    pub fn get(&self) -> ConnectionSnapshot {
        self.inner.get()
    }

    pub fn connected(&self) -> bool {
        self.inner.get().connected
    }

    pub fn closed(&self) -> bool {
        self.inner.get().closed()
    }

    pub fn available(&self) -> bool {
        self.inner.get().available()
    }

    /// Writes only the provided fields, then notifies waiters once.
    pub fn update(&self, connected: Option<bool>, succeed: Option<bool>) {
        self.inner.commit(|s| {
            if let Some(connected) = connected {
                s.connected = connected;
            }
            if let Some(succeed) = succeed {
                s.succeed = succeed;
            }
        });
    }

    pub fn request_drop(&self) {
        self.inner.commit(|s| s.drop = true);
    }

    pub async fn wait_for_drop(&self) {
        while !self.inner.get().drop {
            self.inner.wait_for_update().await;
        }
    }

    pub async fn wait_for_update(&self) -> (ConnectionSnapshot, ConnectionSnapshot) {
        self.inner.wait_for_update().await
    }

    pub async fn wait_for_available(&self) {
        self.inner.wait_for_available().await
    }

    pub async fn wait_for_unavailable(&self) {
        self.inner.wait_for_unavailable().await
    }
}
