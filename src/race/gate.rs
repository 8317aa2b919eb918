//! Write-once broadcast release.

use tokio::sync::watch;

/// Orchestrator side of the release gate.
#[derive(Debug)]
pub struct ReleaseGate {
    tx: watch::Sender<bool>,
}

/// Worker side of the release gate. Cheap to clone; one per worker.
#[derive(Debug, Clone)]
pub struct ReleaseWaiter {
    rx: watch::Receiver<bool>,
}

/// Create a connected gate and waiter.
pub fn release_gate() -> (ReleaseGate, ReleaseWaiter) {
    let (tx, rx) = watch::channel(false);
    (ReleaseGate { tx }, ReleaseWaiter { rx })
}

impl ReleaseGate {
    /// Open the gate for every current and future waiter.
    ///
    /// Returns `true` the first time, `false` if it was already open.
    pub fn fire(&self) -> bool {
        self.tx.send_if_modified(|released| {
            if *released {
                false
            } else {
                *released = true;
                true
            }
        })
    }

    /// Whether the gate has been opened.
    pub fn is_fired(&self) -> bool {
        *self.tx.borrow()
    }
}

impl ReleaseWaiter {
    /// Wait for the release.
    ///
    /// Returns `false` if the gate was dropped without ever firing.
    pub async fn wait(&mut self) -> bool {
        self.rx.wait_for(|released| *released).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_fire_releases_all_waiters() {
        let (gate, waiter) = release_gate();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let mut waiter = waiter.clone();
                tokio::spawn(async move { waiter.wait().await })
            })
            .collect();

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(gate.fire());

        for handle in handles {
            assert!(handle.await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_fire_is_write_once() {
        let (gate, _waiter) = release_gate();
        assert!(!gate.is_fired());
        assert!(gate.fire());
        assert!(!gate.fire());
        assert!(gate.is_fired());
    }

    #[tokio::test]
    async fn test_late_waiter_passes_immediately() {
        let (gate, mut waiter) = release_gate();
        gate.fire();
        drop(gate);
        assert!(waiter.wait().await);
    }

    #[tokio::test]
    async fn test_dropped_gate_aborts_waiters() {
        let (gate, mut waiter) = release_gate();
        drop(gate);
        assert!(!waiter.wait().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waiters_block_until_fired() {
        let (gate, mut waiter) = release_gate();
        let blocked = tokio::time::timeout(Duration::from_secs(1), waiter.wait()).await;
        assert!(blocked.is_err());
        gate.fire();
        assert!(waiter.wait().await);
    }
}
