//! Resettable one-shot wait/release primitive.
//!
//! A `Gate` is either armed or released. `wait()` resolves as soon as the gate
//! is released (immediately if it already is). Releasing never fails, whether
//! or not anyone is waiting, and releasing twice is a no-op.

use tokio::sync::watch;

#[derive(Debug)]
pub struct Gate {
    released: watch::Sender<bool>,
}

impl Gate {
    pub fn armed() -> Self {
        Self {
            released: watch::Sender::new(false),
        }
    }

    pub fn released() -> Self {
        Self {
            released: watch::Sender::new(true),
        }
    }

    /// Reset to unreleased so the next `wait()` blocks.
    pub fn arm(&self) {
        self.released.send_replace(false);
    }

    pub fn release(&self) {
        self.released.send_replace(true);
    }

    pub fn is_released(&self) -> bool {
        *self.released.borrow()
    }

    /// Resolve once the gate is released.
    ///
    /// The current value is inspected on subscribe, so a release that lands
    /// between a caller's state check and this call is not lost.
    pub async fn wait(&self) {
        let mut rx = self.released.subscribe();
        // The sender lives in `self`, so the channel cannot close while we borrow it.
        let _ = rx.wait_for(|released| *released).await;
    }
}

impl Default for Gate {
    fn default() -> Self {
        Self::armed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn release_without_waiters_is_safe() {
        let gate = Gate::armed();
        gate.release();
        gate.release();
        assert!(gate.is_released());
        // Already released: resolves immediately.
        gate.wait().await;
    }

    #[tokio::test(start_paused = true)]
    async fn wait_blocks_until_release() {
        let gate = Arc::new(Gate::armed());
        let waiter = {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move { gate.wait().await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());
        gate.release();
        waiter.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn rearm_blocks_again() {
        let gate = Gate::released();
        gate.arm();
        assert!(!gate.is_released());
        let timed_out = tokio::time::timeout(Duration::from_millis(30), gate.wait())
            .await
            .is_err();
        assert!(timed_out);
    }
}
