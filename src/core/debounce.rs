use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;

/// Handle used to signal that something changed. Cheap to clone and usable from any thread.
#[derive(Debug, Clone)]
pub struct DebounceTrigger {
    tx: mpsc::UnboundedSender<()>,
}

impl DebounceTrigger {
    /// Restart the quiet period. Returns `false` once the debouncer is gone.
    pub fn fire(&self) -> bool {
        self.tx.send(()).is_ok()
    }
}

/// Resettable timer that turns bursts of triggers into a single wake-up.
pub struct Debouncer {
    delay: Duration,
    rx: mpsc::UnboundedReceiver<()>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> (DebounceTrigger, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (DebounceTrigger { tx }, Self { delay, rx })
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Wait for the next burst to go quiet for `delay`.
    ///
    /// Returns `false` when every trigger has been dropped and nothing is pending. A burst cut
    /// short by the last trigger dropping still settles and returns `true`.
    pub async fn settled(&mut self) -> bool {
        if self.rx.recv().await.is_none() {
            return false;
        }
        loop {
            tokio::select! {
                msg = self.rx.recv() => {
                    if msg.is_none() {
                        return true;
                    }
                }
                () = sleep(self.delay) => return true,
            }
        }
    }
}
