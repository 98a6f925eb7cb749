use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

/// Coalesces bursts of `schedule` calls into a single run of the
/// action. Each signal inside the window reschedules the deadline;
/// the action runs once the burst goes quiet. Driven by tokio time,
/// so tests can run it under a paused clock.
#[derive(Debug, Clone)]
pub struct Debouncer {
    tx: mpsc::UnboundedSender<()>,
}

impl Debouncer {
    pub fn spawn<F, Fut>(delay: Duration, action: F) -> Self
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();
        tokio::spawn(async move {
            loop {
                if rx.recv().await.is_none() {
                    break;
                }
                let mut deadline = Instant::now() + delay;
                loop {
                    tokio::select! {
                        _ = sleep_until(deadline) => break,
                        signal = rx.recv() => match signal {
                            Some(()) => deadline = Instant::now() + delay,
                            // Flush once on shutdown.
                            None => break,
                        },
                    }
                }
                action().await;
            }
        });
        Self { tx }
    }

    /// Request a run. Safe to call from sync contexts; a closed task
    /// (runtime shutdown) is ignored.
    pub fn schedule(&self) {
        let _ = self.tx.send(());
    }
}
