//! Debouncing of free-text search input
//!
//! Keystrokes are pushed through a [`DebounceInput`]; [`Debouncer::settled`]
//! yields only the latest value once input has been quiet for the delay.

use std::time::Duration;
use tokio::sync::mpsc;

/// Quiet period applied to search input unless a view configures another
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);

/// Cloneable handle feeding values into a [`Debouncer`]
#[derive(Debug, Clone)]
pub struct DebounceInput<T> {
    tx: mpsc::UnboundedSender<T>,
}

impl<T> DebounceInput<T> {
    /// Push a value; returns false once the debouncer is gone
    pub fn push(&self, value: T) -> bool {
        self.tx.send(value).is_ok()
    }
}

#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    rx: mpsc::UnboundedReceiver<T>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> (DebounceInput<T>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (DebounceInput { tx }, Self { delay, rx })
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Wait for the next burst of input to settle and return its last value
    ///
    /// Returns `None` once every input handle is dropped and nothing is pending.
    /// A burst still in flight when the inputs close is flushed immediately.
    pub async fn settled(&mut self) -> Option<T> {
        let mut latest = self.rx.recv().await?;
        let mut superseded = 0usize;

        loop {
            match tokio::time::timeout(self.delay, self.rx.recv()).await {
                Ok(Some(value)) => {
                    latest = value;
                    superseded += 1;
                }
                Ok(None) | Err(_) => break,
            }
        }

        tracing::debug!(superseded, "Search input settled");
        Some(latest)
    }
}
