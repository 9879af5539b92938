//! Trailing-edge debouncer backed by a single tokio timer task.

use std::{sync::Arc, time::Duration};

use tokio::{sync::watch, task::JoinHandle};
use tracing::trace;

pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Publishes a value only once the input has been stable for `delay`.
///
/// Every [`push`](Self::push) cancels the pending timer, if any, and schedules
/// a fresh one, so a burst of inputs yields exactly one publication carrying
/// the last value. Must be used from within a tokio runtime.
pub struct Debouncer<T> {
    delay: Duration,
    published: Arc<watch::Sender<T>>,
    pending: Option<JoinHandle<()>>,
}

impl<T> Debouncer<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(initial: T, delay: Duration) -> Self {
        let (published, _) = watch::channel(initial);
        Self {
            delay,
            published: Arc::new(published),
            pending: None,
        }
    }

    pub fn push(&mut self, value: T) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
            trace!("cancelled pending debounce timer");
        }

        let published = Arc::clone(&self.published);
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            published.send_replace(value);
            trace!("debounced value published");
        }));
    }

    pub fn current(&self) -> T {
        self.published.borrow().clone()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.published.subscribe()
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
