//! Keyed debounce timers
//!
//! Each key owns at most one pending timer. Scheduling a key again aborts the
//! pending timer and starts a new one, so a burst of requests fires once, after
//! the last request plus the delay. Fired tasks are delivered on a channel to the
//! single task that owns the index.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::trace;

/// A timer that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired<K, T> {
    pub key: K,
    pub task: T,
    generation: u64,
}

struct Pending {
    generation: u64,
    handle: JoinHandle<()>,
}

pub struct Debouncer<K, T> {
    pending: HashMap<K, Pending>,
    sender: mpsc::UnboundedSender<Fired<K, T>>,
    next_generation: u64,
}

impl<K, T> Debouncer<K, T>
where
    K: Eq + Hash + Clone + std::fmt::Debug + Send + 'static,
    T: Send + 'static,
{
    /// Create a debouncer and the receiver its fired tasks arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Fired<K, T>>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                pending: HashMap::new(),
                sender,
                next_generation: 0,
            },
            receiver,
        )
    }

    /// Deliver `task` after `delay`, replacing any pending timer for `key`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&mut self, key: K, delay: Duration, task: T) {
        if let Some(previous) = self.pending.remove(&key) {
            previous.handle.abort();
            trace!("debounce reset for {key:?}");
        }

        self.next_generation += 1;
        let generation = self.next_generation;
        let sender = self.sender.clone();
        let fired_key = key.clone();
        let deadline = Instant::now() + delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            // Receiver gone means the owner shut down
            let _ = sender.send(Fired {
                key: fired_key,
                task,
                generation,
            });
        });
        self.pending.insert(key, Pending { generation, handle });
    }

    /// Abort the pending timer for `key`, if any.
    pub fn cancel(&mut self, key: &K) -> bool {
        match self.pending.remove(key) {
            Some(pending) => {
                pending.handle.abort();
                true
            }
            None => false,
        }
    }

    /// Acknowledge a fired task. Returns false when the key was rescheduled after
    /// the timer fired; the newer timer stays pending.
    pub fn complete(&mut self, fired: &Fired<K, T>) -> bool {
        match self.pending.get(&fired.key) {
            Some(pending) if pending.generation == fired.generation => {
                self.pending.remove(&fired.key);
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.pending
            .get(key)
            .is_some_and(|pending| !pending.handle.is_finished())
    }

    pub fn pending_count(&self) -> usize {
        self.pending
            .values()
            .filter(|pending| !pending.handle.is_finished())
            .count()
    }
}

impl<K, T> Drop for Debouncer<K, T> {
    fn drop(&mut self) {
        for pending in self.pending.values() {
            pending.handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn burst_fires_once_after_last_request() {
        let (mut debouncer, mut fired) = Debouncer::<&'static str, u32>::new();
        let delay = Duration::from_millis(1000);

        debouncer.schedule("a.ts", delay, 1);
        tokio::time::sleep(Duration::from_millis(600)).await;
        debouncer.schedule("a.ts", delay, 2);
        tokio::time::sleep(Duration::from_millis(600)).await;
        // First timer would have fired by now; it was replaced
        assert!(fired.try_recv().is_err());
        assert!(debouncer.is_pending(&"a.ts"));

        let event = fired.recv().await.unwrap();
        assert_eq!(event.key, "a.ts");
        assert_eq!(event.task, 2);
        assert!(debouncer.complete(&event));
        assert!(!debouncer.is_pending(&"a.ts"));
        assert_eq!(debouncer.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn keys_are_independent() {
        let (mut debouncer, mut fired) = Debouncer::<String, ()>::new();
        debouncer.schedule("a".into(), Duration::from_millis(100), ());
        debouncer.schedule("b".into(), Duration::from_millis(50), ());

        assert_eq!(fired.recv().await.unwrap().key, "b");
        assert_eq!(fired.recv().await.unwrap().key, "a");
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_prevents_delivery() {
        let (mut debouncer, mut fired) = Debouncer::<u8, ()>::new();
        debouncer.schedule(1, Duration::from_millis(10), ());
        assert!(debouncer.cancel(&1));
        assert!(!debouncer.cancel(&1));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(fired.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_fire_does_not_clear_newer_timer() {
        let (mut debouncer, mut fired) = Debouncer::<u8, u8>::new();
        debouncer.schedule(1, Duration::from_millis(10), 1);
        let stale = fired.recv().await.unwrap();

        debouncer.schedule(1, Duration::from_millis(10), 2);
        assert!(!debouncer.complete(&stale));
        assert!(debouncer.is_pending(&1));
    }
}
