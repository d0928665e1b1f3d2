//! Actor-owned accumulator state shared between a sensor and a tick loop.
//!
//! The sensor writes through a [`FeatureSink`] from whatever execution context
//! it runs on; the tick loop reads through [`StateCell::snapshot`]. Only the
//! actor task touches the accumulator, so a read never observes a partial write.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// State folded from a stream of inputs.
pub trait Accumulator: Send + 'static {
    type Input: Send + 'static;
    type Snapshot: Send + 'static;

    fn apply(&mut self, input: Self::Input);

    /// A copy of the current state. Must not mutate.
    fn snapshot(&self) -> Self::Snapshot;
}

/// Write handle for a sensor. Never blocks; samples are dropped when the inbox is full.
pub struct FeatureSink<T> {
    tx: mpsc::Sender<T>,
    dropped: Arc<AtomicU64>,
}

impl<T> Clone for FeatureSink<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            dropped: self.dropped.clone(),
        }
    }
}

impl<T> FeatureSink<T> {
    /// Offer a sample. Returns `false` if it was dropped or the cell is gone.
    pub fn push(&self, item: T) -> bool {
        match self.tx.try_send(item) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::trace!(dropped = total, "accumulator inbox full, sample dropped");
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// An accumulator running on its own task.
///
/// Dropping the cell stops the task and discards the state.
pub struct StateCell<A: Accumulator> {
    inputs: mpsc::Sender<A::Input>,
    requests: mpsc::Sender<oneshot::Sender<A::Snapshot>>,
    dropped: Arc<AtomicU64>,
    task: JoinHandle<()>,
}

impl<A: Accumulator> StateCell<A> {
    /// Spawn the actor on the current runtime with an inbox of `capacity` inputs.
    pub fn spawn(mut accumulator: A, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (inputs, mut input_rx) = mpsc::channel::<A::Input>(capacity);
        let (requests, mut request_rx) = mpsc::channel::<oneshot::Sender<A::Snapshot>>(8);

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    Some(input) = input_rx.recv() => accumulator.apply(input),
                    Some(reply) = request_rx.recv() => {
                        // Apply everything queued before the request arrived.
                        for _ in 0..capacity {
                            match input_rx.try_recv() {
                                Ok(input) => accumulator.apply(input),
                                Err(_) => break,
                            }
                        }
                        let _ = reply.send(accumulator.snapshot());
                    }
                    else => break,
                }
            }
        });

        Self {
            inputs,
            requests,
            dropped: Arc::new(AtomicU64::new(0)),
            task,
        }
    }

    /// A new write handle.
    pub fn sink(&self) -> FeatureSink<A::Input> {
        FeatureSink {
            tx: self.inputs.clone(),
            dropped: self.dropped.clone(),
        }
    }

    /// Current state, or `None` if the actor has stopped.
    pub async fn snapshot(&self) -> Option<A::Snapshot> {
        let (reply, rx) = oneshot::channel();
        self.requests.send(reply).await.ok()?;
        rx.await.ok()
    }

    /// Inputs dropped because the inbox was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl<A: Accumulator> Drop for StateCell<A> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Keeps the most recent input and how many arrived.
#[derive(Debug)]
pub struct Latest<T> {
    value: Option<T>,
    received: u64,
}

impl<T> Default for Latest<T> {
    fn default() -> Self {
        Self {
            value: None,
            received: 0,
        }
    }
}

/// Snapshot of a [`Latest`] accumulator.
#[derive(Clone, Debug)]
pub struct LatestSnapshot<T> {
    pub value: Option<T>,
    pub received: u64,
}

impl<T: Clone + Send + 'static> Accumulator for Latest<T> {
    type Input = T;
    type Snapshot = LatestSnapshot<T>;

    fn apply(&mut self, input: T) {
        self.value = Some(input);
        self.received += 1;
    }

    fn snapshot(&self) -> LatestSnapshot<T> {
        LatestSnapshot {
            value: self.value.clone(),
            received: self.received,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sums its inputs.
    #[derive(Default)]
    struct Sum(u64);

    impl Accumulator for Sum {
        type Input = u64;
        type Snapshot = u64;

        fn apply(&mut self, input: u64) {
            self.0 += input;
        }

        fn snapshot(&self) -> u64 {
            self.0
        }
    }

    #[tokio::test]
    async fn snapshot_reflects_prior_pushes() {
        let cell = StateCell::spawn(Sum::default(), 16);
        let sink = cell.sink();
        for v in 1..=4 {
            assert!(sink.push(v));
        }
        assert_eq!(cell.snapshot().await, Some(10));
    }

    #[tokio::test]
    async fn snapshot_does_not_mutate() {
        let cell = StateCell::spawn(Sum::default(), 16);
        cell.sink().push(5);
        assert_eq!(cell.snapshot().await, Some(5));
        assert_eq!(cell.snapshot().await, Some(5));
    }

    #[tokio::test]
    async fn full_inbox_drops_and_counts() {
        let cell = StateCell::spawn(Sum::default(), 2);
        let sink = cell.sink();
        // The actor has not run yet on this single-threaded runtime.
        let accepted = (0..5).filter(|_| sink.push(1)).count();
        assert_eq!(accepted, 2);
        assert_eq!(cell.dropped(), 3);
        assert_eq!(cell.snapshot().await, Some(2));
    }

    #[tokio::test]
    async fn pushes_from_another_thread() {
        let cell = StateCell::spawn(Sum::default(), 1024);
        let sink = cell.sink();
        std::thread::spawn(move || {
            for _ in 0..100 {
                sink.push(1);
            }
        })
        .join()
        .unwrap();
        assert_eq!(cell.snapshot().await, Some(100));
    }

    #[tokio::test]
    async fn sink_closes_when_cell_dropped() {
        let cell = StateCell::spawn(Sum::default(), 4);
        let sink = cell.sink();
        drop(cell);
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
        assert!(!sink.push(1));
        assert!(sink.is_closed());
    }

    #[tokio::test]
    async fn latest_keeps_newest_value() {
        let cell = StateCell::spawn(Latest::<&'static str>::default(), 8);
        let sink = cell.sink();
        sink.push("a");
        sink.push("b");
        let snap = cell.snapshot().await.unwrap();
        assert_eq!(snap.value, Some("b"));
        assert_eq!(snap.received, 2);
    }
}
