//! Live snapshots of the `challenges` and `progress` collections.
//!
//! Every change to a collection publishes its full contents again; the value
//! held by a [`LiveCollection`] is replaced wholesale, never patched.
//! Consumers hold a [`Subscription`] and read the latest snapshot whenever
//! they are woken. Dropping the subscription releases it.

use std::sync::Arc;

use tokio::sync::watch;

use crate::domain::{Challenge, DomainError, ProgressEntry};

/// Current contents of a subscribed collection
#[derive(Debug)]
pub enum Snapshot<T> {
    /// Nothing delivered yet
    Loading,
    /// Full contents as of the latest change
    Ready(Arc<Vec<T>>),
    /// The store could not deliver the collection
    Failed(String),
}

// Manual impl: cloning only bumps the Arc, T need not be Clone
impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        match self {
            Snapshot::Loading => Snapshot::Loading,
            Snapshot::Ready(rows) => Snapshot::Ready(Arc::clone(rows)),
            Snapshot::Failed(reason) => Snapshot::Failed(reason.clone()),
        }
    }
}

impl<T> Snapshot<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Snapshot::Ready(_))
    }

    /// Rows of a ready snapshot, or `Unavailable` naming the collection.
    pub fn into_ready(self, collection: &str) -> Result<Arc<Vec<T>>, DomainError> {
        match self {
            Snapshot::Ready(rows) => Ok(rows),
            Snapshot::Loading => Err(DomainError::Unavailable(format!(
                "{} (still loading)",
                collection
            ))),
            Snapshot::Failed(reason) => Err(DomainError::Unavailable(format!(
                "{}: {}",
                collection, reason
            ))),
        }
    }
}

type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// A collection whose full contents are pushed to subscribers on every change
pub struct LiveCollection<T> {
    name: &'static str,
    tx: watch::Sender<Snapshot<T>>,
}

impl<T: Clone> LiveCollection<T> {
    pub fn new(name: &'static str) -> Self {
        let (tx, _rx) = watch::channel(Snapshot::Loading);
        Self { name, tx }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Replace the current contents.
    pub fn publish(&self, rows: Vec<T>) {
        tracing::debug!(
            "Publishing {} snapshot ({} rows, {} subscribers)",
            self.name,
            rows.len(),
            self.tx.receiver_count()
        );
        self.tx.send_replace(Snapshot::Ready(Arc::new(rows)));
    }

    /// Mark the collection as not loadable.
    pub fn fail(&self, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::warn!("{} feed failed: {}", self.name, reason);
        self.tx.send_replace(Snapshot::Failed(reason));
    }

    pub fn current(&self) -> Snapshot<T> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> Subscription<T> {
        Subscription {
            rx: self.tx.subscribe(),
            filter: None,
        }
    }

    /// Subscribe to the rows matching `predicate` only.
    pub fn subscribe_where<F>(&self, predicate: F) -> Subscription<T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Subscription {
            rx: self.tx.subscribe(),
            filter: Some(Arc::new(predicate)),
        }
    }

    /// Number of subscriptions that have not been dropped yet.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Handle on a [`LiveCollection`], optionally narrowed by a predicate
pub struct Subscription<T> {
    rx: watch::Receiver<Snapshot<T>>,
    filter: Option<Predicate<T>>,
}

impl<T: Clone> Subscription<T> {
    /// Latest snapshot, filtered, marking it as seen.
    pub fn snapshot(&mut self) -> Snapshot<T> {
        let current = self.rx.borrow_and_update().clone();
        match (current, &self.filter) {
            (Snapshot::Ready(rows), Some(keep)) => Snapshot::Ready(Arc::new(
                rows.iter().filter(|row| keep(row)).cloned().collect(),
            )),
            (other, _) => other,
        }
    }

    /// Wait for the next push. Returns `false` once the collection is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

/// The two collections every view is computed from
pub struct LiveCollections {
    pub challenges: LiveCollection<Challenge>,
    pub progress: LiveCollection<ProgressEntry>,
}

impl LiveCollections {
    pub fn new() -> Self {
        Self {
            challenges: LiveCollection::new("challenges"),
            progress: LiveCollection::new("progress"),
        }
    }
}

impl Default for LiveCollections {
    fn default() -> Self {
        Self::new()
    }
}
