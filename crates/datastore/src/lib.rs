mod fallback;

pub use fallback::{FallbackData, FallbackError};

use domain::LoadResult;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// Holder of the snapshot renderers currently show.
/// This allows switching between different publication backends without
/// touching the loader.
pub trait SnapshotStore: Send + Sync {
    /// The snapshot most recently published, if any
    fn current(&self) -> Option<Arc<LoadResult>>;

    /// Replace the current snapshot and notify subscribers
    fn publish(&self, snapshot: Arc<LoadResult>);

    /// Receiver that observes every publication
    fn subscribe(&self) -> watch::Receiver<Option<Arc<LoadResult>>>;
}

/// In-memory implementation of the SnapshotStore trait
pub struct InMemorySnapshotStore {
    sender: watch::Sender<Option<Arc<LoadResult>>>,
}

impl InMemorySnapshotStore {
    /// Create an empty store; nothing is visible until the first publish
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self { sender }
    }
}

impl Default for InMemorySnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn current(&self) -> Option<Arc<LoadResult>> {
        self.sender.borrow().clone()
    }

    fn publish(&self, snapshot: Arc<LoadResult>) {
        debug!(
            videos = snapshot.videos.len(),
            shorts = snapshot.shorts.len(),
            subscribers = self.sender.receiver_count(),
            "publishing snapshot"
        );
        self.sender.send_replace(Some(snapshot));
    }

    fn subscribe(&self) -> watch::Receiver<Option<Arc<LoadResult>>> {
        self.sender.subscribe()
    }
}
