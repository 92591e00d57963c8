use crate::config::{RefreshMode, RefreshPolicy};
use crate::error::LoadError;
use crate::loader::ChannelDataLoader;
use datastore::SnapshotStore;
use domain::{LoadResult, Origin};
use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// What a refresh did to the published snapshot
#[derive(Debug)]
pub enum RefreshOutcome {
    /// A new snapshot was published
    Published(Arc<LoadResult>),
    /// Nothing loaded live; the current snapshot stays visible
    KeptPrevious(Arc<LoadResult>),
    /// The stats document reports no newer data than the current snapshot
    UpToDate,
    /// The staleness probe failed; nothing was loaded
    ProbeFailed(LoadError),
    /// Another load was in progress
    AlreadyLoading,
}

/// Owns the loader and publishes its snapshots.
///
/// At most one load runs at a time; the automatic refresh skips its tick
/// rather than queueing behind a running load.
pub struct ChannelDataService {
    loader: ChannelDataLoader,
    store: Arc<dyn SnapshotStore>,
    loading: Mutex<()>,
}

impl ChannelDataService {
    pub fn new(loader: ChannelDataLoader, store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            loader,
            store,
            loading: Mutex::new(()),
        }
    }

    pub fn current(&self) -> Option<Arc<LoadResult>> {
        self.store.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<LoadResult>>> {
        self.store.subscribe()
    }

    /// Run the initial load and publish its result.
    ///
    /// Always publishes, fallback data included, so the page has something
    /// to show. Waits for a load already in progress instead of skipping.
    pub async fn start(&self) -> Arc<LoadResult> {
        let _guard = self.loading.lock().await;
        let current = self.store.current();
        let snapshot = Arc::new(self.loader.load_all(current.as_deref()).await);
        self.store.publish(snapshot.clone());
        snapshot
    }

    /// Reload and publish unless a load is already running
    pub async fn refresh(&self) -> RefreshOutcome {
        let Ok(_guard) = self.loading.try_lock() else {
            debug!("load already in progress, skipping refresh");
            return RefreshOutcome::AlreadyLoading;
        };
        let current = self.store.current();

        if self.loader.config().refresh.mode == RefreshMode::WhenStale {
            // Only a live stats document has a meaningful lastUpdated to compare.
            if let Some(shown) = current.as_ref().filter(|c| c.origins.stats == Origin::Live) {
                match self.loader.probe_last_updated().await {
                    Ok(Some(updated)) if updated <= shown.stats.last_updated => {
                        debug!(%updated, "channel data unchanged");
                        return RefreshOutcome::UpToDate;
                    }
                    Ok(Some(updated)) => info!(%updated, "newer channel data available"),
                    // Without a timestamp freshness is unknown, so reload.
                    Ok(None) => info!("stats carry no lastUpdated, reloading"),
                    Err(error) => {
                        warn!(%error, "update check failed");
                        return RefreshOutcome::ProbeFailed(error);
                    }
                }
            }
        }

        let result = self.loader.load_all(current.as_deref()).await;
        let preserve = self.loader.config().refresh.policy == RefreshPolicy::PreserveLastGood;
        match current {
            Some(shown) if preserve && !result.origins.any_live() => {
                warn!("refresh produced no live data, keeping current snapshot");
                RefreshOutcome::KeptPrevious(shown)
            }
            _ => {
                let snapshot = Arc::new(result);
                self.store.publish(snapshot.clone());
                RefreshOutcome::Published(snapshot)
            }
        }
    }

    /// Refresh on the configured interval until the task is aborted.
    /// The first refresh happens one interval after the call.
    pub fn spawn_auto_refresh(self: Arc<Self>) -> JoinHandle<()> {
        let period = self.loader.config().refresh.interval();
        info!(?period, "automatic refresh scheduled");

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match self.refresh().await {
                    RefreshOutcome::Published(snapshot) => {
                        info!(origins = ?snapshot.origins, "refreshed channel data")
                    }
                    RefreshOutcome::KeptPrevious(_) => info!("refresh kept previous snapshot"),
                    RefreshOutcome::UpToDate => debug!("refresh not needed"),
                    RefreshOutcome::ProbeFailed(_) | RefreshOutcome::AlreadyLoading => {}
                }
            }
        })
    }
}
