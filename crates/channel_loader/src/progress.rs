use tracing::info;

/// Receiver of loading progress for a visual indicator
pub trait ProgressSink: Send + Sync {
    /// `percent` is in `0..=100`
    fn report(&self, percent: u8, status: &str);
}

impl<F> ProgressSink for F
where
    F: Fn(u8, &str) + Send + Sync,
{
    fn report(&self, percent: u8, status: &str) {
        self(percent, status)
    }
}

/// Logs each progress step
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn report(&self, percent: u8, status: &str) {
        info!(percent, status, "load progress");
    }
}

pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _percent: u8, _status: &str) {}
}

pub(crate) const CONNECTING: &str = "Connecting to dynamic content...";
pub(crate) const LOADING: &str = "Loading channel statistics...";
pub(crate) const PROCESSING: &str = "Processing content...";
pub(crate) const ORGANIZING: &str = "Organizing dynamic content...";
pub(crate) const LOADED: &str = "Dynamic content loaded!";
pub(crate) const OFFLINE: &str = "Using offline content...";
