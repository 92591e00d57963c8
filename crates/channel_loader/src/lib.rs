//! Loading of the channel's stats, videos and shorts documents.
//!
//! [`ChannelDataLoader`] fetches the three resources concurrently and always
//! produces a complete snapshot, substituting fallback or previously loaded
//! data for anything that fails. [`ChannelDataService`] owns a loader,
//! publishes its snapshots and drives the periodic refresh.

pub mod config;
mod error;
mod loader;
pub mod progress;
mod service;
mod source;
#[cfg(test)]
mod testing;

pub use config::{LoaderConfig, RefreshMode, RefreshPolicy, SourceConfig, load_from_file, load_from_str};
pub use error::{ConfigError, LoadError};
pub use loader::{ChannelDataLoader, FetchRound, OFFLINE_NOTICE, STALE_NOTICE};
pub use progress::{NoProgress, ProgressSink, TracingProgress};
pub use service::{ChannelDataService, RefreshOutcome};
pub use source::{DirectorySource, HttpSource, ResourceSource};
