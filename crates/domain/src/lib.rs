//! Channel data model shared by the loader, the snapshot store and renderers.
//!
//! Everything in this crate is pure: decoding of the three JSON resources,
//! the display-field derivations and the presentation-time views over a
//! loaded snapshot.

mod classify;
mod duration;
mod format;
mod model;
mod payload;
mod views;

pub use classify::{Category, ChaosLevel, ChaosThresholds, categorize};
pub use duration::{SHORT_MAX_SECONDS, is_short, parse_iso8601_duration};
pub use format::{
    format_compact, format_duration, format_views, relative_date, truncate_with_ellipsis,
};
pub use model::{
    ChannelStats, DeriveContext, LoadResult, Origin, Origins, ShortEntry, VideoEntry,
};
pub use payload::{
    PayloadError, StatsRecord, VideoRecord, decode_entries, decode_stats, parse_timestamp,
};
pub use views::{latest, popular};

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three JSON resources a load cycle fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Stats,
    Videos,
    Shorts,
}

impl Resource {
    pub const ALL: [Resource; 3] = [Resource::Stats, Resource::Videos, Resource::Shorts];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Stats => "stats",
            Resource::Videos => "videos",
            Resource::Shorts => "shorts",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
