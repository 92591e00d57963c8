use crate::Resource;
use crate::classify::{Category, ChaosLevel, ChaosThresholds, categorize};
use crate::duration::{is_short, parse_iso8601_duration};
use crate::format::{format_duration, format_views, relative_date, truncate_with_ellipsis};
use crate::payload::{VideoRecord, parse_timestamp};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const TITLE_MAX_CHARS: usize = 60;
const DESCRIPTION_MAX_CHARS: usize = 120;
const VIRAL_MIN_VIEWS: u64 = 1_000;

/// Snapshot of the channel counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStats {
    pub name: String,
    pub handle: String,
    pub subscriber_count: u64,
    pub video_count: u64,
    pub view_count: u64,
    pub description: String,
    pub last_updated: DateTime<Utc>,
}

/// A video with every display field the grids need already derived
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoEntry {
    pub id: String,
    pub title: String,
    pub description: String,
    pub thumbnail: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub view_count: u64,
    pub like_count: Option<u64>,
    pub duration: String,
    pub category: Category,
    pub embed_url: String,
    pub youtube_url: String,

    pub formatted_views: String,
    pub relative_date: String,
    pub chaos_level: ChaosLevel,
    pub category_label: String,
    pub duration_seconds: Option<u64>,
    pub formatted_duration: String,
    pub is_short: bool,
    pub is_viral: bool,
    pub thumbnail_url: String,
    pub display_title: String,
    pub description_preview: String,
}

/// Shorts share the video shape; they only differ in which grid shows them.
pub type ShortEntry = VideoEntry;

/// Inputs of the derivation step that are not part of a record
#[derive(Debug, Clone, Copy)]
pub struct DeriveContext {
    pub now: DateTime<Utc>,
    pub thresholds: ChaosThresholds,
}

impl DeriveContext {
    pub fn new(now: DateTime<Utc>, thresholds: ChaosThresholds) -> Self {
        Self { now, thresholds }
    }

    /// Turn a decoded record into a display-ready entry
    pub fn entry(&self, record: VideoRecord) -> VideoEntry {
        let title = record.title.unwrap_or_default();
        let description = record.description.unwrap_or_default();
        let duration = record.duration.unwrap_or_default();
        let view_count = record.view_count.unwrap_or(0);
        let published_at = record.published_at.as_deref().and_then(parse_timestamp);
        let duration_seconds = parse_iso8601_duration(&duration);
        let category = categorize(&title, &description);
        let thumbnail = record.thumbnail.filter(|t| !t.trim().is_empty());

        VideoEntry {
            formatted_views: format_views(view_count),
            relative_date: relative_date(published_at, self.now),
            chaos_level: ChaosLevel::classify(view_count, &title, &self.thresholds),
            category_label: category.label().to_string(),
            formatted_duration: format_duration(duration_seconds),
            is_short: duration_seconds.is_some_and(is_short),
            is_viral: view_count > VIRAL_MIN_VIEWS,
            thumbnail_url: thumbnail
                .clone()
                .unwrap_or_else(|| format!("https://i.ytimg.com/vi/{}/maxresdefault.jpg", record.id)),
            display_title: truncate_with_ellipsis(&title, TITLE_MAX_CHARS, "Unknown Video"),
            description_preview: truncate_with_ellipsis(
                &description,
                DESCRIPTION_MAX_CHARS,
                "No description available",
            ),
            embed_url: record
                .embed_url
                .unwrap_or_else(|| format!("https://www.youtube.com/embed/{}", record.id)),
            youtube_url: record
                .youtube_url
                .unwrap_or_else(|| format!("https://www.youtube.com/watch?v={}", record.id)),
            id: record.id,
            title,
            description,
            thumbnail,
            published_at,
            view_count,
            like_count: record.like_count,
            duration,
            category,
            duration_seconds,
        }
    }

    pub fn entries(&self, records: Vec<VideoRecord>) -> Vec<VideoEntry> {
        records.into_iter().map(|r| self.entry(r)).collect()
    }
}

/// Where a resource in a snapshot came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Fetched and decoded during this load
    Live,
    /// Built-in sample data
    Fallback,
    /// Carried over from the previous snapshot after a failed refresh
    Previous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origins {
    pub stats: Origin,
    pub videos: Origin,
    pub shorts: Origin,
}

impl Origins {
    pub fn uniform(origin: Origin) -> Self {
        Self {
            stats: origin,
            videos: origin,
            shorts: origin,
        }
    }

    pub fn get(&self, resource: Resource) -> Origin {
        match resource {
            Resource::Stats => self.stats,
            Resource::Videos => self.videos,
            Resource::Shorts => self.shorts,
        }
    }

    pub fn set(&mut self, resource: Resource, origin: Origin) {
        match resource {
            Resource::Stats => self.stats = origin,
            Resource::Videos => self.videos = origin,
            Resource::Shorts => self.shorts = origin,
        }
    }

    pub fn any_live(&self) -> bool {
        Resource::ALL.iter().any(|r| self.get(*r) == Origin::Live)
    }

    pub fn all_fallback(&self) -> bool {
        Resource::ALL.iter().all(|r| self.get(*r) == Origin::Fallback)
    }
}

/// Immutable result of one load cycle, handed to renderers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadResult {
    pub stats: ChannelStats,
    pub videos: Vec<VideoEntry>,
    pub shorts: Vec<ShortEntry>,
    pub origins: Origins,
    pub loaded_at: DateTime<Utc>,
    /// Fetch rounds used, retries included
    pub attempts: u32,
    /// Soft message for the page when live data was unavailable
    pub notice: Option<String>,
}
