//! Presentation-time orderings. A snapshot keeps entries in source order;
//! each grid sorts its own view on demand.

use crate::classify::Category;
use crate::model::{LoadResult, ShortEntry, VideoEntry};

/// Newest first. Entries without a publish date go last; ties keep source order.
pub fn latest(entries: &[VideoEntry]) -> Vec<&VideoEntry> {
    let mut sorted: Vec<&VideoEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    sorted
}

/// Most viewed first; ties keep source order.
pub fn popular(entries: &[VideoEntry]) -> Vec<&VideoEntry> {
    let mut sorted: Vec<&VideoEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| b.view_count.cmp(&a.view_count));
    sorted
}

impl LoadResult {
    pub fn latest_videos(&self, limit: usize) -> Vec<&VideoEntry> {
        latest(&self.videos).into_iter().take(limit).collect()
    }

    pub fn popular_videos(&self, limit: usize) -> Vec<&VideoEntry> {
        popular(&self.videos).into_iter().take(limit).collect()
    }

    pub fn latest_shorts(&self, limit: usize) -> Vec<&ShortEntry> {
        latest(&self.shorts).into_iter().take(limit).collect()
    }

    /// Videos of one category, newest first
    pub fn videos_in(&self, category: Category) -> Vec<&VideoEntry> {
        latest(&self.videos)
            .into_iter()
            .filter(|v| v.category == category)
            .collect()
    }

    /// Video count per category in filter order, empty categories included
    pub fn category_counts(&self) -> Vec<(Category, usize)> {
        Category::ALL
            .iter()
            .map(|c| (*c, self.videos.iter().filter(|v| v.category == *c).count()))
            .collect()
    }

    /// Saturates at `u64::MAX`
    pub fn total_video_views(&self) -> u64 {
        self.videos
            .iter()
            .fold(0u64, |total, v| total.saturating_add(v.view_count))
    }
}
