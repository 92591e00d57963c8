//! Plain-text rendering of a snapshot, one section per page region.

use domain::{Category, LoadResult, VideoEntry, format_compact};
use std::fmt::Write;

const LATEST_LIMIT: usize = 8;
const POPULAR_LIMIT: usize = 6;
const SHORTS_LIMIT: usize = 6;

pub fn page(snapshot: &LoadResult) -> String {
    let mut out = String::new();
    let stats = &snapshot.stats;

    if let Some(notice) = &snapshot.notice {
        let _ = writeln!(out, "! {notice}");
    }
    let _ = writeln!(out, "{} ({})", stats.name, stats.handle);
    let _ = writeln!(
        out,
        "{} subscribers | {} videos | {} views",
        format_compact(stats.subscriber_count),
        format_compact(stats.video_count),
        format_compact(stats.view_count),
    );

    section(&mut out, "Latest", &snapshot.latest_videos(LATEST_LIMIT));
    section(&mut out, "Popular", &snapshot.popular_videos(POPULAR_LIMIT));
    section(&mut out, "Shorts", &snapshot.latest_shorts(SHORTS_LIMIT));

    let _ = writeln!(out, "\nCategories");
    let width = Category::ALL
        .iter()
        .map(|c| c.label().chars().count())
        .max()
        .unwrap_or(0);
    for (category, count) in snapshot.category_counts() {
        let _ = writeln!(out, "  {:<width$} {count}", category.label());
    }
    out
}

fn section(out: &mut String, title: &str, entries: &[&VideoEntry]) {
    let _ = writeln!(out, "\n{title}");
    for entry in entries {
        let _ = writeln!(
            out,
            "  [{:?}] {} | {} | {} | {}",
            entry.chaos_level,
            entry.display_title,
            entry.formatted_views,
            entry.relative_date,
            entry.formatted_duration,
        );
    }
}
