use chrono::{DateTime, Utc};

/// Compact count as shown on cards and stat counters: `999`, `1.3K`, `2.0M`
pub fn format_compact(count: u64) -> String {
    if count >= 1_000_000 {
        scaled(count, 1_000_000, 'M')
    } else if count >= 1_000 {
        scaled(count, 1_000, 'K')
    } else {
        count.to_string()
    }
}

// One decimal place, half rounds up. Integer math keeps 1250 -> 1.3K exact.
fn scaled(count: u64, unit: u64, suffix: char) -> String {
    let tenths = (u128::from(count) * 10 + u128::from(unit) / 2) / u128::from(unit);
    format!("{}.{}{}", tenths / 10, tenths % 10, suffix)
}

/// View count label, always ending in `views`
pub fn format_views(count: u64) -> String {
    format!("{} views", format_compact(count))
}

/// Human relative date bucketed on whole elapsed days.
///
/// Timestamps in the future count as zero days, so the result is never a
/// negative duration. A missing timestamp reads `Recently`.
pub fn relative_date(published_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(published_at) = published_at else {
        return "Recently".to_string();
    };

    let days = (now - published_at).num_days().max(0);
    match days {
        0 => "Today".to_string(),
        1..=6 => ago(days, "day"),
        7..=29 => ago(days / 7, "week"),
        30..=364 => ago(days / 30, "month"),
        _ => ago(days / 365, "year"),
    }
}

fn ago(amount: i64, unit: &str) -> String {
    if amount == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{amount} {unit}s ago")
    }
}

/// Player-style duration: `8:30`, `1:02:03`. Empty when unknown.
pub fn format_duration(seconds: Option<u64>) -> String {
    let Some(total) = seconds else {
        return String::new();
    };

    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

/// Cut `text` to `max_chars` characters followed by `...`, or return
/// `placeholder` when the text is blank.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize, placeholder: &str) -> String {
    if text.trim().is_empty() {
        return placeholder.to_string();
    }

    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
