use regex::Regex;
use std::sync::LazyLock;

/// Longest duration, in seconds, that still counts as a short
pub const SHORT_MAX_SECONDS: u64 = 60;

static ISO8601_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)(?:\.\d+)?S)?)?$")
        .expect("duration pattern is valid")
});

/// Parse an ISO-8601 duration as reported by YouTube (`PT8M30S`, `P1DT2H`)
/// into whole seconds. Returns `None` for anything else, including a bare
/// `P` or `PT`.
pub fn parse_iso8601_duration(duration: &str) -> Option<u64> {
    let captures = ISO8601_DURATION.captures(duration.trim())?;

    let weights = [86_400u64, 3600, 60, 1];
    let mut matched = false;
    let mut total = 0u64;
    for (index, weight) in weights.iter().enumerate() {
        if let Some(group) = captures.get(index + 1) {
            matched = true;
            let value: u64 = group.as_str().parse().ok()?;
            total = total.checked_add(value.checked_mul(*weight)?)?;
        }
    }

    matched.then_some(total)
}

/// Whether a video of `seconds` length belongs in the shorts grid
pub fn is_short(seconds: u64) -> bool {
    seconds <= SHORT_MAX_SECONDS
}
