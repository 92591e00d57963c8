use crate::model::ChannelStats;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::warn;

/// Why a fetched JSON document could not be used
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    #[error("expected a JSON object")]
    NotAnObject,
    #[error("expected an array or an object with a `{0}` array")]
    UnexpectedShape(&'static str),
    #[error("object has no `{0}` field")]
    MissingField(&'static str),
    #[error("`{0}` is not an array")]
    NotAnArray(&'static str),
    #[error("no usable entries in `{0}`")]
    Empty(&'static str),
    #[error("invalid stats object: {0}")]
    InvalidStats(String),
    #[error("stats object carries none of the channel fields")]
    NoStatsFields,
}

/// Channel statistics as written by the collection job.
///
/// Every field is optional so that a partial document still contributes
/// what it has; gaps are filled from the fallback stats.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub subscriber_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub video_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub view_count: Option<u64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

impl StatsRecord {
    fn has_channel_fields(&self) -> bool {
        self.name.is_some()
            || self.handle.is_some()
            || self.subscriber_count.is_some()
            || self.video_count.is_some()
            || self.view_count.is_some()
            || self.last_updated.is_some()
    }

    /// Complete the record with `defaults`; an absent or unparseable
    /// `lastUpdated` becomes `now`.
    pub fn into_stats(self, defaults: &ChannelStats, now: DateTime<Utc>) -> ChannelStats {
        ChannelStats {
            name: non_blank(self.name).unwrap_or_else(|| defaults.name.clone()),
            handle: non_blank(self.handle).unwrap_or_else(|| defaults.handle.clone()),
            subscriber_count: self.subscriber_count.unwrap_or(defaults.subscriber_count),
            video_count: self.video_count.unwrap_or(defaults.video_count),
            view_count: self.view_count.unwrap_or(defaults.view_count),
            description: non_blank(self.description)
                .unwrap_or_else(|| defaults.description.clone()),
            last_updated: self
                .last_updated
                .as_deref()
                .and_then(parse_timestamp)
                .unwrap_or(now),
        }
    }
}

/// One video or short as written by the collection job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub view_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub like_count: Option<u64>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub embed_url: Option<String>,
    #[serde(default)]
    pub youtube_url: Option<String>,
}

/// Decode the stats document.
///
/// Anything but a JSON object is rejected, and so is an object without a
/// single recognisable channel field (an error body, `{}`).
pub fn decode_stats(payload: Value) -> Result<StatsRecord, PayloadError> {
    if !payload.is_object() {
        return Err(PayloadError::NotAnObject);
    }
    let record: StatsRecord =
        serde_json::from_value(payload).map_err(|e| PayloadError::InvalidStats(e.to_string()))?;
    if !record.has_channel_fields() {
        return Err(PayloadError::NoStatsFields);
    }
    Ok(record)
}

/// Decode a videos or shorts document.
///
/// Accepts a bare array or an object carrying the array under `field`.
/// Entries that fail to decode, have a blank id, or repeat an earlier id are
/// skipped; a document left with no entries is an error.
pub fn decode_entries(payload: Value, field: &'static str) -> Result<Vec<VideoRecord>, PayloadError> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove(field) {
            Some(Value::Array(items)) => items,
            Some(_) => return Err(PayloadError::NotAnArray(field)),
            None => return Err(PayloadError::MissingField(field)),
        },
        _ => return Err(PayloadError::UnexpectedShape(field)),
    };

    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<VideoRecord>(item) {
            Ok(record) if record.id.trim().is_empty() => {
                warn!(field, index, "skipping entry with blank id");
            }
            Ok(record) => {
                if seen.insert(record.id.clone()) {
                    records.push(record);
                } else {
                    warn!(field, index, id = %record.id, "skipping duplicate entry");
                }
            }
            Err(error) => {
                warn!(field, index, %error, "skipping undecodable entry");
            }
        }
    }

    if records.is_empty() {
        return Err(PayloadError::Empty(field));
    }
    Ok(records)
}

/// Parse an RFC 3339 timestamp, or a bare `YYYY-MM-DD` date read as
/// midnight UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|t| t.and_utc())
        })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// The YouTube API reports counts as strings; the job usually converts them
// but older documents still carry strings. Negative values clamp to zero and
// anything non-numeric reads as missing.
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_i64().map(|i| i.max(0) as u64))
            .or_else(|| n.as_f64().map(|f| f.max(0.0) as u64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<i64>().ok().map(|i| i.max(0) as u64))
                .or_else(|| s.parse::<f64>().ok().map(|f| f.max(0.0) as u64))
        }
        _ => None,
    }))
}
