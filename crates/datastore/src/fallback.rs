use chrono::{TimeZone, Utc};
use domain::{ChannelStats, VideoRecord};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors raised while building a fallback table
#[derive(Debug, thiserror::Error)]
pub enum FallbackError {
    #[error("failed to read fallback file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse fallback file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid fallback data: {0}")]
    Invalid(String),
}

/// Sample data substituted for any resource that cannot be loaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackData {
    pub stats: ChannelStats,
    pub videos: Vec<VideoRecord>,
    pub shorts: Vec<VideoRecord>,
}

impl FallbackData {
    /// Load a fallback table from a JSON file shaped `{stats, videos, shorts}`
    pub fn from_json_file(path: &Path) -> Result<Self, FallbackError> {
        let content = std::fs::read_to_string(path).map_err(|e| FallbackError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_json_str(&content, &path.display().to_string())
    }

    pub fn from_json_str(content: &str, source_name: &str) -> Result<Self, FallbackError> {
        let data: FallbackData =
            serde_json::from_str(content).map_err(|e| FallbackError::Parse {
                path: source_name.to_string(),
                source: e,
            })?;
        data.validate()?;
        Ok(data)
    }

    fn validate(&self) -> Result<(), FallbackError> {
        for (field, records) in [("videos", &self.videos), ("shorts", &self.shorts)] {
            if records.is_empty() {
                return Err(FallbackError::Invalid(format!("`{field}` must not be empty")));
            }
            if let Some(index) = records.iter().position(|r| r.id.trim().is_empty()) {
                return Err(FallbackError::Invalid(format!(
                    "`{field}[{index}]` has a blank id"
                )));
            }
        }
        Ok(())
    }

    /// The built-in sample set shipped with the site
    pub fn builtin() -> Self {
        // Fixed point in time for consistent fallback data
        let fixed_time = Utc
            .with_ymd_and_hms(2025, 8, 1, 0, 0, 0)
            .single()
            .expect("Fixed datetime should be valid");

        let stats = ChannelStats {
            name: "LOGNEON".to_string(),
            handle: "@logneon".to_string(),
            subscriber_count: 168,
            video_count: 39,
            view_count: 75_000,
            description: "Explore something new here - Real YouTube channel".to_string(),
            last_updated: fixed_time,
        };

        let videos = vec![
            sample(
                "fu3Ja6zC5Ss",
                "Make RJ45 Ethernet Cable at Home | Crimp + Punch Tool | Speed & Ping Test",
                "Learn how to make professional RJ45 Ethernet cables at home using crimp and punch tools. Includes comprehensive speed and ping testing of the homemade cables to ensure optimal performance.",
                "2024-07-14T10:00:00Z",
                63,
                "PT8M30S",
                true,
            ),
            sample(
                "L_jWHffIx5E",
                "Fix Eclipse Errors | Incompatible JVM | unable to locate shared library",
                "Complete solution for Eclipse IDE errors including JVM compatibility issues and shared library problems. Comprehensive developer troubleshooting guide.",
                "2022-07-14T10:00:00Z",
                18_000,
                "PT12M45S",
                true,
            ),
            sample(
                "M5QGkOGZubQ",
                "BSNL fiber speed test and ping review",
                "Comprehensive speed test and ping analysis of BSNL fiber internet connection. Real-world performance testing and comparison.",
                "2022-08-14T10:00:00Z",
                17_000,
                "PT15M20S",
                true,
            ),
            sample(
                "E_6d3JBBo4s",
                "How To Fill Distilled Water in Battery/Inverter | Alert ! | First check its TDS",
                "Proper method to fill distilled water in batteries and inverters. Important TDS testing procedures for battery maintenance and longevity.",
                "2023-01-14T10:00:00Z",
                9_600,
                "PT7M15S",
                true,
            ),
            sample(
                "dC-m50wHz6k",
                "BSNL Port Forwarding | Virtual Server | Dynamic IP | With HTTPS",
                "Complete guide to BSNL port forwarding setup with virtual server configuration, dynamic IP handling, and HTTPS setup for home servers.",
                "2023-02-14T10:00:00Z",
                8_200,
                "PT18M30S",
                true,
            ),
        ];

        let shorts = vec![
            sample(
                "shorts-5g-trick",
                "Unlimited 5G on Ground Floor with This Trick!",
                "Simple trick to get unlimited 5G signal on ground floor using signal amplification techniques.",
                "2025-08-01T10:00:00Z",
                6_400,
                "PT45S",
                false,
            ),
            sample(
                "shorts-spying-detection",
                "Someone Spying On Me Bhaagooo...",
                "Quick guide to detecting digital surveillance and privacy protection techniques for personal security.",
                "2025-07-15T10:00:00Z",
                1_200,
                "PT50S",
                false,
            ),
            sample(
                "shorts-laptop-storage",
                "Increase storage space in old laptop",
                "Easy methods to increase storage capacity in older laptops using various upgrade techniques and tools.",
                "2025-07-01T10:00:00Z",
                1_100,
                "PT55S",
                false,
            ),
        ];

        Self {
            stats,
            videos,
            shorts,
        }
    }
}

fn sample(
    id: &str,
    title: &str,
    description: &str,
    published_at: &str,
    view_count: u64,
    duration: &str,
    with_thumbnail: bool,
) -> VideoRecord {
    VideoRecord {
        id: id.to_string(),
        title: Some(title.to_string()),
        description: Some(description.to_string()),
        thumbnail: with_thumbnail.then(|| format!("https://i.ytimg.com/vi/{id}/maxresdefault.jpg")),
        published_at: Some(published_at.to_string()),
        view_count: Some(view_count),
        like_count: None,
        duration: Some(duration.to_string()),
        embed_url: Some(format!("https://www.youtube.com/embed/{id}")),
        youtube_url: Some(format!("https://www.youtube.com/watch?v={id}")),
    }
}
