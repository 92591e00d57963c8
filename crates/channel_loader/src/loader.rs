use crate::config::{LoaderConfig, RefreshPolicy, SourceConfig};
use crate::error::{ConfigError, LoadError};
use crate::progress::{self, NoProgress, ProgressSink};
use crate::source::{DirectorySource, HttpSource, ResourceSource};
use chrono::{DateTime, Utc};
use datastore::FallbackData;
use domain::{
    DeriveContext, LoadResult, Origin, Origins, Resource, StatsRecord, VideoEntry,
    VideoRecord, decode_entries, decode_stats, parse_timestamp, relative_date,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

pub const OFFLINE_NOTICE: &str = "Using offline content - dynamic loading unavailable";
pub const STALE_NOTICE: &str = "Showing previously loaded content - refresh unavailable";

/// Outcome of one fetch round, one slot per resource
#[derive(Debug)]
pub struct FetchRound {
    pub stats: Result<StatsRecord, LoadError>,
    pub videos: Result<Vec<VideoRecord>, LoadError>,
    pub shorts: Result<Vec<VideoRecord>, LoadError>,
}

impl FetchRound {
    pub fn all_failed(&self) -> bool {
        self.stats.is_err() && self.videos.is_err() && self.shorts.is_err()
    }

    fn errors(&self) -> impl Iterator<Item = &LoadError> {
        [
            self.stats.as_ref().err(),
            self.videos.as_ref().err(),
            self.shorts.as_ref().err(),
        ]
        .into_iter()
        .flatten()
    }
}

/// Loads the three channel resources and never fails: whatever cannot be
/// fetched is substituted, so every call yields a complete [`LoadResult`].
pub struct ChannelDataLoader {
    source: Arc<dyn ResourceSource>,
    fallback: Arc<FallbackData>,
    config: LoaderConfig,
    progress: Arc<dyn ProgressSink>,
}

impl ChannelDataLoader {
    pub fn new(source: Arc<dyn ResourceSource>, fallback: FallbackData, config: LoaderConfig) -> Self {
        Self {
            source,
            fallback: Arc::new(fallback),
            config,
            progress: Arc::new(NoProgress),
        }
    }

    /// Build the source and fallback table described by `config`
    pub fn from_config(config: LoaderConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let source: Arc<dyn ResourceSource> = match &config.source {
            SourceConfig::Http { base_url } => Arc::new(HttpSource::new(base_url.clone())?),
            SourceConfig::Directory { root } => Arc::new(DirectorySource::new(root.clone())),
        };
        let fallback = match &config.fallback_path {
            Some(path) => FallbackData::from_json_file(path)?,
            None => FallbackData::builtin(),
        };

        info!(source = %source.describe(), "channel data loader configured");
        Ok(Self::new(source, fallback, config))
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Load all resources.
    ///
    /// `previous` is the snapshot currently shown, if any. Without one, a
    /// round in which every resource fails is retried before committing to
    /// fallback data. With one, failed resources are resolved through the
    /// configured [`RefreshPolicy`].
    pub async fn load_all(&self, previous: Option<&LoadResult>) -> LoadResult {
        self.progress.report(10, progress::CONNECTING);
        let max_retries = self.config.retry.max_retries;

        let mut attempts = 0u32;
        let round = loop {
            attempts += 1;
            let round = self.fetch_round().await;
            if !round.all_failed() || previous.is_some() || attempts > max_retries {
                break round;
            }

            warn!(attempt = attempts, max_retries, "every resource failed, retrying");
            self.progress
                .report(30, &format!("Retry {attempts}/{max_retries}..."));
            tokio::time::sleep(self.config.retry.delay()).await;
        };

        for error in round.errors() {
            warn!(resource = %error.resource(), kind = error.kind(), %error, "resource unavailable");
        }

        self.progress.report(90, progress::ORGANIZING);
        let result = self.assemble(round, previous, attempts, Utc::now());

        if result.origins.any_live() {
            self.progress.report(100, progress::LOADED);
        } else {
            self.progress.report(100, progress::OFFLINE);
        }
        info!(
            attempts,
            videos = result.videos.len(),
            shorts = result.shorts.len(),
            origins = ?result.origins,
            "load complete"
        );
        result
    }

    /// Fetch only the stats document and return its `lastUpdated`.
    ///
    /// `Ok(None)` means the document is usable but carries no readable
    /// timestamp.
    pub async fn probe_last_updated(&self) -> Result<Option<DateTime<Utc>>, LoadError> {
        let record = self.fetch_stats().await?;
        Ok(record.last_updated.as_deref().and_then(parse_timestamp))
    }

    /// Run the three fetches concurrently under the overall deadline.
    ///
    /// Each fetch writes its own slot; a slot still empty when the deadline
    /// passes counts as timed out while settled slots keep their result.
    pub async fn fetch_round(&self) -> FetchRound {
        self.progress.report(30, progress::LOADING);

        let overall = self.config.timeouts.overall();
        let mut stats = None;
        let mut videos = None;
        let mut shorts = None;

        let joined = async {
            tokio::join!(
                async { stats = Some(self.fetch_stats().await) },
                async { videos = Some(self.fetch_entries(Resource::Videos).await) },
                async { shorts = Some(self.fetch_entries(Resource::Shorts).await) },
            )
        };
        if tokio::time::timeout(overall, joined).await.is_err() {
            warn!(?overall, "overall load deadline exceeded");
        }

        self.progress.report(70, progress::PROCESSING);
        let timed_out = |resource: Resource| LoadError::Timeout {
            resource,
            after: overall,
        };
        FetchRound {
            stats: stats.unwrap_or_else(|| Err(timed_out(Resource::Stats))),
            videos: videos.unwrap_or_else(|| Err(timed_out(Resource::Videos))),
            shorts: shorts.unwrap_or_else(|| Err(timed_out(Resource::Shorts))),
        }
    }

    async fn fetch_raw(&self, resource: Resource) -> Result<Value, LoadError> {
        let limit = self.config.timeouts.per_resource();
        let path = self.config.paths.get(resource);

        match tokio::time::timeout(limit, self.source.fetch(resource, path)).await {
            Ok(result) => result,
            Err(_) => Err(LoadError::Timeout {
                resource,
                after: limit,
            }),
        }
    }

    async fn fetch_stats(&self) -> Result<StatsRecord, LoadError> {
        let payload = self.fetch_raw(Resource::Stats).await?;
        decode_stats(payload).map_err(|e| LoadError::payload(Resource::Stats, e))
    }

    async fn fetch_entries(&self, resource: Resource) -> Result<Vec<VideoRecord>, LoadError> {
        let payload = self.fetch_raw(resource).await?;
        let records =
            decode_entries(payload, resource.as_str()).map_err(|e| LoadError::payload(resource, e))?;
        info!(%resource, entries = records.len(), "loaded resource");
        Ok(records)
    }

    /// Merge a fetch round into a snapshot, resolving every failed slot
    pub fn assemble(
        &self,
        round: FetchRound,
        previous: Option<&LoadResult>,
        attempts: u32,
        now: DateTime<Utc>,
    ) -> LoadResult {
        let ctx = DeriveContext::new(now, self.config.chaos);
        // Previous values are only reused under preserve-last-good, and only
        // when they were not fallback data themselves.
        let carried = previous.filter(|_| self.config.refresh.policy == RefreshPolicy::PreserveLastGood);
        let reusable = |resource: Resource| carried.filter(|p| p.origins.get(resource) != Origin::Fallback);

        let mut origins = Origins::uniform(Origin::Live);

        let stats = match round.stats {
            Ok(record) => record.into_stats(&self.fallback.stats, now),
            Err(_) => match reusable(Resource::Stats) {
                Some(p) => {
                    origins.set(Resource::Stats, Origin::Previous);
                    p.stats.clone()
                }
                None => {
                    origins.set(Resource::Stats, Origin::Fallback);
                    self.fallback.stats.clone()
                }
            },
        };

        let mut entries = |resource: Resource, slot: Result<Vec<VideoRecord>, LoadError>| match slot {
            Ok(records) => ctx.entries(records),
            Err(_) => match reusable(resource) {
                Some(p) => {
                    origins.set(resource, Origin::Previous);
                    let kept = match resource {
                        Resource::Shorts => &p.shorts,
                        _ => &p.videos,
                    };
                    refreshed_dates(kept, now)
                }
                None => {
                    origins.set(resource, Origin::Fallback);
                    let fallback = match resource {
                        Resource::Shorts => &self.fallback.shorts,
                        _ => &self.fallback.videos,
                    };
                    ctx.entries(fallback.clone())
                }
            },
        };
        let videos = entries(Resource::Videos, round.videos);
        let shorts = entries(Resource::Shorts, round.shorts);

        let notice = if origins.any_live() {
            None
        } else if origins.all_fallback() {
            Some(OFFLINE_NOTICE.to_string())
        } else {
            Some(STALE_NOTICE.to_string())
        };

        LoadResult {
            stats,
            videos,
            shorts,
            origins,
            loaded_at: now,
            attempts,
            notice,
        }
    }
}

// Entries carried into a new snapshot get their relative dates recomputed.
fn refreshed_dates(entries: &[VideoEntry], now: DateTime<Utc>) -> Vec<VideoEntry> {
    entries
        .iter()
        .cloned()
        .map(|mut entry| {
            entry.relative_date = relative_date(entry.published_at, now);
            entry
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Reply, ScriptedSource, live_shorts, live_stats, live_videos};
    use std::sync::Mutex;

    fn loader(source: Arc<ScriptedSource>, config: LoaderConfig) -> ChannelDataLoader {
        ChannelDataLoader::new(source, FallbackData::builtin(), config)
    }

    fn all_live() -> Arc<ScriptedSource> {
        let source = ScriptedSource::new();
        source.set(Resource::Stats, Reply::Json(live_stats()));
        source.set(Resource::Videos, Reply::Json(live_videos()));
        source.set(Resource::Shorts, Reply::Json(live_shorts()));
        Arc::new(source)
    }

    #[tokio::test]
    async fn loads_everything_live() {
        let result = loader(all_live(), LoaderConfig::default()).load_all(None).await;

        assert_eq!(result.origins, Origins::uniform(Origin::Live));
        assert_eq!(result.attempts, 1);
        assert_eq!(result.notice, None);
        assert_eq!(result.stats.subscriber_count, 201);
        assert_eq!(result.videos.len(), 3);
        assert_eq!(result.shorts.len(), 1);
        // stored in source order, not sorted
        assert_eq!(result.videos[0].id, "live-a");
    }

    #[tokio::test]
    async fn failed_resource_falls_back_alone() {
        let source = all_live();
        source.set(Resource::Videos, Reply::Fail);

        let result = loader(source, LoaderConfig::default()).load_all(None).await;

        assert_eq!(result.origins.videos, Origin::Fallback);
        assert_eq!(result.origins.stats, Origin::Live);
        assert_eq!(result.origins.shorts, Origin::Live);
        let builtin = FallbackData::builtin();
        assert_eq!(result.videos.len(), builtin.videos.len());
        assert_eq!(result.videos[0].id, builtin.videos[0].id);
        assert_eq!(result.shorts[0].id, "live-short");
        assert_eq!(result.notice, None);
    }

    #[tokio::test]
    async fn malformed_payload_falls_back() {
        let source = all_live();
        source.set(Resource::Videos, Reply::Json(serde_json::json!({ "foo": 1 })));
        source.set(Resource::Stats, Reply::Json(serde_json::json!(["not", "stats"])));

        let result = loader(source, LoaderConfig::default()).load_all(None).await;

        assert_eq!(result.origins.videos, Origin::Fallback);
        assert_eq!(result.origins.stats, Origin::Fallback);
        assert_eq!(result.stats, FallbackData::builtin().stats);
        assert!(!result.videos.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn total_failure_retries_then_commits_to_fallback() {
        let source = Arc::new(ScriptedSource::new());
        let statuses = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let statuses = statuses.clone();
            move |percent: u8, status: &str| {
                statuses
                    .lock()
                    .expect("progress lock")
                    .push((percent, status.to_string()));
            }
        };

        let result = loader(source.clone(), LoaderConfig::default())
            .with_progress(Arc::new(sink))
            .load_all(None)
            .await;

        assert_eq!(result.attempts, 3);
        assert_eq!(source.calls(), 9);
        assert!(result.origins.all_fallback());
        assert_eq!(result.notice.as_deref(), Some(OFFLINE_NOTICE));
        assert!(!result.videos.is_empty());
        assert!(!result.shorts.is_empty());

        let statuses = statuses.lock().expect("progress lock");
        assert_eq!(statuses.first(), Some(&(10, progress::CONNECTING.to_string())));
        assert!(statuses.contains(&(30, "Retry 1/2...".to_string())));
        assert!(statuses.contains(&(30, "Retry 2/2...".to_string())));
        assert_eq!(statuses.last(), Some(&(100, progress::OFFLINE.to_string())));
    }

    #[tokio::test(start_paused = true)]
    async fn stats_without_channel_fields_count_as_failed() {
        let source = Arc::new(ScriptedSource::new());
        source.set(Resource::Stats, Reply::Json(serde_json::json!({ "foo": 1 })));

        let result = loader(source, LoaderConfig::default()).load_all(None).await;

        assert_eq!(result.attempts, 3);
        assert!(result.origins.all_fallback());
        assert_eq!(result.notice.as_deref(), Some(OFFLINE_NOTICE));
    }

    #[tokio::test(start_paused = true)]
    async fn retry_stops_once_something_loads() {
        let source = Arc::new(ScriptedSource::new());
        source.fail_first(3);
        source.set(Resource::Stats, Reply::Json(live_stats()));
        source.set(Resource::Videos, Reply::Json(live_videos()));
        source.set(Resource::Shorts, Reply::Json(live_shorts()));

        let result = loader(source.clone(), LoaderConfig::default()).load_all(None).await;

        assert_eq!(result.attempts, 2);
        assert_eq!(result.origins, Origins::uniform(Origin::Live));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_resource_times_out_alone() {
        let source = all_live();
        source.set(Resource::Shorts, Reply::Hang);

        let result = loader(source, LoaderConfig::default()).load_all(None).await;

        assert_eq!(result.origins.shorts, Origin::Fallback);
        assert_eq!(result.origins.videos, Origin::Live);
        assert_eq!(result.origins.stats, Origin::Live);
    }

    #[tokio::test(start_paused = true)]
    async fn overall_deadline_keeps_settled_slots() {
        // `new` skips validation, so the overall deadline can fire first.
        let mut config = LoaderConfig::default();
        config.timeouts.per_resource_ms = 10_000;
        config.timeouts.overall_ms = 3_000;
        let source = all_live();
        source.set(Resource::Videos, Reply::Hang);

        let round = loader(source, config).fetch_round().await;

        assert!(round.stats.is_ok());
        assert!(round.shorts.is_ok());
        match round.videos {
            Err(LoadError::Timeout { resource, after }) => {
                assert_eq!(resource, Resource::Videos);
                assert_eq!(after, std::time::Duration::from_millis(3_000));
            }
            other => panic!("expected an overall timeout, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn previous_snapshot_skips_retries() {
        let previous = loader(all_live(), LoaderConfig::default()).load_all(None).await;

        let source = Arc::new(ScriptedSource::new());
        let result = loader(source.clone(), LoaderConfig::default())
            .load_all(Some(&previous))
            .await;

        assert_eq!(source.calls(), 3);
        assert_eq!(result.attempts, 1);
        assert_eq!(result.origins, Origins::uniform(Origin::Previous));
        assert_eq!(result.videos[0].id, previous.videos[0].id);
        assert_eq!(result.stats, previous.stats);
        assert_eq!(result.notice.as_deref(), Some(STALE_NOTICE));
    }

    #[tokio::test]
    async fn preserve_policy_keeps_last_good_resource() {
        let previous = loader(all_live(), LoaderConfig::default()).load_all(None).await;
        let source = all_live();
        source.set(Resource::Videos, Reply::Fail);

        let result = loader(source, LoaderConfig::default())
            .load_all(Some(&previous))
            .await;

        assert_eq!(result.origins.videos, Origin::Previous);
        assert_eq!(result.videos, previous.videos);
        assert_eq!(result.origins.shorts, Origin::Live);
    }

    #[tokio::test]
    async fn replace_policy_uses_fallback_after_real_data() {
        let mut config = LoaderConfig::default();
        config.refresh.policy = RefreshPolicy::ReplaceWithFallback;
        let previous = loader(all_live(), config.clone()).load_all(None).await;
        let source = all_live();
        source.set(Resource::Videos, Reply::Fail);

        let result = loader(source, config).load_all(Some(&previous)).await;

        assert_eq!(result.origins.videos, Origin::Fallback);
        assert_eq!(result.videos[0].id, FallbackData::builtin().videos[0].id);
    }

    #[tokio::test]
    async fn fallback_in_previous_is_not_carried_as_previous() {
        let source = all_live();
        source.set(Resource::Shorts, Reply::Fail);
        let previous = loader(source.clone(), LoaderConfig::default()).load_all(None).await;
        assert_eq!(previous.origins.shorts, Origin::Fallback);

        let result = loader(source, LoaderConfig::default())
            .load_all(Some(&previous))
            .await;
        assert_eq!(result.origins.shorts, Origin::Fallback);
    }

    #[tokio::test]
    async fn probes_last_updated() {
        let source = all_live();
        let probed = loader(source.clone(), LoaderConfig::default())
            .probe_last_updated()
            .await
            .unwrap()
            .unwrap();
        assert_eq!(probed.to_rfc3339(), "2025-09-01T06:00:00+00:00");
        assert_eq!(source.calls(), 1);

        source.set(Resource::Stats, Reply::Json(serde_json::json!({ "name": "x" })));
        let probed = loader(source.clone(), LoaderConfig::default())
            .probe_last_updated()
            .await
            .unwrap();
        assert_eq!(probed, None);

        source.set(Resource::Stats, Reply::Json(serde_json::json!({ "foo": 1 })));
        let err = loader(source, LoaderConfig::default())
            .probe_last_updated()
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "parse");
    }

    #[tokio::test]
    async fn from_config_reads_directory_and_fallback_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("data")).unwrap();
        std::fs::write(
            dir.path().join("data/youtube-stats.json"),
            live_stats().to_string(),
        )
        .unwrap();

        let mut fallback = FallbackData::builtin();
        fallback.videos.truncate(1);
        fallback.videos[0].id = "custom-fallback".to_string();
        let fallback_path = dir.path().join("fallback.json");
        std::fs::write(&fallback_path, serde_json::to_string(&fallback).unwrap()).unwrap();

        let config = LoaderConfig {
            source: SourceConfig::Directory {
                root: dir.path().to_path_buf(),
            },
            fallback_path: Some(fallback_path),
            ..LoaderConfig::default()
        };
        let result = ChannelDataLoader::from_config(config)
            .unwrap()
            .load_all(None)
            .await;

        assert_eq!(result.origins.stats, Origin::Live);
        assert_eq!(result.origins.videos, Origin::Fallback);
        assert_eq!(result.videos.len(), 1);
        assert_eq!(result.videos[0].id, "custom-fallback");
    }

    #[test]
    fn from_config_rejects_invalid_fallback_file() {
        let dir = tempfile::tempdir().unwrap();
        let fallback_path = dir.path().join("fallback.json");
        std::fs::write(&fallback_path, "{}").unwrap();

        let config = LoaderConfig {
            fallback_path: Some(fallback_path),
            ..LoaderConfig::default()
        };
        assert!(matches!(
            ChannelDataLoader::from_config(config),
            Err(ConfigError::Fallback(_))
        ));
    }
}
