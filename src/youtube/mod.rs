pub mod client;

pub use client::YouTubeClient;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// One video's raw measurements, narrowed from the upstream API at the
/// fetch boundary. Immutable once constructed; missing upstream fields
/// resolve to zero here, never downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetric {
    pub id: String,
    pub published_at: DateTime<Utc>,
    pub views: u64,
    pub likes: u64,
    pub duration_seconds: u32,
}

/// A batch of videos for one time window. `total_results` is the
/// upstream-reported match count and may exceed `videos.len()` because of
/// page limits; it is a cadence proxy, not a count of `videos`.
#[derive(Debug, Clone, Default)]
pub struct MetricWindow {
    pub videos: Vec<VideoMetric>,
    pub total_results: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelProfile {
    pub id: String,
    pub title: String,
    pub handle: Option<String>,
    pub url: String,
    pub subscriber_count: u64,
    pub view_count: u64,
    pub video_count: u64,
    pub uploads_playlist_id: String,
}

/// Boundary to the video platform. The scoring engines only ever see the
/// shapes above; route tests substitute a counting mock here.
#[async_trait]
pub trait VideoSource: Send + Sync {
    /// Top videos matching `query` published inside [after, before).
    async fn search_window(
        &self,
        query: &str,
        published_after: DateTime<Utc>,
        published_before: DateTime<Utc>,
    ) -> Result<MetricWindow, AnalysisError>;

    /// Resolve a channel reference and fetch its profile. `Ok(None)` means
    /// the reference matched nothing.
    async fn channel_overview(&self, input: &str)
        -> Result<Option<ChannelProfile>, AnalysisError>;

    /// The channel's most recent uploads, flattened across result pages.
    async fn recent_uploads(
        &self,
        playlist_id: &str,
        limit: usize,
    ) -> Result<Vec<VideoMetric>, AnalysisError>;
}

/// How a raw channel input string should be resolved upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelRef {
    /// A `UC…` channel id, usable directly.
    Id(String),
    /// An `@handle`, stored without the `@`.
    Handle(String),
    /// A legacy `/user/` username.
    Username(String),
    /// Free text, resolved via channel search.
    Query(String),
}

pub fn parse_channel_ref(input: &str) -> ChannelRef {
    let input = input.trim();

    if looks_like_channel_id(input) {
        return ChannelRef::Id(input.to_string());
    }

    if let Some(handle) = input.strip_prefix('@') {
        return ChannelRef::Handle(handle.to_string());
    }

    if input.contains("youtube.com/") || input.contains("youtu.be/") {
        if let Some(parsed) = parse_channel_url(input) {
            return parsed;
        }
    }

    ChannelRef::Query(input.to_string())
}

fn looks_like_channel_id(s: &str) -> bool {
    s.len() == 24
        && s.starts_with("UC")
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn parse_channel_url(input: &str) -> Option<ChannelRef> {
    let with_scheme = if input.starts_with("http://") || input.starts_with("https://") {
        input.to_string()
    } else {
        format!("https://{}", input)
    };
    let url = url::Url::parse(&with_scheme).ok()?;

    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
    match segments.next()? {
        "channel" => {
            let id = segments.next()?;
            looks_like_channel_id(id).then(|| ChannelRef::Id(id.to_string()))
        }
        "user" => Some(ChannelRef::Username(segments.next()?.to_string())),
        "c" => Some(ChannelRef::Query(segments.next()?.to_string())),
        seg if seg.starts_with('@') => {
            Some(ChannelRef::Handle(seg.trim_start_matches('@').to_string()))
        }
        _ => None,
    }
}
