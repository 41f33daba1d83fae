use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

use super::{
    parse_channel_ref, ChannelProfile, ChannelRef, MetricWindow, VideoMetric, VideoSource,
};
use crate::config::SEARCH_PAGE_SIZE;
use crate::duration::parse_duration;
use crate::error::AnalysisError;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Data API v3 client. All upstream JSON is narrowed into the crate's
/// metric shapes here; `serde_json::Value` never leaves this module.
pub struct YouTubeClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl YouTubeClient {
    pub fn new(http: reqwest::Client, api_key: Option<String>) -> Self {
        Self {
            http,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the client at a different API root (stub servers in tests).
    #[allow(dead_code)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        resource: &str,
        params: &[(&str, String)],
    ) -> Result<T, AnalysisError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AnalysisError::Config("YOUTUBE_API_KEY is not set".to_string()))?;

        let url = format!("{}/{}", self.base_url, resource);
        let resp = self
            .http
            .get(&url)
            .query(params)
            .query(&[("key", key)])
            .send()
            .await
            .map_err(|e| AnalysisError::Upstream(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AnalysisError::Upstream(format!(
                "YouTube {} returned {}: {}",
                resource,
                status,
                truncate(&body, 300)
            )));
        }

        resp.json::<T>()
            .await
            .map_err(|e| AnalysisError::Upstream(format!("invalid {} response: {}", resource, e)))
    }

    /// Resolve video ids into full metrics via `videos.list`, preserving
    /// the input order. Ids the API does not return are dropped.
    async fn hydrate_videos(&self, ids: &[String]) -> Result<Vec<VideoMetric>, AnalysisError> {
        let mut by_id: HashMap<String, VideoMetric> = HashMap::new();

        for chunk in ids.chunks(SEARCH_PAGE_SIZE as usize) {
            let resp: VideoListResponse = self
                .get_json(
                    "videos",
                    &[
                        ("part", "snippet,statistics,contentDetails".to_string()),
                        ("id", chunk.join(",")),
                        ("maxResults", SEARCH_PAGE_SIZE.to_string()),
                    ],
                )
                .await?;

            for item in resp.items {
                let metric = VideoMetric {
                    id: item.id.clone(),
                    published_at: parse_timestamp(&item.snippet.published_at),
                    views: parse_count(&item.statistics.view_count),
                    likes: parse_count(&item.statistics.like_count),
                    duration_seconds: parse_duration(&item.content_details.duration),
                };
                by_id.insert(item.id, metric);
            }
        }

        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    async fn list_channel(
        &self,
        selector: (&'static str, String),
    ) -> Result<Option<ChannelProfile>, AnalysisError> {
        let resp: ChannelListResponse = self
            .get_json(
                "channels",
                &[
                    ("part", "snippet,statistics,contentDetails".to_string()),
                    selector,
                ],
            )
            .await?;

        let Some(item) = resp.items.into_iter().next() else {
            return Ok(None);
        };

        let handle = (!item.snippet.custom_url.is_empty()).then(|| item.snippet.custom_url.clone());
        let url = match &handle {
            Some(h) => format!("https://www.youtube.com/{}", h),
            None => format!("https://www.youtube.com/channel/{}", item.id),
        };

        Ok(Some(ChannelProfile {
            id: item.id,
            title: item.snippet.title,
            handle,
            url,
            subscriber_count: parse_count(&item.statistics.subscriber_count),
            view_count: parse_count(&item.statistics.view_count),
            video_count: parse_count(&item.statistics.video_count),
            uploads_playlist_id: item.content_details.related_playlists.uploads,
        }))
    }
}

#[async_trait]
impl VideoSource for YouTubeClient {
    async fn search_window(
        &self,
        query: &str,
        published_after: DateTime<Utc>,
        published_before: DateTime<Utc>,
    ) -> Result<MetricWindow, AnalysisError> {
        let resp: SearchResponse = self
            .get_json(
                "search",
                &[
                    ("part", "id".to_string()),
                    ("type", "video".to_string()),
                    ("q", query.to_string()),
                    ("order", "viewCount".to_string()),
                    ("maxResults", SEARCH_PAGE_SIZE.to_string()),
                    ("publishedAfter", rfc3339(published_after)),
                    ("publishedBefore", rfc3339(published_before)),
                ],
            )
            .await?;

        let ids: Vec<String> = resp
            .items
            .into_iter()
            .map(|item| item.id.video_id)
            .filter(|id| !id.is_empty())
            .collect();

        debug!(
            "search '{}': {} ids, {} total matches",
            query,
            ids.len(),
            resp.page_info.total_results
        );

        let videos = if ids.is_empty() {
            Vec::new()
        } else {
            self.hydrate_videos(&ids).await?
        };

        Ok(MetricWindow {
            videos,
            total_results: resp.page_info.total_results,
        })
    }

    async fn channel_overview(
        &self,
        input: &str,
    ) -> Result<Option<ChannelProfile>, AnalysisError> {
        match parse_channel_ref(input) {
            ChannelRef::Id(id) => self.list_channel(("id", id)).await,
            ChannelRef::Handle(handle) => {
                self.list_channel(("forHandle", format!("@{}", handle))).await
            }
            ChannelRef::Username(name) => self.list_channel(("forUsername", name)).await,
            ChannelRef::Query(query) => {
                let resp: SearchResponse = self
                    .get_json(
                        "search",
                        &[
                            ("part", "id".to_string()),
                            ("type", "channel".to_string()),
                            ("q", query),
                            ("maxResults", "1".to_string()),
                        ],
                    )
                    .await?;

                let Some(channel_id) = resp
                    .items
                    .into_iter()
                    .map(|item| item.id.channel_id)
                    .find(|id| !id.is_empty())
                else {
                    return Ok(None);
                };

                self.list_channel(("id", channel_id)).await
            }
        }
    }

    async fn recent_uploads(
        &self,
        playlist_id: &str,
        limit: usize,
    ) -> Result<Vec<VideoMetric>, AnalysisError> {
        let mut ids: Vec<String> = Vec::with_capacity(limit);
        let mut page_token: Option<String> = None;

        // Uploads playlists are already newest-first; walk pages until we
        // have enough ids.
        loop {
            let mut params = vec![
                ("part", "contentDetails".to_string()),
                ("playlistId", playlist_id.to_string()),
                ("maxResults", SEARCH_PAGE_SIZE.to_string()),
            ];
            if let Some(token) = &page_token {
                params.push(("pageToken", token.clone()));
            }

            let resp: PlaylistItemsResponse = self.get_json("playlistItems", &params).await?;

            ids.extend(
                resp.items
                    .into_iter()
                    .map(|item| item.content_details.video_id)
                    .filter(|id| !id.is_empty()),
            );

            if ids.len() >= limit || resp.next_page_token.is_none() {
                break;
            }
            page_token = resp.next_page_token;
        }

        ids.truncate(limit);
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.hydrate_videos(&ids).await
    }
}

fn rfc3339(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_count(raw: &str) -> u64 {
    raw.parse().unwrap_or(0)
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

// ============================================================================
// Upstream response shapes (narrowed here, never exposed)
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SearchResponse {
    items: Vec<SearchItem>,
    page_info: PageInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PageInfo {
    total_results: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SearchItem {
    id: SearchItemId,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SearchItemId {
    video_id: String,
    channel_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct VideoListResponse {
    items: Vec<VideoItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct VideoItem {
    id: String,
    snippet: VideoSnippet,
    statistics: CountStatistics,
    content_details: VideoContentDetails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct VideoSnippet {
    published_at: String,
}

// The Data API serializes every count as a decimal string; absent counts
// (e.g. hidden like counts) parse to 0.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CountStatistics {
    view_count: String,
    like_count: String,
    subscriber_count: String,
    video_count: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct VideoContentDetails {
    duration: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ChannelListResponse {
    items: Vec<ChannelItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ChannelItem {
    id: String,
    snippet: ChannelSnippet,
    statistics: CountStatistics,
    content_details: ChannelContentDetails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ChannelSnippet {
    title: String,
    custom_url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ChannelContentDetails {
    related_playlists: RelatedPlaylists,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RelatedPlaylists {
    uploads: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PlaylistItemsResponse {
    items: Vec<PlaylistItem>,
    next_page_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PlaylistItem {
    content_details: PlaylistItemContentDetails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PlaylistItemContentDetails {
    video_id: String,
}
