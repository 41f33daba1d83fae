use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::client_ip;
use super::niche::{check_usage, record_usage};
use crate::cache::channel_key;
use crate::config::{CHANNEL_RECENT_UPLOADS, REPORT_CACHE_TTL_SECS};
use crate::error::AnalysisError;
use crate::scoring::{analyze_channel, ChannelReport};
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct ChannelRequest {
    pub channel: Option<String>,
}

/// POST /api/channel — cadence/engagement/consistency metrics for one
/// channel's recent uploads.
///
/// The channel reference has to be resolved before the cache can be
/// consulted (the key is the canonical channel id, not the user's input),
/// so resolution sits between the gate and the cache lookup.
pub async fn analyze(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(req): Json<ChannelRequest>,
) -> Result<Json<ChannelReport>, AnalysisError> {
    let input = req.channel.as_deref().unwrap_or("").trim().to_string();
    if input.is_empty() {
        return Err(AnalysisError::Validation(
            "A channel link, handle, or name is required".to_string(),
        ));
    }

    let ip = client_ip(&headers);
    let usage = check_usage(&state, &ip)?;

    let Some(profile) = state.source.channel_overview(&input).await? else {
        return Err(AnalysisError::NotFound(format!(
            "Could not find a channel matching \"{}\"",
            input
        )));
    };

    let key = channel_key(&profile.id);
    match state.cache.get::<ChannelReport>(&key) {
        Ok(Some(report)) => {
            debug!("cache hit for {}", key);
            record_usage(&state, &usage);
            return Ok(Json(report));
        }
        Ok(None) => {}
        Err(e) => warn!("cache read failed for {}: {}", key, e),
    }

    let videos = state
        .source
        .recent_uploads(&profile.uploads_playlist_id, CHANNEL_RECENT_UPLOADS)
        .await?;

    if videos.is_empty() {
        return Err(AnalysisError::NotFound(format!(
            "Channel \"{}\" has no recent uploads to analyze",
            profile.title
        )));
    }

    let report = analyze_channel(profile, videos, Utc::now());
    info!(
        "channel '{}': sample={} uploads/week={}",
        report.channel.title, report.sample_size, report.metrics.uploads_per_week
    );

    if let Err(e) = state.cache.set(&key, &report, REPORT_CACHE_TTL_SECS) {
        warn!("cache write failed for {}: {}", key, e);
    }
    record_usage(&state, &usage);

    Ok(Json(report))
}
