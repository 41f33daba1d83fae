use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::{Duration, Utc};
use futures::future::try_join;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::client_ip;
use crate::cache::niche_key;
use crate::config::{REPORT_CACHE_TTL_SECS, SEARCH_WINDOW_DAYS, TOPIC_MAX_LEN};
use crate::error::AnalysisError;
use crate::scoring::{analyze_niche, NicheReport};
use crate::state::SharedState;
use crate::usage::{hash_ip, UsageCheck};

#[derive(Debug, Deserialize)]
pub struct NicheRequest {
    pub topic: Option<String>,
}

/// POST /api/niche — score a topic from two 30-day fetch windows.
///
/// Order matters: the quota gate runs before any cache or upstream work,
/// and a cache hit still counts against the quota.
pub async fn analyze(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(req): Json<NicheRequest>,
) -> Result<Json<NicheReport>, AnalysisError> {
    let topic = req.topic.as_deref().unwrap_or("").trim().to_string();
    if topic.is_empty() {
        return Err(AnalysisError::Validation("A topic is required".to_string()));
    }
    if topic.chars().count() > TOPIC_MAX_LEN {
        return Err(AnalysisError::Validation(format!(
            "Topic must be {} characters or fewer",
            TOPIC_MAX_LEN
        )));
    }

    let ip = client_ip(&headers);
    let usage = check_usage(&state, &ip)?;

    let key = niche_key(&topic);
    match state.cache.get::<NicheReport>(&key) {
        Ok(Some(report)) => {
            debug!("cache hit for {}", key);
            record_usage(&state, &usage);
            return Ok(Json(report));
        }
        Ok(None) => {}
        Err(e) => warn!("cache read failed for {}: {}", key, e),
    }

    // The two windows have no data dependency, so fetch them concurrently.
    let now = Utc::now();
    let window = Duration::days(SEARCH_WINDOW_DAYS);
    let (recent, previous) = try_join(
        state.source.search_window(&topic, now - window, now),
        state.source.search_window(&topic, now - window * 2, now - window),
    )
    .await?;

    if recent.videos.is_empty() {
        return Err(AnalysisError::NotFound(format!(
            "No recent videos found for \"{}\"",
            topic
        )));
    }

    let report = analyze_niche(&topic, &recent, &previous, now);
    info!(
        "niche '{}': score={} verdict={} sample={}",
        topic, report.score, report.verdict.label, report.sample_size
    );

    if let Err(e) = state.cache.set(&key, &report, REPORT_CACHE_TTL_SECS) {
        warn!("cache write failed for {}: {}", key, e);
    }
    record_usage(&state, &usage);

    Ok(Json(report))
}

/// Run the quota gate. A failing usage store degrades to "allowed" so a
/// secondary store outage cannot take the whole feature down.
pub(super) fn check_usage(state: &SharedState, ip: &str) -> Result<UsageCheck, AnalysisError> {
    let usage = match state.usage.check(ip) {
        Ok(usage) => usage,
        Err(e) => {
            warn!("usage check failed, allowing request: {}", e);
            UsageCheck {
                allowed: true,
                analyses_used: 0,
                ip_hash: hash_ip(ip),
            }
        }
    };

    if !usage.allowed {
        return Err(AnalysisError::QuotaExceeded {
            analyses_used: usage.analyses_used,
        });
    }
    Ok(usage)
}

pub(super) fn record_usage(state: &SharedState, usage: &UsageCheck) {
    if let Err(e) = state.usage.record(&usage.ip_hash, usage.analyses_used + 1) {
        warn!("usage record failed: {}", e);
    }
}
