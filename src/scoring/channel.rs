use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::derive_stats;
use crate::config::{
    CONSISTENCY_CADENCE_TARGET_PER_WEEK, CONSISTENCY_VARIANCE_NORM, SHORTS_MAX_DURATION_SECS,
};
use crate::stats::{average, clamp, round1, std_deviation};
use crate::youtube::{ChannelProfile, VideoMetric};

/// Channel-level aggregates. Unlike the niche engine this surfaces raw
/// metrics only; interpretation is left to the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelMetrics {
    pub avg_views: f64,
    pub median_views: f64,
    pub uploads_per_week: f64,
    pub views_per_month: f64,
    pub engagement_per_1k: f64,
    pub consistency_score: u8,
    pub avg_duration_seconds: f64,
    pub shorts_share: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelReport {
    pub channel: ChannelProfile,
    pub metrics: ChannelMetrics,
    pub videos: Vec<VideoMetric>,
    pub sample_size: usize,
    pub updated_at: String,
}

pub fn analyze_channel(
    channel: ChannelProfile,
    videos: Vec<VideoMetric>,
    now: DateTime<Utc>,
) -> ChannelReport {
    let stats = derive_stats(&videos);
    let uploads_per_week = uploads_per_week(&videos);

    let metrics = ChannelMetrics {
        avg_views: round1(stats.avg_views),
        median_views: round1(stats.median_views),
        uploads_per_week,
        views_per_month: views_per_month(&videos, now),
        engagement_per_1k: round1(stats.likes_per_1k),
        consistency_score: consistency_score(uploads_per_week, &stats.views, stats.avg_views),
        avg_duration_seconds: round1(stats.avg_duration_seconds),
        shorts_share: shorts_share(&videos),
    };

    ChannelReport {
        sample_size: videos.len(),
        channel,
        metrics,
        videos,
        updated_at: now.to_rfc3339(),
    }
}

/// Observed cadence across the sample: span between the oldest and newest
/// upload in weeks (floored at one day), divided into the video count.
/// Needs at least two videos to define a span.
fn uploads_per_week(videos: &[VideoMetric]) -> f64 {
    if videos.len() < 2 {
        return 0.0;
    }
    let mut published: Vec<DateTime<Utc>> = videos.iter().map(|v| v.published_at).collect();
    published.sort();

    let elapsed_days = (published[published.len() - 1] - published[0]).num_days().max(1);
    let weeks = elapsed_days as f64 / 7.0;
    round1(videos.len() as f64 / weeks)
}

/// Steady-state monthly view rate: per-video views-per-day (age-adjusted,
/// age floored at one day), averaged, then scaled to 30 days. This keeps a
/// week-old hit from reading like a monthly baseline.
fn views_per_month(videos: &[VideoMetric], now: DateTime<Utc>) -> f64 {
    if videos.is_empty() {
        return 0.0;
    }
    let daily_rates: Vec<f64> = videos
        .iter()
        .map(|v| {
            let age_days = (now - v.published_at).num_days().max(1) as f64;
            v.views as f64 / age_days
        })
        .collect();

    (average(&daily_rates) * 30.0).round()
}

/// Percentage of the sample at or under the Shorts duration cap.
fn shorts_share(videos: &[VideoMetric]) -> u8 {
    if videos.is_empty() {
        return 0;
    }
    let shorts = videos
        .iter()
        .filter(|v| v.duration_seconds <= SHORTS_MAX_DURATION_SECS)
        .count();
    ((shorts as f64 / videos.len() as f64) * 100.0).round() as u8
}

/// Blend of cadence (half weight) and inverse view variance (half weight),
/// 0-100. A zero average treats the variance denominator as 1 so the term
/// stays defined.
fn consistency_score(uploads_per_week: f64, views: &[f64], avg_views: f64) -> u8 {
    let cadence = clamp(uploads_per_week / CONSISTENCY_CADENCE_TARGET_PER_WEEK, 0.0, 1.0);

    let denom = if avg_views > 0.0 { avg_views } else { 1.0 };
    let dispersion = clamp(std_deviation(views) / denom / CONSISTENCY_VARIANCE_NORM, 0.0, 1.0);

    ((cadence * 0.5 + (1.0 - dispersion) * 0.5) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn video_on(day: u32, views: u64, likes: u64, duration_seconds: u32) -> VideoMetric {
        VideoMetric {
            id: format!("v-{}-{}", day, views),
            published_at: Utc.with_ymd_and_hms(2026, 1, day, 12, 0, 0).unwrap(),
            views,
            likes,
            duration_seconds,
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 31, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_uploads_per_week_requires_two_videos() {
        assert_eq!(uploads_per_week(&[]), 0.0);
        assert_eq!(uploads_per_week(&[video_on(1, 100, 1, 30)]), 0.0);
    }

    #[test]
    fn test_uploads_per_week_over_known_span() {
        // 5 videos across a 28-day span -> 5 / 4 weeks = 1.3 (1 decimal).
        let videos: Vec<_> = [1, 8, 15, 22, 29]
            .iter()
            .map(|d| video_on(*d, 100, 1, 30))
            .collect();
        assert_eq!(uploads_per_week(&videos), 1.3);
    }

    #[test]
    fn test_uploads_per_week_same_day_floors_to_one_day() {
        let videos = vec![video_on(5, 100, 1, 30), video_on(5, 200, 1, 30)];
        // Span floors to 1 day -> 1/7 week -> 2 / (1/7) = 14 per week.
        assert_eq!(uploads_per_week(&videos), 14.0);
    }

    #[test]
    fn test_views_per_month_age_adjusts() {
        // One video, 10 days old, 1000 views -> 100/day -> 3000/month.
        let videos = vec![video_on(21, 1000, 10, 30)];
        assert_eq!(views_per_month(&videos, fixed_now()), 3000.0);
    }

    #[test]
    fn test_views_per_month_empty_is_zero() {
        assert_eq!(views_per_month(&[], fixed_now()), 0.0);
    }

    #[test]
    fn test_shorts_share_counts_sixty_second_cap() {
        let videos = vec![
            video_on(1, 100, 1, 45),
            video_on(2, 100, 1, 60),
            video_on(3, 100, 1, 61),
            video_on(4, 100, 1, 300),
        ];
        assert_eq!(shorts_share(&videos), 50);
    }

    #[test]
    fn test_shorts_share_empty_is_zero() {
        assert_eq!(shorts_share(&[]), 0);
    }

    #[test]
    fn test_consistency_score_bounds() {
        assert_eq!(consistency_score(0.0, &[], 0.0), 50);
        // High cadence, zero variance -> perfect score.
        assert_eq!(consistency_score(4.0, &[100.0, 100.0, 100.0], 100.0), 100);
    }

    #[test]
    fn test_consistency_score_penalizes_variance() {
        let steady = consistency_score(2.0, &[100.0, 110.0, 90.0], 100.0);
        let spiky = consistency_score(2.0, &[10.0, 500.0, 5.0], 171.7);
        assert!(steady > spiky);
    }

    #[test]
    fn test_analyze_channel_assembles_report() {
        let profile = ChannelProfile {
            id: "UCabc123DEF456ghi789jkl0".to_string(),
            title: "Test Channel".to_string(),
            handle: Some("@testchannel".to_string()),
            url: "https://www.youtube.com/@testchannel".to_string(),
            subscriber_count: 1000,
            view_count: 500_000,
            video_count: 42,
            uploads_playlist_id: "UUabc123DEF456ghi789jkl0".to_string(),
        };
        let videos = vec![
            video_on(1, 1000, 12, 45),
            video_on(8, 2000, 24, 55),
            video_on(15, 3000, 36, 65),
        ];

        let report = analyze_channel(profile, videos, fixed_now());

        assert_eq!(report.sample_size, 3);
        assert_eq!(report.metrics.avg_views, 2000.0);
        assert_eq!(report.metrics.median_views, 2000.0);
        assert_eq!(report.metrics.engagement_per_1k, 12.0);
        // 3 videos across 14 days -> 3 / 2 weeks = 1.5.
        assert_eq!(report.metrics.uploads_per_week, 1.5);
        assert_eq!(report.metrics.shorts_share, 67);
        assert!(report.metrics.consistency_score <= 100);
        assert_eq!(report.videos.len(), 3);
    }
}
