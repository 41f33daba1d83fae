pub mod channel;
pub mod niche;

pub use channel::{analyze_channel, ChannelMetrics, ChannelReport};
pub use niche::{analyze_niche, AudienceValue, NicheMetrics, NicheReport, ProductionFit, Verdict};

use crate::stats::{average, median};
use crate::youtube::VideoMetric;

/// Aggregate view over one batch of videos. Everything downstream of this
/// struct is pure arithmetic, so the zero defaults for an empty batch are
/// what keep the engines NaN-free.
#[derive(Debug, Clone, Default)]
pub struct DerivedStats {
    pub avg_views: f64,
    pub median_views: f64,
    pub avg_duration_seconds: f64,
    pub likes_per_1k: f64,
    pub views: Vec<f64>,
}

pub fn derive_stats(videos: &[VideoMetric]) -> DerivedStats {
    let views: Vec<f64> = videos.iter().map(|v| v.views as f64).collect();
    let durations: Vec<f64> = videos.iter().map(|v| v.duration_seconds as f64).collect();
    // Per-video likes-to-views ratio scaled to per-1k, then averaged, so a
    // single viral outlier does not dominate the engagement signal.
    let ratios: Vec<f64> = videos
        .iter()
        .map(|v| {
            if v.views > 0 {
                v.likes as f64 / v.views as f64 * 1000.0
            } else {
                0.0
            }
        })
        .collect();

    DerivedStats {
        avg_views: average(&views),
        median_views: median(&views),
        avg_duration_seconds: average(&durations),
        likes_per_1k: average(&ratios),
        views,
    }
}
