use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{derive_stats, DerivedStats};
use crate::config::{
    ACTION_LIBRARY, ACTION_LIST_LIMIT, AUDIENCE_DURATION_NORM_SECS, AUDIENCE_ENGAGEMENT_NORM,
    AUDIENCE_HIGH_CUTOFF, AUDIENCE_MEDIUM_CUTOFF, BREAKOUT_SCORE_RANGE, DEMAND_SCORE_OFFSET,
    DEMAND_SCORE_RANGE, PRODUCTION_FAVORABLE_MAX_SECS, PRODUCTION_MODERATE_MAX_SECS,
    RISK_FALLBACKS, RISK_LIST_LIMIT, STICKINESS_BASELINE, STICKINESS_CEIL, STICKINESS_FLOOR,
    STICKINESS_SCORE_NORM, SUPPLY_SATURATION_PER_WEEK, VERDICT_TIERS, WEEKS_PER_SEARCH_WINDOW,
    WEIGHT_AUDIENCE, WEIGHT_BREAKOUT, WEIGHT_DEMAND, WEIGHT_PRODUCTION, WEIGHT_STICKINESS,
    WEIGHT_SUPPLY,
};
use crate::stats::{average, clamp, compute_growth, round1};
use crate::youtube::MetricWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudienceValue {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductionFit {
    Favorable,
    Moderate,
    Challenging,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NicheMetrics {
    pub demand_growth: i64,
    pub uploads_per_week: u64,
    pub breakout_velocity: f64,
    pub audience_value: AudienceValue,
    pub production_fit: ProductionFit,
    pub stickiness: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub label: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NicheReport {
    pub topic: String,
    pub updated_at: String,
    pub sample_size: usize,
    pub score: u8,
    pub verdict: Verdict,
    pub metrics: NicheMetrics,
    pub risks: Vec<String>,
    pub actions: Vec<String>,
}

struct RiskRule {
    message: &'static str,
    applies: fn(&NicheMetrics) -> bool,
}

// Ordered by rule position, not severity; the report takes the first
// RISK_LIST_LIMIT matches.
const RISK_RULES: &[RiskRule] = &[
    RiskRule {
        message: "Upload volume is very high; new videos get buried in a crowded feed.",
        applies: |m| m.uploads_per_week >= 60,
    },
    RiskRule {
        message: "Demand is flat; average views are barely growing period over period.",
        applies: |m| m.demand_growth < 5,
    },
    RiskRule {
        message: "Performance is hit-driven; a few outliers take most of the views while typical videos stall.",
        applies: |m| m.breakout_velocity >= 4.0,
    },
    RiskRule {
        message: "Low audience value; watch time and engagement both sit below baseline.",
        applies: |m| m.audience_value == AudienceValue::Low,
    },
    RiskRule {
        message: "Long average runtimes; matching this niche's format takes heavy production.",
        applies: |m| m.production_fit == ProductionFit::Challenging,
    },
];

/// Score a niche from its two fetch windows. The caller is responsible for
/// rejecting an empty recent window first; an empty previous window is
/// fine (its stats default to zero, so demand growth resolves through the
/// sentinel policy).
pub fn analyze_niche(
    topic: &str,
    recent: &MetricWindow,
    previous: &MetricWindow,
    now: DateTime<Utc>,
) -> NicheReport {
    let recent_stats = derive_stats(&recent.videos);
    let previous_stats = derive_stats(&previous.videos);

    let metrics = compute_metrics(recent, &recent_stats, &previous_stats);
    let score = composite_score(&metrics);

    NicheReport {
        topic: topic.to_string(),
        updated_at: now.to_rfc3339(),
        sample_size: recent.videos.len(),
        score,
        verdict: verdict_for(score),
        risks: collect_risks(&metrics),
        actions: ACTION_LIBRARY
            .iter()
            .take(ACTION_LIST_LIMIT)
            .map(|s| s.to_string())
            .collect(),
        metrics,
    }
}

fn compute_metrics(
    recent: &MetricWindow,
    recent_stats: &DerivedStats,
    previous_stats: &DerivedStats,
) -> NicheMetrics {
    NicheMetrics {
        demand_growth: compute_growth(recent_stats.avg_views, previous_stats.avg_views),
        uploads_per_week: uploads_per_week(recent.total_results),
        breakout_velocity: breakout_velocity(recent_stats),
        audience_value: audience_value(recent_stats),
        production_fit: production_fit(recent_stats),
        stickiness: round1(clamp(
            recent_stats.likes_per_1k / STICKINESS_BASELINE,
            STICKINESS_FLOOR,
            STICKINESS_CEIL,
        )),
    }
}

/// Cadence proxy: total search matches over the 30-day window expressed in
/// weeks. totalResults counts matching videos, not niche-creator uploads;
/// the verdict thresholds are tuned against this exact approximation.
fn uploads_per_week(total_results: u64) -> u64 {
    ((total_results as f64 / WEEKS_PER_SEARCH_WINDOW).round() as u64).max(1)
}

/// Ratio of the top-3 mean to the window median. 1.0 means evenly
/// distributed performance; defaults to 1.0 when the window is empty or
/// the median is non-positive.
fn breakout_velocity(stats: &DerivedStats) -> f64 {
    if stats.views.is_empty() || stats.median_views <= 0.0 {
        return 1.0;
    }
    let mut sorted = stats.views.clone();
    sorted.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    let top = &sorted[..sorted.len().min(3)];
    round1(average(top) / stats.median_views)
}

fn audience_value(stats: &DerivedStats) -> AudienceValue {
    let duration_signal = clamp(
        stats.avg_duration_seconds / AUDIENCE_DURATION_NORM_SECS,
        0.0,
        1.0,
    );
    let engagement_signal = clamp(stats.likes_per_1k / AUDIENCE_ENGAGEMENT_NORM, 0.0, 1.0);
    let blended = (duration_signal + engagement_signal) / 2.0;

    if blended >= AUDIENCE_HIGH_CUTOFF {
        AudienceValue::High
    } else if blended >= AUDIENCE_MEDIUM_CUTOFF {
        AudienceValue::Medium
    } else {
        AudienceValue::Low
    }
}

fn production_fit(stats: &DerivedStats) -> ProductionFit {
    if stats.avg_duration_seconds <= PRODUCTION_FAVORABLE_MAX_SECS {
        ProductionFit::Favorable
    } else if stats.avg_duration_seconds <= PRODUCTION_MODERATE_MAX_SECS {
        ProductionFit::Moderate
    } else {
        ProductionFit::Challenging
    }
}

/// Weighted sum of six normalized sub-scores, each clamped to [0, 1]
/// before weighting. The weights sum to exactly 1.0, which is what bounds
/// the result to 0..=100.
pub fn composite_score(metrics: &NicheMetrics) -> u8 {
    let demand = clamp(
        (metrics.demand_growth as f64 + DEMAND_SCORE_OFFSET) / DEMAND_SCORE_RANGE,
        0.0,
        1.0,
    );
    // More uploads per week means more competition, so supply scores
    // inversely.
    let supply = clamp(
        1.0 - metrics.uploads_per_week as f64 / SUPPLY_SATURATION_PER_WEEK,
        0.0,
        1.0,
    );
    let breakout = clamp(
        (metrics.breakout_velocity - 1.0) / BREAKOUT_SCORE_RANGE,
        0.0,
        1.0,
    );
    let audience = match metrics.audience_value {
        AudienceValue::High => 1.0,
        AudienceValue::Medium => 0.6,
        AudienceValue::Low => 0.3,
    };
    let production = match metrics.production_fit {
        ProductionFit::Favorable => 1.0,
        ProductionFit::Moderate => 0.6,
        ProductionFit::Challenging => 0.3,
    };
    let stickiness = clamp(metrics.stickiness / STICKINESS_SCORE_NORM, 0.0, 1.0);

    let weighted = demand * WEIGHT_DEMAND
        + supply * WEIGHT_SUPPLY
        + breakout * WEIGHT_BREAKOUT
        + audience * WEIGHT_AUDIENCE
        + production * WEIGHT_PRODUCTION
        + stickiness * WEIGHT_STICKINESS;

    (weighted * 100.0).round() as u8
}

pub fn verdict_for(score: u8) -> Verdict {
    let tier = VERDICT_TIERS
        .iter()
        .find(|tier| score >= tier.0)
        .unwrap_or(&VERDICT_TIERS[VERDICT_TIERS.len() - 1]);

    Verdict {
        label: tier.1.to_string(),
        description: tier.2.to_string(),
    }
}

/// Evaluate the risk rules in order. With fewer than two matches the fixed
/// fallback pair pads the list, so the report always carries 2-3 entries.
pub fn collect_risks(metrics: &NicheMetrics) -> Vec<String> {
    let mut risks: Vec<String> = RISK_RULES
        .iter()
        .filter(|rule| (rule.applies)(metrics))
        .map(|rule| rule.message.to_string())
        .collect();

    if risks.len() < 2 {
        risks.extend(RISK_FALLBACKS.iter().map(|s| s.to_string()));
    }
    risks.truncate(RISK_LIST_LIMIT);
    risks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_metrics() -> NicheMetrics {
        NicheMetrics {
            demand_growth: 20,
            uploads_per_week: 10,
            breakout_velocity: 2.0,
            audience_value: AudienceValue::Medium,
            production_fit: ProductionFit::Favorable,
            stickiness: 1.2,
        }
    }

    #[test]
    fn test_verdict_boundaries() {
        assert_eq!(verdict_for(75).label, "High Potential");
        assert_eq!(verdict_for(74).label, "Promising");
        assert_eq!(verdict_for(60).label, "Promising");
        assert_eq!(verdict_for(59).label, "Needs Validation");
        assert_eq!(verdict_for(45).label, "Needs Validation");
        assert_eq!(verdict_for(44).label, "High Risk");
        assert_eq!(verdict_for(0).label, "High Risk");
        assert_eq!(verdict_for(100).label, "High Potential");
    }

    #[test]
    fn test_verdicts_carry_descriptions() {
        for score in [0u8, 45, 60, 75] {
            assert!(!verdict_for(score).description.is_empty());
        }
    }

    #[test]
    fn test_score_is_bounded_at_extremes() {
        let mut best = base_metrics();
        best.demand_growth = 1_000;
        best.uploads_per_week = 1;
        best.breakout_velocity = 100.0;
        best.audience_value = AudienceValue::High;
        best.production_fit = ProductionFit::Favorable;
        best.stickiness = 3.5;
        assert!(composite_score(&best) <= 100);

        let mut worst = base_metrics();
        worst.demand_growth = -1_000;
        worst.uploads_per_week = 10_000;
        worst.breakout_velocity = 1.0;
        worst.audience_value = AudienceValue::Low;
        worst.production_fit = ProductionFit::Challenging;
        worst.stickiness = 0.6;
        let score = composite_score(&worst);
        // Categorical floors keep even the worst case above zero.
        assert!(score <= 100);
    }

    #[test]
    fn test_score_is_deterministic() {
        let metrics = base_metrics();
        let first = composite_score(&metrics);
        for _ in 0..10 {
            assert_eq!(composite_score(&metrics), first);
        }
    }

    #[test]
    fn test_risks_padded_when_no_rule_fires() {
        let risks = collect_risks(&base_metrics());
        assert_eq!(risks.len(), 2);
        assert_eq!(risks[0], RISK_FALLBACKS[0]);
    }

    #[test]
    fn test_risks_padded_to_three_on_single_match() {
        let mut metrics = base_metrics();
        metrics.demand_growth = 0;
        let risks = collect_risks(&metrics);
        assert_eq!(risks.len(), 3);
        assert!(risks[0].contains("Demand is flat"));
        assert_eq!(risks[1], RISK_FALLBACKS[0]);
    }

    #[test]
    fn test_risks_capped_at_three_in_rule_order() {
        let metrics = NicheMetrics {
            demand_growth: -10,
            uploads_per_week: 90,
            breakout_velocity: 6.0,
            audience_value: AudienceValue::Low,
            production_fit: ProductionFit::Challenging,
            stickiness: 0.6,
        };
        let risks = collect_risks(&metrics);
        assert_eq!(risks.len(), 3);
        assert!(risks[0].contains("Upload volume"));
        assert!(risks[1].contains("Demand is flat"));
        assert!(risks[2].contains("hit-driven"));
    }

    #[test]
    fn test_risk_length_invariant_over_grid() {
        // 2 <= len <= 3 must hold for any combination of rule outcomes.
        for growth in [-50i64, 50] {
            for uploads in [1u64, 90] {
                for velocity in [1.0, 6.0] {
                    for audience in [AudienceValue::Low, AudienceValue::High] {
                        for fit in [ProductionFit::Favorable, ProductionFit::Challenging] {
                            let metrics = NicheMetrics {
                                demand_growth: growth,
                                uploads_per_week: uploads,
                                breakout_velocity: velocity,
                                audience_value: audience,
                                production_fit: fit,
                                stickiness: 1.0,
                            };
                            let len = collect_risks(&metrics).len();
                            assert!((2..=3).contains(&len), "got {} risks", len);
                        }
                    }
                }
            }
        }
    }
}
