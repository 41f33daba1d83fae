use clap::Parser;
use std::path::PathBuf;

/// NichePulse — confidence scoring for Shorts niches and channels.
#[derive(Parser, Debug, Clone)]
#[command(name = "nichepulse")]
pub struct CliArgs {
    /// HTTP port to listen on
    #[arg(long = "port", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Directory for the cache and usage databases
    #[arg(long = "data-dir")]
    pub data_dir: Option<PathBuf>,

    /// YouTube Data API key (falls back to the YOUTUBE_API_KEY env var)
    #[arg(long = "api-key")]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub data_dir: PathBuf,
    pub api_key: Option<String>,
}

// Server constants
pub const DEFAULT_PORT: u16 = 8787;
pub const HTTP_TIMEOUT_SECS: u64 = 10;

// Cache constants
pub const REPORT_CACHE_TTL_SECS: i64 = 86_400; // 24 hours
pub const SLUG_MAX_LEN: usize = 80;

// Anonymous quota constants
pub const ANON_ANALYSIS_LIMIT: u32 = 1;

// Fetch window constants
pub const SEARCH_WINDOW_DAYS: i64 = 30;
pub const SEARCH_PAGE_SIZE: u32 = 50;
pub const CHANNEL_RECENT_UPLOADS: usize = 30;
pub const TOPIC_MAX_LEN: usize = 120;

// Niche scoring constants. The weights sum to exactly 1.0; the composite
// score is meaningless if they drift.
pub const WEIGHT_DEMAND: f64 = 0.25;
pub const WEIGHT_SUPPLY: f64 = 0.20;
pub const WEIGHT_BREAKOUT: f64 = 0.20;
pub const WEIGHT_AUDIENCE: f64 = 0.15;
pub const WEIGHT_PRODUCTION: f64 = 0.10;
pub const WEIGHT_STICKINESS: f64 = 0.10;

pub const WEEKS_PER_SEARCH_WINDOW: f64 = 4.3;
pub const SUPPLY_SATURATION_PER_WEEK: f64 = 80.0;
pub const DEMAND_SCORE_OFFSET: f64 = 30.0;
pub const DEMAND_SCORE_RANGE: f64 = 100.0;
pub const BREAKOUT_SCORE_RANGE: f64 = 4.0;
pub const STICKINESS_SCORE_NORM: f64 = 3.0;
pub const AUDIENCE_HIGH_CUTOFF: f64 = 0.66;
pub const AUDIENCE_MEDIUM_CUTOFF: f64 = 0.33;
pub const STICKINESS_BASELINE: f64 = 12.0;
pub const STICKINESS_FLOOR: f64 = 0.6;
pub const STICKINESS_CEIL: f64 = 3.5;
pub const AUDIENCE_DURATION_NORM_SECS: f64 = 600.0;
pub const AUDIENCE_ENGAGEMENT_NORM: f64 = 25.0;
pub const PRODUCTION_FAVORABLE_MAX_SECS: f64 = 90.0;
pub const PRODUCTION_MODERATE_MAX_SECS: f64 = 480.0;

// Channel scoring constants
pub const SHORTS_MAX_DURATION_SECS: u32 = 60;
pub const CONSISTENCY_CADENCE_TARGET_PER_WEEK: f64 = 4.0;
pub const CONSISTENCY_VARIANCE_NORM: f64 = 1.5;

// Risk/verdict presentation constants
pub const RISK_LIST_LIMIT: usize = 3;
pub const ACTION_LIST_LIMIT: usize = 4;

// Verdict tiers: (minimum score, label, description). Evaluated top-down.
pub const VERDICT_TIERS: &[(u8, &str, &str)] = &[
    (
        75,
        "High Potential",
        "Strong demand signals with room for a new creator to break in.",
    ),
    (
        60,
        "Promising",
        "Healthy fundamentals; validate with a short test batch before committing.",
    ),
    (
        45,
        "Needs Validation",
        "Mixed signals; run small experiments before investing heavily.",
    ),
    (
        0,
        "High Risk",
        "Weak or saturated demand; expect slow traction without a distinct angle.",
    ),
];

// Padding used when fewer than two metric-driven risks fire, so the report
// always carries at least two entries.
pub const RISK_FALLBACKS: &[&str] = &[
    "Competition can shift quickly; re-run the analysis before scaling output.",
    "Small sample windows can overstate trends; treat early numbers as directional.",
];

// Static action library. The report returns the first ACTION_LIST_LIMIT
// entries regardless of metrics.
pub const ACTION_LIBRARY: &[&str] = &[
    "Publish a 3-video test batch in this niche before committing to a cadence.",
    "Study the top 3 outlier videos and note their hooks, pacing, and thumbnails.",
    "Keep runtimes under 60 seconds to qualify for Shorts feed distribution.",
    "Front-load the payoff in the first 2 seconds to protect retention.",
    "Standardize a repeatable format so production cost drops with each video.",
    "Review analytics after 14 days and double down on the best-performing angle.",
];

impl AppConfig {
    pub fn from_args(args: CliArgs) -> Self {
        let data_dir = args.data_dir.unwrap_or_else(default_data_dir);
        let api_key = args
            .api_key
            .or_else(|| std::env::var("YOUTUBE_API_KEY").ok())
            .filter(|k| !k.trim().is_empty());

        AppConfig {
            port: args.port,
            data_dir,
            api_key,
        }
    }

    /// Path to the report cache database.
    pub fn cache_db_path(&self) -> PathBuf {
        self.data_dir.join("cache.db")
    }

    /// Path to the anonymous usage database.
    pub fn usage_db_path(&self) -> PathBuf {
        self.data_dir.join("usage.db")
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("nichepulse")
}
