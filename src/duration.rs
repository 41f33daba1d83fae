use regex::Regex;
use std::sync::LazyLock;

static ISO8601_DURATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?$").unwrap());

/// Parse an ISO-8601 duration of the `PT#H#M#S` form into total seconds.
///
/// Malformed input yields 0 rather than an error: duration is a secondary
/// ranking signal and a bad value must not fail an analysis.
pub fn parse_duration(input: &str) -> u32 {
    let Some(caps) = ISO8601_DURATION.captures(input.trim()) else {
        return 0;
    };

    let part = |i: usize| {
        caps.get(i)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .unwrap_or(0)
    };

    part(1) * 3600 + part(2) * 60 + part(3)
}
