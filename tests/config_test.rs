use nichepulse::config::*;

#[test]
fn test_default_port() {
    assert_eq!(DEFAULT_PORT, 8787);
}

#[test]
fn test_score_weights_sum_to_one() {
    let total = WEIGHT_DEMAND
        + WEIGHT_SUPPLY
        + WEIGHT_BREAKOUT
        + WEIGHT_AUDIENCE
        + WEIGHT_PRODUCTION
        + WEIGHT_STICKINESS;
    assert!(
        (total - 1.0).abs() < 1e-9,
        "weights must sum to exactly 1.0, got {}",
        total
    );
}

#[test]
fn test_verdict_tiers_descend_to_zero() {
    let mut previous = u16::from(u8::MAX) + 1;
    for (min, label, description) in VERDICT_TIERS {
        assert!(u16::from(*min) < previous, "tiers must strictly descend");
        assert!(!label.is_empty());
        assert!(!description.is_empty());
        previous = u16::from(*min);
    }
    // Every score must land in some tier.
    assert_eq!(VERDICT_TIERS.last().unwrap().0, 0);
}

#[test]
fn test_action_library_covers_the_report() {
    assert!(ACTION_LIBRARY.len() >= ACTION_LIST_LIMIT);
    for action in ACTION_LIBRARY {
        assert!(!action.is_empty());
    }
}

#[test]
fn test_risk_fallback_pair() {
    // The padding guarantee (2-3 risks per report) relies on exactly a pair.
    assert_eq!(RISK_FALLBACKS.len(), 2);
}

#[test]
fn test_anonymous_limit_is_one() {
    assert_eq!(ANON_ANALYSIS_LIMIT, 1);
}

#[test]
fn test_cache_ttl_is_24_hours() {
    assert_eq!(REPORT_CACHE_TTL_SECS, 86_400);
}

#[test]
fn test_config_from_args_prefers_explicit_key() {
    let args = CliArgs {
        port: 9000,
        data_dir: Some(std::path::PathBuf::from("/tmp/np-test")),
        api_key: Some("explicit".to_string()),
    };
    let config = AppConfig::from_args(args);
    assert_eq!(config.port, 9000);
    assert_eq!(config.api_key.as_deref(), Some("explicit"));
    assert_eq!(
        config.cache_db_path(),
        std::path::PathBuf::from("/tmp/np-test/cache.db")
    );
    assert_eq!(
        config.usage_db_path(),
        std::path::PathBuf::from("/tmp/np-test/usage.db")
    );
}

#[test]
fn test_blank_api_key_is_treated_as_absent() {
    let args = CliArgs {
        port: DEFAULT_PORT,
        data_dir: Some(std::path::PathBuf::from("/tmp/np-test")),
        api_key: Some("   ".to_string()),
    };
    let config = AppConfig::from_args(args);
    assert!(config.api_key.is_none());
}
