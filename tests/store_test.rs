use serde::{Deserialize, Serialize};

use nichepulse::cache::{niche_key, ReportCache};
use nichepulse::usage::{hash_ip, UsageGate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct FakeReport {
    topic: String,
    score: u8,
}

fn temp_cache() -> (ReportCache, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let cache = ReportCache::open(&dir.path().join("cache.db")).unwrap();
    (cache, dir)
}

fn temp_gate() -> (UsageGate, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let gate = UsageGate::open(&dir.path().join("usage.db")).unwrap();
    (gate, dir)
}

// --- Cache ---

#[test]
fn test_cache_miss_on_unknown_key() {
    let (cache, _dir) = temp_cache();
    let value: Option<FakeReport> = cache.get("niche:unknown").unwrap();
    assert!(value.is_none());
}

#[test]
fn test_cache_round_trip() {
    let (cache, _dir) = temp_cache();
    let report = FakeReport {
        topic: "chess".to_string(),
        score: 68,
    };

    cache.set(&niche_key("chess"), &report, 3600).unwrap();
    let loaded: Option<FakeReport> = cache.get(&niche_key("chess")).unwrap();
    assert_eq!(loaded, Some(report));
}

#[test]
fn test_cache_overwrite_replaces_value() {
    let (cache, _dir) = temp_cache();
    let key = niche_key("chess");

    cache
        .set(&key, &FakeReport { topic: "chess".to_string(), score: 10 }, 3600)
        .unwrap();
    cache
        .set(&key, &FakeReport { topic: "chess".to_string(), score: 90 }, 3600)
        .unwrap();

    let loaded: Option<FakeReport> = cache.get(&key).unwrap();
    assert_eq!(loaded.unwrap().score, 90);
}

#[test]
fn test_cache_expired_entry_is_a_miss() {
    let (cache, _dir) = temp_cache();
    let key = niche_key("stale");

    cache
        .set(&key, &FakeReport { topic: "stale".to_string(), score: 50 }, -1)
        .unwrap();

    let loaded: Option<FakeReport> = cache.get(&key).unwrap();
    assert!(loaded.is_none());
}

#[test]
fn test_cache_key_normalization_shares_entries() {
    let (cache, _dir) = temp_cache();
    cache
        .set(&niche_key("Retro Gaming"), &FakeReport { topic: "retro".to_string(), score: 70 }, 3600)
        .unwrap();

    let loaded: Option<FakeReport> = cache.get(&niche_key("  retro   gaming ")).unwrap();
    assert!(loaded.is_some());
}

#[test]
fn test_cache_type_mismatch_surfaces_as_error() {
    let (cache, _dir) = temp_cache();
    cache.set("niche:odd", &vec![1, 2, 3], 3600).unwrap();

    let result: anyhow::Result<Option<FakeReport>> = cache.get("niche:odd");
    assert!(result.is_err());
}

// --- Usage gate ---

#[test]
fn test_fresh_client_is_allowed() {
    let (gate, _dir) = temp_gate();
    let check = gate.check("203.0.113.50").unwrap();
    assert!(check.allowed);
    assert_eq!(check.analyses_used, 0);
    assert_eq!(check.ip_hash, hash_ip("203.0.113.50"));
}

#[test]
fn test_recorded_client_hits_the_limit() {
    let (gate, _dir) = temp_gate();

    let check = gate.check("203.0.113.51").unwrap();
    gate.record(&check.ip_hash, check.analyses_used + 1).unwrap();

    let second = gate.check("203.0.113.51").unwrap();
    assert!(!second.allowed);
    assert_eq!(second.analyses_used, 1);
}

#[test]
fn test_usage_is_isolated_per_hash() {
    let (gate, _dir) = temp_gate();

    let first = gate.check("203.0.113.52").unwrap();
    gate.record(&first.ip_hash, 1).unwrap();

    let other = gate.check("203.0.113.53").unwrap();
    assert!(other.allowed);
    assert_eq!(other.analyses_used, 0);
}

#[test]
fn test_record_is_an_upsert() {
    let (gate, _dir) = temp_gate();
    let hash = hash_ip("203.0.113.54");

    gate.record(&hash, 1).unwrap();
    gate.record(&hash, 2).unwrap();

    let check = gate.check("203.0.113.54").unwrap();
    assert_eq!(check.analyses_used, 2);
}

#[test]
fn test_gate_state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("usage.db");

    {
        let gate = UsageGate::open(&path).unwrap();
        let check = gate.check("203.0.113.55").unwrap();
        gate.record(&check.ip_hash, 1).unwrap();
    }

    let gate = UsageGate::open(&path).unwrap();
    let check = gate.check("203.0.113.55").unwrap();
    assert!(!check.allowed);
}
