//! Name Resolution Cache Tests
//!
//! Verifies bulk-list amortization against a counting fake provider:
//!
//! - **One bulk call per (region, kind)**: repeated lookups on a warm cache
//!   trigger no further provider calls
//! - **Fallback chain**: empty input, foreign-format input, and unknown
//!   identifiers all resolve without a wasted provider call
//! - **Failure semantics**: a failed bulk fetch is not cached and the next
//!   lookup retries
//! - **Multi-keyed KMS entries** and **entry-at-a-time global lookups**

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use awsinv::inventory::{NameKind, NameResolutionCache, NameSource, NOT_AVAILABLE};
use pretty_assertions::assert_eq;

// ============================================================================
// Counting Fake Provider
// ============================================================================

#[derive(Default)]
struct CountingSource {
    names: HashMap<String, String>,
    bulk_calls: Mutex<Vec<(String, NameKind)>>,
    global_calls: AtomicUsize,
    fail_bulk: AtomicBool,
}

impl CountingSource {
    fn with_names(names: &[(&str, &str)]) -> Self {
        Self {
            names: names
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Self::default()
        }
    }

    fn bulk_call_count(&self) -> usize {
        self.bulk_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl NameSource for CountingSource {
    async fn list_names(&self, region: &str, kind: NameKind) -> Result<HashMap<String, String>> {
        if self.fail_bulk.load(Ordering::SeqCst) {
            return Err(anyhow!("simulated bulk list failure"));
        }
        self.bulk_calls
            .lock()
            .unwrap()
            .push((region.to_string(), kind));
        Ok(self.names.clone())
    }

    async fn lookup_global(&self, kind: &str, id: &str) -> Result<String> {
        self.global_calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{}-name-of-{}", kind, id))
    }
}

// ============================================================================
// Bulk-List Amortization
// ============================================================================

#[tokio::test]
async fn test_one_bulk_call_serves_all_lookups_for_a_key() {
    let source = Arc::new(CountingSource::with_names(&[
        ("vpc-aaa", "core"),
        ("vpc-bbb", "edge"),
    ]));
    let cache = NameResolutionCache::new(source.clone());

    assert_eq!(cache.resolve("us-east-1", NameKind::Vpc, Some("vpc-aaa")).await, "core");
    assert_eq!(cache.resolve("us-east-1", NameKind::Vpc, Some("vpc-bbb")).await, "edge");
    assert_eq!(source.bulk_call_count(), 1);

    // Warm cache: third lookup costs nothing.
    assert_eq!(cache.resolve("us-east-1", NameKind::Vpc, Some("vpc-aaa")).await, "core");
    assert_eq!(source.bulk_call_count(), 1);
}

#[tokio::test]
async fn test_distinct_regions_and_kinds_fetch_separately() {
    let source = Arc::new(CountingSource::with_names(&[("vpc-aaa", "core")]));
    let cache = NameResolutionCache::new(source.clone());

    cache.resolve("us-east-1", NameKind::Vpc, Some("vpc-aaa")).await;
    cache.resolve("eu-west-1", NameKind::Vpc, Some("vpc-aaa")).await;
    cache.resolve("us-east-1", NameKind::Subnet, Some("subnet-ccc")).await;

    let calls = source.bulk_calls.lock().unwrap().clone();
    assert_eq!(
        calls,
        vec![
            ("us-east-1".to_string(), NameKind::Vpc),
            ("eu-west-1".to_string(), NameKind::Vpc),
            ("us-east-1".to_string(), NameKind::Subnet),
        ]
    );
}

#[tokio::test]
async fn test_concurrent_misses_coalesce_into_one_fetch() {
    let source = Arc::new(CountingSource::with_names(&[("vpc-aaa", "core")]));
    let cache = Arc::new(NameResolutionCache::new(source.clone()));

    let lookups: Vec<_> = (0..8)
        .map(|_| {
            let cache = cache.clone();
            tokio::spawn(async move { cache.resolve("us-east-1", NameKind::Vpc, Some("vpc-aaa")).await })
        })
        .collect();
    for lookup in lookups {
        assert_eq!(lookup.await.unwrap(), "core");
    }

    assert_eq!(source.bulk_call_count(), 1);
}

// ============================================================================
// Fallback Chain
// ============================================================================

#[tokio::test]
async fn test_empty_identifier_resolves_to_sentinel_without_calls() {
    let source = Arc::new(CountingSource::default());
    let cache = NameResolutionCache::new(source.clone());

    assert_eq!(cache.resolve("us-east-1", NameKind::Vpc, None).await, NOT_AVAILABLE);
    assert_eq!(cache.resolve("us-east-1", NameKind::Vpc, Some("")).await, NOT_AVAILABLE);
    assert_eq!(source.bulk_call_count(), 0);
}

#[tokio::test]
async fn test_foreign_format_identifier_passes_through_without_calls() {
    let source = Arc::new(CountingSource::default());
    let cache = NameResolutionCache::new(source.clone());

    assert_eq!(
        cache.resolve("us-east-1", NameKind::Vpc, Some("already-a-name")).await,
        "already-a-name"
    );
    assert_eq!(source.bulk_call_count(), 0);
}

#[tokio::test]
async fn test_unknown_identifier_resolves_to_itself() {
    let source = Arc::new(CountingSource::with_names(&[("vpc-aaa", "core")]));
    let cache = NameResolutionCache::new(source.clone());

    assert_eq!(
        cache.resolve("us-east-1", NameKind::Vpc, Some("vpc-zzz")).await,
        "vpc-zzz"
    );
    assert_eq!(source.bulk_call_count(), 1);
}

#[tokio::test]
async fn test_failed_bulk_fetch_is_not_cached_and_retries() {
    let source = Arc::new(CountingSource::with_names(&[("vpc-aaa", "core")]));
    source.fail_bulk.store(true, Ordering::SeqCst);
    let cache = NameResolutionCache::new(source.clone());

    // Failure falls back to the raw identifier.
    assert_eq!(
        cache.resolve("us-east-1", NameKind::Vpc, Some("vpc-aaa")).await,
        "vpc-aaa"
    );
    assert_eq!(source.bulk_call_count(), 0);

    // Provider recovers; the next lookup retries the bulk fetch.
    source.fail_bulk.store(false, Ordering::SeqCst);
    assert_eq!(
        cache.resolve("us-east-1", NameKind::Vpc, Some("vpc-aaa")).await,
        "core"
    );
    assert_eq!(source.bulk_call_count(), 1);
}

// ============================================================================
// KMS Multi-Key Entries
// ============================================================================

#[tokio::test]
async fn test_kms_key_resolves_from_any_representation() {
    let key_id = "1234abcd-12ab-34cd-56ef-1234567890ab";
    let key_arn = "arn:aws:kms:us-east-1:123456789012:key/1234abcd-12ab-34cd-56ef-1234567890ab";
    let source = Arc::new(CountingSource::with_names(&[
        (key_id, "alias/data"),
        (key_arn, "alias/data"),
        ("alias/data", "alias/data"),
    ]));
    let cache = NameResolutionCache::new(source.clone());

    assert_eq!(cache.resolve("us-east-1", NameKind::KmsKey, Some(key_id)).await, "alias/data");
    assert_eq!(cache.resolve("us-east-1", NameKind::KmsKey, Some(key_arn)).await, "alias/data");
    assert_eq!(
        cache.resolve("us-east-1", NameKind::KmsKey, Some("alias/data")).await,
        "alias/data"
    );
    assert_eq!(source.bulk_call_count(), 1);
}

// ============================================================================
// Globally-Scoped Lookups
// ============================================================================

#[tokio::test]
async fn test_global_lookup_caches_one_entry_at_a_time() {
    let source = Arc::new(CountingSource::default());
    let cache = NameResolutionCache::new(source.clone());

    assert_eq!(
        cache.resolve_global("iam-role", "deploy").await,
        "iam-role-name-of-deploy"
    );
    assert_eq!(cache.resolve_global("iam-role", "deploy").await, "iam-role-name-of-deploy");
    assert_eq!(source.global_calls.load(Ordering::SeqCst), 1);

    // A different identifier of the same kind is its own entry.
    cache.resolve_global("iam-role", "admin").await;
    assert_eq!(source.global_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_global_lookup_empty_identifier_is_sentinel() {
    let source = Arc::new(CountingSource::default());
    let cache = NameResolutionCache::new(source.clone());

    assert_eq!(cache.resolve_global("iam-role", "").await, NOT_AVAILABLE);
    assert_eq!(source.global_calls.load(Ordering::SeqCst), 0);
}
