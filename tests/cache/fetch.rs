//! Fetcher tests: read-through caching, failure handling, cancellation.

use std::sync::Arc;
use std::time::Duration;

use outbox::cache::{Fetcher, RecordCache};
use outbox::remote::{RemoteError, RemoteStore};
use outbox::types::Freshness;

use super::support::{record, GatedRemote};

fn fetcher(remote: GatedRemote) -> (Fetcher, Arc<RecordCache>) {
    let cache = Arc::new(RecordCache::new());
    let remote = Arc::new(remote);
    (Fetcher::new(cache.clone(), remote), cache)
}

#[tokio::test]
async fn get_or_fetch_populates_and_then_serves_from_cache() {
    let remote = GatedRemote::new().with_record("1", "Guardians", "hi");
    let calls = {
        let cache = Arc::new(RecordCache::new());
        let remote = Arc::new(remote);
        let fetcher = Fetcher::new(cache.clone(), remote.clone());

        let entry = fetcher.get_or_fetch("1").await.unwrap();
        assert_eq!(entry.record.title, "Guardians");
        assert_eq!(entry.freshness, Freshness::Fresh);
        assert_eq!(cache.record("1").unwrap().comment, "hi");

        // Second read is a cache hit.
        fetcher.get_or_fetch("1").await.unwrap();
        remote.fetch_calls()
    };
    assert_eq!(calls, vec!["1".to_string()]);
}

#[tokio::test]
async fn get_or_fetch_serves_stale_entries_without_refetching() {
    let remote = Arc::new(GatedRemote::new().with_record("1", "Guardians", "server"));
    let cache = Arc::new(RecordCache::new());
    let fetcher = Fetcher::new(cache.clone(), remote.clone());
    cache.put(record("1", "Guardians", "local"), Freshness::Stale);

    let entry = fetcher.get_or_fetch("1").await.unwrap();

    assert_eq!(entry.record.comment, "local");
    assert_eq!(entry.freshness, Freshness::Stale);
    assert!(remote.fetch_calls().is_empty());
}

#[tokio::test]
async fn list_enumerates_summaries_without_comments() {
    let remote = GatedRemote::new()
        .with_record("1", "Guardians", "secret")
        .with_record("2", "Alien", "");

    let response = remote.list().await.unwrap();

    let mut summaries: Vec<(String, String)> = response
        .records
        .into_iter()
        .map(|s| (s.id, s.title))
        .collect();
    summaries.sort();
    assert_eq!(
        summaries,
        vec![
            ("1".to_string(), "Guardians".to_string()),
            ("2".to_string(), "Alien".to_string()),
        ]
    );
}

#[tokio::test]
async fn missing_record_is_removed_and_surfaces_as_rejection() {
    let (fetcher, cache) = fetcher(GatedRemote::new());
    cache.put(record("1", "Deleted", "x"), Freshness::Stale);

    let err = fetcher.refresh("1").await.unwrap_err();

    assert!(matches!(err, RemoteError::Rejected { status: 404, .. }));
    assert!(cache.get("1").is_none());
}

#[tokio::test]
async fn unreachable_refresh_keeps_the_value_but_marks_it_stale() {
    let remote = GatedRemote::new().with_record("1", "Guardians", "server");
    remote.fail_fetches_with(RemoteError::Unreachable("down".into()));
    let (fetcher, cache) = fetcher(remote);
    cache.put(record("1", "Guardians", "local"), Freshness::Fresh);

    let err = fetcher.refresh("1").await.unwrap_err();

    assert!(err.is_offline());
    let entry = cache.get("1").unwrap();
    assert_eq!(entry.record.comment, "local");
    assert_eq!(entry.freshness, Freshness::Stale);
}

#[tokio::test]
async fn refresh_marks_the_entry_fetching_while_in_flight() {
    let remote = Arc::new(GatedRemote::new().with_record("1", "Guardians", "server"));
    let cache = Arc::new(RecordCache::new());
    let fetcher = Arc::new(Fetcher::new(cache.clone(), remote.clone()));
    cache.put(record("1", "Guardians", "local"), Freshness::Stale);

    remote.hold_fetches();
    let task = {
        let fetcher = fetcher.clone();
        tokio::spawn(async move { fetcher.refresh("1").await })
    };
    while remote.fetch_calls().is_empty() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(cache.get("1").unwrap().freshness, Freshness::Fetching);

    remote.release_fetches();
    let refreshed = task.await.unwrap().unwrap().unwrap();
    assert_eq!(refreshed.comment, "server");
    assert_eq!(cache.get("1").unwrap().freshness, Freshness::Fresh);
}

#[tokio::test]
async fn cancel_drops_an_in_flight_result() {
    let remote = Arc::new(GatedRemote::new().with_record("1", "Guardians", "server"));
    let cache = Arc::new(RecordCache::new());
    let fetcher = Arc::new(Fetcher::new(cache.clone(), remote.clone()));
    cache.put(record("1", "Guardians", "old"), Freshness::Stale);

    remote.hold_fetches();
    let task = {
        let fetcher = fetcher.clone();
        tokio::spawn(async move { fetcher.refresh("1").await })
    };
    while remote.fetch_calls().is_empty() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    // An edit lands while the read is in flight: cancel the read and write
    // the optimistic value.
    fetcher.cancel("1");
    cache.put(record("1", "Guardians", "edited"), Freshness::Fresh);

    remote.release_fetches();
    let outcome = task.await.unwrap().unwrap();

    // The stale read resolved but wrote nothing.
    assert_eq!(outcome, None);
    let entry = cache.get("1").unwrap();
    assert_eq!(entry.record.comment, "edited");
    assert_eq!(entry.freshness, Freshness::Fresh);
}
