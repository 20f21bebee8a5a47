//! RecordCache tests: entry lifecycle and change notifications.

use std::sync::Arc;

use parking_lot::Mutex;

use outbox::cache::RecordCache;
use outbox::reactive::CacheEvent;
use outbox::types::{Freshness, Record};

use super::support::record;

fn collect_events(cache: &RecordCache) -> Arc<Mutex<Vec<CacheEvent>>> {
    let seen: Arc<Mutex<Vec<CacheEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    cache.subscribe(move |event| sink.lock().push(event.clone()));
    seen
}

#[test]
fn put_then_get_round_trips() {
    let cache = RecordCache::new();
    assert!(cache.is_empty());

    cache.put(record("1", "Guardians", "hi"), Freshness::Fresh);

    let entry = cache.get("1").unwrap();
    assert_eq!(entry.record.comment, "hi");
    assert_eq!(entry.freshness, Freshness::Fresh);
    assert_eq!(cache.record("1").unwrap().title, "Guardians");
    assert_eq!(cache.len(), 1);
    assert!(cache.get("2").is_none());
}

#[test]
fn put_overwrites_existing_entry() {
    let cache = RecordCache::new();
    cache.put(record("1", "Guardians", "old"), Freshness::Fresh);
    cache.put(record("1", "Guardians", "new"), Freshness::Stale);

    assert_eq!(cache.len(), 1);
    let entry = cache.get("1").unwrap();
    assert_eq!(entry.record.comment, "new");
    assert_eq!(entry.freshness, Freshness::Stale);
}

#[test]
fn invalidate_marks_stale_without_touching_the_value() {
    let cache = RecordCache::new();
    cache.put(record("1", "Guardians", "hi"), Freshness::Fresh);

    assert!(cache.invalidate("1"));

    let entry = cache.get("1").unwrap();
    assert_eq!(entry.freshness, Freshness::Stale);
    assert_eq!(entry.record.comment, "hi");

    assert!(!cache.invalidate("missing"));
}

#[test]
fn remove_drops_the_entry() {
    let cache = RecordCache::new();
    cache.put(record("1", "Guardians", "hi"), Freshness::Fresh);

    assert!(cache.remove("1"));
    assert!(cache.get("1").is_none());
    assert!(!cache.remove("1"));
}

#[test]
fn subscribers_see_updates_invalidations_and_removals() {
    let cache = RecordCache::new();
    let seen = collect_events(&cache);

    cache.put(record("1", "Guardians", "hi"), Freshness::Fresh);
    cache.invalidate("1");
    cache.remove("1");
    // Misses emit nothing.
    cache.invalidate("1");
    cache.remove("1");

    assert_eq!(
        *seen.lock(),
        vec![
            CacheEvent::Updated { id: "1".into() },
            CacheEvent::Invalidated { id: "1".into() },
            CacheEvent::Removed { id: "1".into() },
        ]
    );
}

#[test]
fn unsubscribed_callback_is_not_called() {
    let cache = RecordCache::new();
    let seen: Arc<Mutex<Vec<CacheEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let id = cache.subscribe(move |event| sink.lock().push(event.clone()));

    cache.put(record("1", "Guardians", "a"), Freshness::Fresh);
    cache.unsubscribe(id);
    cache.put(record("1", "Guardians", "b"), Freshness::Fresh);

    assert_eq!(seen.lock().len(), 1);
}
