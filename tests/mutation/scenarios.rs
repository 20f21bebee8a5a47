//! End-to-end: edit offline, reconnect, converge on server-confirmed state.

use outbox::intent::IntentStore;
use outbox::mutation::SubmitOutcome;
use outbox::types::{Freshness, MutationStatus};

use super::support::{harness, preload, wait_until, MockRemote};

#[tokio::test]
async fn offline_edit_survives_to_reconnect_and_converges() {
    // Server normalizes comments to uppercase, so the optimistic value and
    // the confirmed value differ until reconciliation.
    let h = harness(
        MockRemote::new().with_record("7", "X", "").with_uppercase(),
        false,
    );
    preload(&h.cache, "7", "X", "");
    let _watch = h.controller.watch_online();

    // Edit while offline: accepted, visible, durable, parked.
    let outcome = h.controller.submit_edit("7", "hello").await.unwrap();
    assert_eq!(outcome, SubmitOutcome::Paused);
    assert_eq!(h.cache.record("7").unwrap().comment, "hello");
    assert_eq!(h.controller.status("7"), MutationStatus::PausedOffline);
    let stored = h.intents.get_all().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].proposed_comment, "hello");
    assert!(h.remote.update_calls().is_empty());

    // Reconnect: the watcher replays the parked intent.
    h.online.set_online(true);

    let intents = h.intents.clone();
    wait_until(move || intents.get_all().unwrap().is_empty()).await;
    let controller = h.controller.clone();
    wait_until(move || controller.status("7") == MutationStatus::Succeeded).await;

    // Converged on the server's normalized value, fresh again.
    assert_eq!(h.remote.stored_comment("7").unwrap(), "HELLO");
    let entry = h.cache.get("7").unwrap();
    assert_eq!(entry.record.comment, "HELLO");
    assert_eq!(entry.record.title, "X");
    assert_eq!(entry.freshness, Freshness::Fresh);
    assert!(h.controller.pending_intent("7").is_none());
}
