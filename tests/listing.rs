mod common;

use atbrowse::{BrowseError, ListerConfig, RecordLister, Session};
use common::{MockPds, OWNER, follow_record, page, post_record, queue_pages, start_mock_pds};
use std::sync::Arc;

fn lister(base_url: &str, collection: &str, config: ListerConfig) -> RecordLister {
    let session = Session::new(base_url, OWNER).unwrap();
    RecordLister::new(session, collection, config)
}

#[tokio::test]
async fn test_auto_continue_stops_when_cursor_clears() {
    let state = Arc::new(MockPds::default());
    queue_pages(
        &state,
        vec![
            page((0..100).map(post_record).collect(), Some("c1")),
            page((100..140).map(post_record).collect(), Some("c2")),
        ],
    );
    let (base_url, server) = start_mock_pds(state.clone()).await;

    let config = ListerConfig {
        auto_continue: true,
        ..Default::default()
    };
    let mut lister = lister(&base_url, "app.bsky.feed.post", config);
    let fetched = lister.fetch().await.unwrap();

    // The full page triggered one follow-up fetch; the short page stopped
    // the loop even though the server offered another cursor
    assert_eq!(fetched, 140);
    assert_eq!(lister.store().len(), 140);
    assert!(!lister.store().has_more());
    assert_eq!(
        *state.list_cursors.lock().unwrap(),
        vec![None, Some("c1".to_string())]
    );

    // Arrival order is preserved across pages
    let records = lister.store().records();
    assert_eq!(records[0].rkey, "rkey-0000");
    assert_eq!(records[99].rkey, "rkey-0099");
    assert_eq!(records[139].rkey, "rkey-0139");

    server.abort();
}

#[tokio::test]
async fn test_single_page_fetch_retains_cursor() {
    let state = Arc::new(MockPds::default());
    queue_pages(
        &state,
        vec![page((0..100).map(post_record).collect(), Some("c1"))],
    );
    let (base_url, server) = start_mock_pds(state.clone()).await;

    let mut lister = lister(&base_url, "app.bsky.feed.post", ListerConfig::default());
    let fetched = lister.fetch().await.unwrap();

    assert_eq!(fetched, 100);
    assert_eq!(lister.store().cursor(), Some("c1"));
    assert_eq!(state.list_cursors.lock().unwrap().len(), 1);

    server.abort();
}

#[tokio::test]
async fn test_short_page_clears_cursor() {
    let state = Arc::new(MockPds::default());
    queue_pages(
        &state,
        vec![page((0..40).map(post_record).collect(), Some("stale"))],
    );
    let (base_url, server) = start_mock_pds(state.clone()).await;

    let mut lister = lister(&base_url, "app.bsky.feed.post", ListerConfig::default());
    lister.fetch().await.unwrap();

    assert_eq!(lister.store().len(), 40);
    assert_eq!(lister.store().cursor(), None);

    server.abort();
}

#[tokio::test]
async fn test_api_error_is_surfaced_verbatim() {
    let state = Arc::new(MockPds::default());
    let (base_url, server) = start_mock_pds(state).await;

    let mut lister = lister(&base_url, "app.bsky.feed.post", ListerConfig::default());
    match lister.fetch().await {
        Err(BrowseError::Api { code, message }) => {
            assert_eq!(code, "InvalidRequest");
            assert_eq!(message, "no more pages");
        }
        other => panic!("expected Api error, got {:?}", other.map(|_| ())),
    }

    server.abort();
}

#[tokio::test]
async fn test_owner_follows_are_enriched_in_profile_batches() {
    let state = Arc::new(MockPds::default());
    queue_pages(
        &state,
        vec![page((0..30).map(follow_record).collect(), None)],
    );
    state
        .missing
        .lock()
        .unwrap()
        .insert("did:plc:subject-5".to_string());
    state
        .blocked
        .lock()
        .unwrap()
        .insert("did:plc:subject-7".to_string());
    state
        .muted
        .lock()
        .unwrap()
        .insert("did:plc:subject-9".to_string());
    state
        .labels
        .lock()
        .unwrap()
        .insert("did:plc:subject-3".to_string(), vec!["spam".to_string()]);
    let (base_url, server) = start_mock_pds(state.clone()).await;

    let session = Session::new(&base_url, OWNER)
        .unwrap()
        .with_viewer(OWNER, "test-token");
    let mut lister = RecordLister::new(session, "app.bsky.graph.follow", ListerConfig::default());
    lister.fetch().await.unwrap();

    // 30 subjects split into profile-lookup groups of at most 25
    assert_eq!(*state.profile_batches.lock().unwrap(), vec![25, 5]);

    let records = lister.store().records();
    assert_eq!(records[0].note.as_deref(), Some("active"));
    assert_eq!(records[3].note.as_deref(), Some("spam,active"));
    assert_eq!(records[5].note.as_deref(), Some("missing"));
    assert_eq!(records[7].note.as_deref(), Some("active,blocked"));
    assert_eq!(records[9].note.as_deref(), Some("active,muted"));

    // Notes participate in the filter predicate
    assert_eq!(lister.store().visible_indices("missing"), vec![5]);

    server.abort();
}

#[tokio::test]
async fn test_enrichment_skipped_for_other_viewers() {
    let state = Arc::new(MockPds::default());
    queue_pages(
        &state,
        vec![page((0..5).map(follow_record).collect(), None)],
    );
    let (base_url, server) = start_mock_pds(state.clone()).await;

    // Unauthenticated browse of the same collection: no profile calls
    let mut lister = lister(&base_url, "app.bsky.graph.follow", ListerConfig::default());
    lister.fetch().await.unwrap();

    assert!(state.profile_batches.lock().unwrap().is_empty());
    assert!(lister.store().records().iter().all(|r| r.note.is_none()));

    server.abort();
}

#[tokio::test]
async fn test_enrichment_skipped_for_non_subject_collections() {
    let state = Arc::new(MockPds::default());
    queue_pages(&state, vec![page((0..5).map(post_record).collect(), None)]);
    let (base_url, server) = start_mock_pds(state.clone()).await;

    let session = Session::new(&base_url, OWNER)
        .unwrap()
        .with_viewer(OWNER, "test-token");
    let mut lister = RecordLister::new(session, "app.bsky.feed.post", ListerConfig::default());
    lister.fetch().await.unwrap();

    assert!(state.profile_batches.lock().unwrap().is_empty());

    server.abort();
}

#[tokio::test]
async fn test_shutdown_signal_stops_auto_continue_between_pages() {
    let state = Arc::new(MockPds::default());
    queue_pages(
        &state,
        vec![
            page((0..100).map(post_record).collect(), Some("c1")),
            page((100..200).map(post_record).collect(), Some("c2")),
        ],
    );
    let (base_url, server) = start_mock_pds(state.clone()).await;

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(true);
    let config = ListerConfig {
        auto_continue: true,
        shutdown_rx: Some(shutdown_rx),
        ..Default::default()
    };
    let mut lister = lister(&base_url, "app.bsky.feed.post", config);
    let fetched = lister.fetch().await.unwrap();

    // The first page completes; the pending cursor is left for later
    assert_eq!(fetched, 100);
    assert!(lister.store().has_more());
    assert_eq!(state.list_cursors.lock().unwrap().len(), 1);

    drop(shutdown_tx);
    server.abort();
}
