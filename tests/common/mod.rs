#![allow(dead_code)]

use axum::Router;
use axum::extract::{Json, RawQuery, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

/// Scriptable stand-in for a PDS (and AppView proxy): serves queued
/// listRecords pages, synthesizes getProfiles responses, and records every
/// applyWrites call.
#[derive(Default)]
pub struct MockPds {
    /// Queued listRecords responses, served front to back
    pub pages: Mutex<Vec<Value>>,
    /// Cursor parameter of each listRecords call, in call order
    pub list_cursors: Mutex<Vec<Option<String>>>,
    /// Actor count per getProfiles call
    pub profile_batches: Mutex<Vec<usize>>,
    /// Writes length per applyWrites call
    pub write_sizes: Mutex<Vec<usize>>,
    /// Authorization header per applyWrites call
    pub write_auth: Mutex<Vec<Option<String>>>,
    /// applyWrites call index from which every call fails
    pub fail_writes_from: Mutex<Option<usize>>,
    /// Subjects with no profile (deleted / taken down)
    pub missing: Mutex<HashSet<String>>,
    /// Subjects whose profile blocks the viewer
    pub blocked: Mutex<HashSet<String>>,
    /// Subjects the viewer has muted
    pub muted: Mutex<HashSet<String>>,
    /// Label values per subject
    pub labels: Mutex<HashMap<String, Vec<String>>>,
    /// DID returned by resolveHandle
    pub handle_did: Mutex<Option<String>>,
    /// DID document served for any /{did} lookup
    pub did_doc: Mutex<Option<Value>>,
}

pub async fn start_mock_pds(state: Arc<MockPds>) -> (String, JoinHandle<()>) {
    let app = Router::new()
        .route("/xrpc/com.atproto.repo.listRecords", get(list_records))
        .route("/xrpc/app.bsky.actor.getProfiles", get(get_profiles))
        .route("/xrpc/com.atproto.repo.applyWrites", post(apply_writes))
        .route("/xrpc/com.atproto.identity.resolveHandle", get(resolve_handle))
        .route("/{did}", get(did_document))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock listener");
    let addr = listener.local_addr().expect("mock listener addr");
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), handle)
}

async fn list_records(State(state): State<Arc<MockPds>>, RawQuery(query): RawQuery) -> Response {
    let params = query_params(query.as_deref().unwrap_or_default());
    let cursor = params
        .iter()
        .find(|(k, _)| k == "cursor")
        .map(|(_, v)| v.clone());
    state.list_cursors.lock().unwrap().push(cursor);

    let mut pages = state.pages.lock().unwrap();
    if pages.is_empty() {
        return xrpc_error(StatusCode::BAD_REQUEST, "InvalidRequest", "no more pages");
    }
    Json(pages.remove(0)).into_response()
}

async fn get_profiles(State(state): State<Arc<MockPds>>, RawQuery(query): RawQuery) -> Response {
    let params = query_params(query.as_deref().unwrap_or_default());
    let actors: Vec<String> = params
        .into_iter()
        .filter(|(k, _)| k == "actors")
        .map(|(_, v)| v)
        .collect();
    state.profile_batches.lock().unwrap().push(actors.len());

    let missing = state.missing.lock().unwrap();
    let blocked = state.blocked.lock().unwrap();
    let muted = state.muted.lock().unwrap();
    let labels = state.labels.lock().unwrap();
    let recent = (chrono::Utc::now() - chrono::Duration::hours(1)).to_rfc3339();

    let profiles: Vec<Value> = actors
        .iter()
        .filter(|did| !missing.contains(*did))
        .map(|did| {
            let label_values = labels.get(did).cloned().unwrap_or_default();
            json!({
                "did": did,
                "handle": format!("{}.test", did.trim_start_matches("did:plc:")),
                "createdAt": recent,
                "labels": label_values
                    .iter()
                    .map(|val| json!({"val": val, "cts": recent}))
                    .collect::<Vec<_>>(),
                "viewer": {
                    "blockedBy": blocked.contains(did),
                    "muted": muted.contains(did),
                },
            })
        })
        .collect();

    Json(json!({ "profiles": profiles })).into_response()
}

async fn apply_writes(
    State(state): State<Arc<MockPds>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let call_index = state.write_sizes.lock().unwrap().len();
    let writes = body["writes"].as_array().map(Vec::len).unwrap_or(0);
    state.write_sizes.lock().unwrap().push(writes);
    state.write_auth.lock().unwrap().push(
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    );

    if let Some(fail_from) = *state.fail_writes_from.lock().unwrap()
        && call_index >= fail_from
    {
        return xrpc_error(StatusCode::BAD_REQUEST, "InvalidRequest", "boom");
    }
    Json(json!({ "results": [] })).into_response()
}

async fn resolve_handle(State(state): State<Arc<MockPds>>) -> Response {
    match state.handle_did.lock().unwrap().clone() {
        Some(did) => Json(json!({ "did": did })).into_response(),
        None => xrpc_error(
            StatusCode::BAD_REQUEST,
            "InvalidRequest",
            "Unable to resolve handle",
        ),
    }
}

async fn did_document(State(state): State<Arc<MockPds>>) -> Response {
    match state.did_doc.lock().unwrap().clone() {
        Some(doc) => Json(doc).into_response(),
        None => xrpc_error(StatusCode::NOT_FOUND, "NotFound", "DID not registered"),
    }
}

fn xrpc_error(status: StatusCode, code: &str, message: &str) -> Response {
    (status, Json(json!({ "error": code, "message": message }))).into_response()
}

/// Decode enough of a query string for test assertions
fn query_params(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter_map(|kv| kv.split_once('='))
        .map(|(k, v)| {
            (
                k.to_string(),
                v.replace("%3A", ":").replace("%2F", "/").replace('+', " "),
            )
        })
        .collect()
}

// ============================================================================
// Fixture builders
// ============================================================================

pub const OWNER: &str = "did:plc:owner";

pub fn post_record(i: usize) -> Value {
    json!({
        "uri": format!("at://{}/app.bsky.feed.post/rkey-{:04}", OWNER, i),
        "cid": "bafyreib2rxk3rw6lbhxmbcrxlwmcjzj7quyf6eli2axv2v5k4tvkc6lq4q",
        "value": {"$type": "app.bsky.feed.post", "text": format!("post {}", i)},
    })
}

pub fn follow_record(i: usize) -> Value {
    json!({
        "uri": format!("at://{}/app.bsky.graph.follow/rkey-{:04}", OWNER, i),
        "cid": "bafyreib2rxk3rw6lbhxmbcrxlwmcjzj7quyf6eli2axv2v5k4tvkc6lq4q",
        "value": {
            "$type": "app.bsky.graph.follow",
            "subject": format!("did:plc:subject-{}", i),
            "createdAt": "2024-01-01T00:00:00Z",
        },
    })
}

pub fn page(records: Vec<Value>, cursor: Option<&str>) -> Value {
    json!({ "records": records, "cursor": cursor })
}

pub fn queue_pages(state: &MockPds, pages: Vec<Value>) {
    *state.pages.lock().unwrap() = pages;
}
