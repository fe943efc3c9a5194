// src/records.rs
use crate::tid;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A fetched record plus its per-view annotation state.
///
/// The serialized value is cached at ingest so the substring filter and the
/// preview never re-serialize on every pass over the store.
#[derive(Debug, Clone)]
pub struct RecordEntry {
    /// Collection-local record key
    pub rkey: String,
    /// Full at:// URI identifying repository, collection, and key
    pub uri: String,
    pub cid: Option<String>,
    /// Opaque record document
    pub value: Value,
    /// Millisecond creation time decoded from the rkey when it is a TID
    pub timestamp: Option<i64>,
    /// Marked for batch deletion; selection operations own this flag
    pub marked: bool,
    /// Comma-joined enrichment notes, set once per fetched page
    pub note: Option<String>,
    raw_value: String,
}

impl RecordEntry {
    pub fn from_listed(listed: ListedRecord) -> Self {
        let rkey = listed
            .uri
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        let raw_value = sonic_rs::to_string(&listed.value).unwrap_or_default();
        Self {
            timestamp: tid::timestamp_ms(&rkey),
            rkey,
            uri: listed.uri,
            cid: listed.cid,
            value: listed.value,
            marked: false,
            note: None,
            raw_value,
        }
    }

    /// Actor identifier the record references (follow / list item records)
    pub fn subject(&self) -> Option<&str> {
        self.value.get("subject").and_then(Value::as_str)
    }

    /// Serialized record value as received
    pub fn raw_value(&self) -> &str {
        &self.raw_value
    }

    /// Text the filter predicate runs over: serialized value plus note
    pub fn search_text(&self) -> String {
        match &self.note {
            Some(note) => format!("{} {}", self.raw_value, note),
            None => self.raw_value.clone(),
        }
    }

    /// Substring filter; an empty filter matches everything
    pub fn matches(&self, filter: &str) -> bool {
        filter.is_empty() || self.search_text().contains(filter)
    }
}

// ============================================================================
// XRPC Wire Types
// ============================================================================

/// One entry of a com.atproto.repo.listRecords response
#[derive(Debug, Clone, Deserialize)]
pub struct ListedRecord {
    pub uri: String,
    #[serde(default)]
    pub cid: Option<String>,
    pub value: Value,
}

#[derive(Debug, Deserialize)]
pub struct ListRecordsOutput {
    pub records: Vec<ListedRecord>,
    #[serde(default)]
    pub cursor: Option<String>,
}

/// Moderation label attached to a profile by a labeling service
#[derive(Debug, Clone, Deserialize)]
pub struct Label {
    pub val: String,
    /// Label application time, RFC 3339
    pub cts: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerState {
    #[serde(default)]
    pub blocked_by: bool,
    #[serde(default)]
    pub muted: bool,
}

/// Subset of an app.bsky.actor.getProfiles profile view used for enrichment
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub did: String,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub viewer: ViewerState,
}

#[derive(Debug, Deserialize)]
pub struct ProfilesOutput {
    pub profiles: Vec<Profile>,
}

/// com.atproto.repo.applyWrites delete operation
#[derive(Debug, Clone, Serialize)]
pub struct DeleteWrite {
    #[serde(rename = "$type")]
    pub write_type: &'static str,
    pub collection: String,
    pub rkey: String,
}

impl DeleteWrite {
    pub fn new(collection: impl Into<String>, rkey: impl Into<String>) -> Self {
        Self {
            write_type: "com.atproto.repo.applyWrites#delete",
            collection: collection.into(),
            rkey: rkey.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApplyWritesInput<'a> {
    pub repo: &'a str,
    pub writes: &'a [DeleteWrite],
}
