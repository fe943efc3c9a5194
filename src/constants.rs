//! Limits, allow-lists, activity thresholds, and service defaults shared across the crate
// Constants for version and binary identification

/// Binary name used in user agents
pub const BINARY_NAME: &str = "atbrowse";

/// Package version from Cargo.toml (set at compile time)
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the user agent string for HTTP requests
pub fn user_agent() -> String {
    format!("{}/{}", BINARY_NAME, VERSION)
}

// ============================================================================
// Batch Limits
// ============================================================================

/// Maximum records per com.atproto.repo.listRecords page
pub const LIST_PAGE_LIMIT: usize = 100;

/// Maximum actors per app.bsky.actor.getProfiles call
pub const PROFILE_BATCH_SIZE: usize = 25;

/// Maximum write operations per com.atproto.repo.applyWrites call
pub const APPLY_WRITES_BATCH_SIZE: usize = 200;

// ============================================================================
// Timeout and Retry Constants
// ============================================================================

/// Default HTTP request timeout (seconds)
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// HTTP request timeout for identity resolution (seconds)
pub const HTTP_RESOLVER_TIMEOUT_SECS: u64 = 10;

/// Maximum attempts for idempotent query calls; procedures are never retried
pub const MAX_QUERY_ATTEMPTS: usize = 3;

// ============================================================================
// Enrichment Constants
// ============================================================================

/// Collections whose records carry an actor subject eligible for profile
/// enrichment when the viewer owns the repository
pub const SUBJECT_COLLECTIONS: [&str; 2] = ["app.bsky.graph.follow", "app.bsky.graph.listitem"];

/// Inactivity threshold for the "7d-deactive" note (milliseconds)
pub const SEVEN_DAYS_MS: i64 = 7 * 24 * 60 * 60_000;

/// Inactivity threshold for the "30d-deactive" note (milliseconds)
pub const THIRTY_DAYS_MS: i64 = 30 * 24 * 60 * 60_000;

/// Labeler consulted for profile labels unless the session overrides it
pub const DEFAULT_LABELER_DID: &str = "did:web:cgv.hukoubook.com";

// ============================================================================
// Network Constants
// ============================================================================

/// Default PLC directory URL for DID document lookups
pub const DEFAULT_PLC_DIRECTORY_URL: &str = "https://plc.directory";

/// Default handle resolver URL for AT Protocol handle resolution
pub const DEFAULT_HANDLE_RESOLVER_URL: &str = "https://quickdid.smokesignal.tools";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent() {
        let ua = user_agent();
        assert!(ua.starts_with("atbrowse/"));
    }

    #[test]
    fn test_constants_values() {
        assert_eq!(LIST_PAGE_LIMIT, 100);
        assert_eq!(PROFILE_BATCH_SIZE, 25);
        assert_eq!(APPLY_WRITES_BATCH_SIZE, 200);
        assert_eq!(SEVEN_DAYS_MS, 604_800_000);
        assert_eq!(THIRTY_DAYS_MS, 2_592_000_000);
        assert_eq!(DEFAULT_PLC_DIRECTORY_URL, "https://plc.directory");
        assert!(SUBJECT_COLLECTIONS.contains(&"app.bsky.graph.follow"));
        assert!(SUBJECT_COLLECTIONS.contains(&"app.bsky.graph.listitem"));
    }
}
