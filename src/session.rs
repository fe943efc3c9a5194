// src/session.rs
use crate::constants;
use crate::error::{BrowseError, Result};
use crate::records::{ApplyWritesInput, DeleteWrite, ListRecordsOutput, Profile, ProfilesOutput};
use crate::xrpc::XrpcClient;

/// Context for one browsing session: which repository is being read, who is
/// viewing it, and the clients the calls go through.
///
/// Passed explicitly into every fetch and mutation call; there is no ambient
/// agent anywhere in the crate.
#[derive(Clone)]
pub struct Session {
    /// Unauthenticated client against the repository's PDS, used for listing
    client: XrpcClient,
    /// Authenticated client for profile lookups and writes; present once a
    /// viewer is attached
    auth_client: Option<XrpcClient>,
    /// DID of the repository being browsed
    repo: String,
    /// DID of the authenticated viewer
    viewer: Option<String>,
    /// Labelers consulted for profile labels
    labelers: Vec<String>,
}

impl Session {
    pub fn new(pds_url: impl Into<String>, repo_did: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: XrpcClient::new(pds_url)?,
            auth_client: None,
            repo: repo_did.into(),
            viewer: None,
            labelers: vec![constants::DEFAULT_LABELER_DID.to_string()],
        })
    }

    /// Attach an authenticated viewer. The viewer's PDS proxies profile
    /// lookups and receives the write calls.
    pub fn with_viewer(
        mut self,
        viewer_did: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        self.auth_client = Some(self.client.clone().with_token(access_token));
        self.viewer = Some(viewer_did.into());
        self
    }

    pub fn set_labelers(&mut self, labelers: Vec<String>) {
        self.labelers = labelers;
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    pub fn viewer(&self) -> Option<&str> {
        self.viewer.as_deref()
    }

    /// Whether the viewer is browsing their own repository
    pub fn is_owner(&self) -> bool {
        self.viewer.as_deref() == Some(self.repo.as_str())
    }

    fn auth_client(&self) -> Result<&XrpcClient> {
        self.auth_client
            .as_ref()
            .ok_or_else(|| BrowseError::api("AuthMissing", "authentication required"))
    }

    // ------------------------------------------------------------------
    // Typed XRPC calls
    // ------------------------------------------------------------------

    /// com.atproto.repo.listRecords
    pub async fn list_records(
        &self,
        collection: &str,
        limit: usize,
        cursor: Option<&str>,
        reverse: bool,
    ) -> Result<ListRecordsOutput> {
        let mut params = vec![
            ("repo", self.repo.clone()),
            ("collection", collection.to_string()),
            ("limit", limit.to_string()),
            ("reverse", reverse.to_string()),
        ];
        if let Some(cursor) = cursor {
            params.push(("cursor", cursor.to_string()));
        }
        self.client
            .query("com.atproto.repo.listRecords", &params, &[])
            .await
    }

    /// app.bsky.actor.getProfiles for one batch of at most
    /// [`constants::PROFILE_BATCH_SIZE`] actors
    pub async fn get_profiles(&self, actors: &[String]) -> Result<Vec<Profile>> {
        debug_assert!(actors.len() <= constants::PROFILE_BATCH_SIZE);
        let params: Vec<(&str, String)> =
            actors.iter().map(|did| ("actors", did.clone())).collect();
        let headers = [("atproto-accept-labelers", self.labelers.join(","))];
        let output: ProfilesOutput = self
            .auth_client()?
            .query("app.bsky.actor.getProfiles", &params, &headers)
            .await?;
        Ok(output.profiles)
    }

    /// com.atproto.repo.applyWrites with one chunk of delete operations
    pub async fn apply_deletes(&self, writes: &[DeleteWrite]) -> Result<()> {
        debug_assert!(writes.len() <= constants::APPLY_WRITES_BATCH_SIZE);
        let client = self.auth_client()?;
        let repo = self
            .viewer
            .as_deref()
            .unwrap_or(self.repo.as_str());
        let input = ApplyWritesInput { repo, writes };
        client
            .procedure("com.atproto.repo.applyWrites", &input)
            .await
    }
}
