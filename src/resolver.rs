// Identity resolver - handles to DIDs via XRPC, DIDs to PDS endpoints via DID documents

use crate::constants;
use crate::error::{BrowseError, Result};
use log::debug;
use regex::Regex;
use serde::Deserialize;
use std::time::Duration;

/// Resolves AT Protocol identities: handle → DID and DID → PDS endpoint
pub struct IdentityResolver {
    client: reqwest::Client,
    handle_resolver_url: String,
    plc_url: String,
}

impl IdentityResolver {
    pub fn new() -> Result<Self> {
        Self::with_urls(
            constants::DEFAULT_HANDLE_RESOLVER_URL,
            constants::DEFAULT_PLC_DIRECTORY_URL,
        )
    }

    pub fn with_urls(
        handle_resolver_url: impl Into<String>,
        plc_url: impl Into<String>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(constants::HTTP_RESOLVER_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            handle_resolver_url: handle_resolver_url.into().trim_end_matches('/').to_string(),
            plc_url: plc_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Resolve a handle to a DID using com.atproto.identity.resolveHandle
    pub async fn resolve_handle(&self, handle: &str) -> Result<String> {
        validate_handle_format(handle)?;

        let endpoint = format!(
            "{}/xrpc/com.atproto.identity.resolveHandle",
            self.handle_resolver_url
        );
        let response = self
            .client
            .get(&endpoint)
            .query(&[("handle", handle)])
            .header("User-Agent", constants::user_agent())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BrowseError::api(
                format!("HTTP{}", status.as_u16()),
                format!("resolver returned {}: {}", status, body),
            ));
        }

        #[derive(Deserialize)]
        struct ResolveResponse {
            did: String,
        }

        let result: ResolveResponse = response.json().await?;
        if !result.did.starts_with("did:plc:") && !result.did.starts_with("did:web:") {
            return Err(BrowseError::api(
                "InvalidResponse",
                format!("invalid DID format returned: {}", result.did),
            ));
        }

        debug!("resolved {} to {}", handle, result.did);
        Ok(result.did)
    }

    /// Resolve a DID to the PDS endpoint listed in its DID document
    pub async fn resolve_pds(&self, did: &str) -> Result<String> {
        let document = self.fetch_did_document(did).await?;
        document
            .service
            .iter()
            .find(|s| s.id.ends_with("#atproto_pds") || s.service_type == "AtprotoPersonalDataServer")
            .map(|s| s.service_endpoint.clone())
            .ok_or_else(|| {
                BrowseError::api(
                    "InvalidResponse",
                    format!("DID document for {} lists no PDS service", did),
                )
            })
    }

    async fn fetch_did_document(&self, did: &str) -> Result<DidDocument> {
        let url = if did.starts_with("did:plc:") {
            format!("{}/{}", self.plc_url, did)
        } else if let Some(host) = did.strip_prefix("did:web:") {
            format!("https://{}/.well-known/did.json", host)
        } else {
            return Err(BrowseError::parse(format!("unsupported DID method: {}", did)));
        };

        debug!("fetching DID document from {}", url);
        let response = self
            .client
            .get(&url)
            .header("User-Agent", constants::user_agent())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BrowseError::api(
                format!("HTTP{}", status.as_u16()),
                format!("DID document fetch failed for {}: {}", did, body),
            ));
        }

        let data = response.text().await?;
        sonic_rs::from_str(&data)
            .map_err(|e| BrowseError::api("InvalidResponse", format!("malformed DID document: {}", e)))
    }
}

#[derive(Debug, Deserialize)]
struct DidDocument {
    #[serde(default)]
    service: Vec<DidService>,
}

#[derive(Debug, Deserialize)]
struct DidService {
    #[serde(default)]
    id: String,
    #[serde(rename = "type", default)]
    service_type: String,
    #[serde(rename = "serviceEndpoint", default)]
    service_endpoint: String,
}

/// Validate AT Protocol handle format
pub fn validate_handle_format(handle: &str) -> Result<()> {
    if handle.is_empty() {
        return Err(BrowseError::parse("handle cannot be empty"));
    }

    if handle.starts_with("did:") {
        return Err(BrowseError::parse("input is already a DID, not a handle"));
    }

    if handle.len() > 253 {
        return Err(BrowseError::parse("handle too long (max 253 chars)"));
    }

    if !handle.contains('.') {
        return Err(BrowseError::parse(
            "handle must be a domain (e.g. user.bsky.social)",
        ));
    }

    // Simplified pattern matching the AT Protocol handle spec
    let valid_pattern = Regex::new(
        r"^([a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?\.)+[a-zA-Z]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?$",
    )
    .expect("Invalid regex pattern");

    if !valid_pattern.is_match(handle) {
        return Err(BrowseError::parse("invalid handle format"));
    }

    Ok(())
}

/// Check if a string looks like a handle (not a DID)
pub fn is_handle(input: &str) -> bool {
    !input.starts_with("did:")
}

/// Normalize a repository identifier (removes at:// and @ prefixes)
pub fn normalize_identifier(input: &str) -> String {
    input
        .trim()
        .trim_start_matches("at://")
        .trim_start_matches('@')
        .trim_end_matches('/')
        .to_string()
}
