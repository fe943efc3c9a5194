use anyhow::{Context, Result};
use atbrowse::Session;
use atbrowse::resolver::{self, IdentityResolver};

/// Environment variable consulted when --token is not passed
pub const TOKEN_ENV: &str = "ATBROWSE_TOKEN";

pub fn token_or_env(token: Option<String>) -> Option<String> {
    token.or_else(|| std::env::var(TOKEN_ENV).ok())
}

/// Resolve a repository identifier (handle or DID) to its DID and PDS
pub async fn resolve_repo(identifier: &str) -> Result<(String, String)> {
    let resolver = IdentityResolver::new().context("failed to build identity resolver")?;
    let identifier = resolver::normalize_identifier(identifier);

    let did = if resolver::is_handle(&identifier) {
        resolver
            .resolve_handle(&identifier)
            .await
            .with_context(|| format!("failed to resolve handle {}", identifier))?
    } else {
        identifier.clone()
    };

    let pds = resolver
        .resolve_pds(&did)
        .await
        .with_context(|| format!("failed to resolve PDS for {}", did))?;

    Ok((did, pds))
}

/// Build a session against a repository's PDS. A token attaches the repo
/// owner as the viewer, enabling enrichment and writes.
pub async fn create_session(identifier: &str, token: Option<&str>) -> Result<Session> {
    let (did, pds) = resolve_repo(identifier).await?;
    let session = Session::new(&pds, &did).context("failed to build session")?;
    Ok(match token {
        Some(token) => session.with_viewer(&did, token),
        None => session,
    })
}
