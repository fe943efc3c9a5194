// Error types shared by the listing, enrichment, and mutation paths
use thiserror::Error;

/// Error type for remote calls and locally-entered data.
///
/// `Api` carries the XRPC error payload verbatim so callers can surface the
/// server's own wording. `Parse` covers malformed user input (identifiers,
/// handles) and is recovered close to where it occurs.
#[derive(Debug, Error)]
pub enum BrowseError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{code}: {message}")]
    Api { code: String, message: String },

    #[error("parse error: {0}")]
    Parse(String),
}

impl BrowseError {
    pub fn api(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// True for transport failures worth retrying on idempotent calls
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

pub type Result<T> = std::result::Result<T, BrowseError>;
