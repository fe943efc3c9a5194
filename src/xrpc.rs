// XRPC client - HTTP client for AT Protocol query and procedure calls
use crate::constants;
use crate::error::{BrowseError, Result};
use log::{debug, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// Async XRPC client bound to one service base URL.
///
/// Queries (HTTP GET) are retried on transport failures and 429s; procedures
/// (HTTP POST) are submitted exactly once since they mutate server state.
#[derive(Clone)]
pub struct XrpcClient {
    client: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
    last_retry_after: Arc<tokio::sync::Mutex<Option<Duration>>>,
}

impl XrpcClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(constants::HTTP_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: None,
            last_retry_after: Arc::new(tokio::sync::Mutex::new(None)),
        })
    }

    /// Attach a bearer token to every subsequent call
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// Execute an XRPC query with retry on transport errors and rate limits
    pub async fn query<T: DeserializeOwned>(
        &self,
        nsid: &str,
        params: &[(&str, String)],
        headers: &[(&str, String)],
    ) -> Result<T> {
        let mut backoff = Duration::from_secs(1);
        let mut last_err = None;

        for attempt in 1..=constants::MAX_QUERY_ATTEMPTS {
            *self.last_retry_after.lock().await = None;

            match self.do_query(nsid, params, headers).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    // Rate limited: honor Retry-After and try again
                    let retry_after = self.last_retry_after.lock().await.take();
                    if let Some(retry_after) = retry_after {
                        if attempt < constants::MAX_QUERY_ATTEMPTS {
                            warn!(
                                "{} rate limited, waiting {:?} before retry {}/{}",
                                nsid,
                                retry_after,
                                attempt,
                                constants::MAX_QUERY_ATTEMPTS
                            );
                            last_err = Some(e);
                            tokio::time::sleep(retry_after).await;
                            continue;
                        }
                        return Err(e);
                    }

                    if !e.is_network() {
                        return Err(e);
                    }

                    if attempt < constants::MAX_QUERY_ATTEMPTS {
                        warn!(
                            "{} failed (attempt {}/{}): {}, retrying in {:?}",
                            nsid,
                            attempt,
                            constants::MAX_QUERY_ATTEMPTS,
                            e,
                            backoff
                        );
                        last_err = Some(e);
                        tokio::time::sleep(backoff).await;
                        backoff *= 2;
                    } else {
                        last_err = Some(e);
                    }
                }
            }
        }

        Err(last_err.expect("retry loop exits with an error"))
    }

    async fn do_query<T: DeserializeOwned>(
        &self,
        nsid: &str,
        params: &[(&str, String)],
        headers: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}/xrpc/{}", self.base_url, nsid);
        let mut request = self
            .client
            .get(&url)
            .query(params)
            .header("User-Agent", constants::user_agent());
        for (name, value) in headers {
            request = request.header(*name, value.as_str());
        }
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let response = self.check_status(response).await?;

        let body = response.text().await?;
        debug!("{}: {} byte response", nsid, body.len());
        sonic_rs::from_str(&body)
            .map_err(|e| BrowseError::api("InvalidResponse", format!("malformed body: {}", e)))
    }

    /// Execute an XRPC procedure. Never retried.
    pub async fn procedure<I: Serialize>(&self, nsid: &str, input: &I) -> Result<()> {
        let url = format!("{}/xrpc/{}", self.base_url, nsid);
        let mut request = self
            .client
            .post(&url)
            .header("User-Agent", constants::user_agent())
            .json(input);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        self.check_status(response).await?;
        Ok(())
    }

    /// Map a non-success response to an `Api` error carrying the server's
    /// error payload verbatim
    async fn check_status(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            *self.last_retry_after.lock().await = Some(parse_retry_after(&response));
        }

        let body = response.text().await.unwrap_or_default();
        Err(match sonic_rs::from_str::<ErrorBody>(&body) {
            Ok(err) => BrowseError::Api {
                code: err.error,
                message: err.message.unwrap_or_default(),
            },
            Err(_) => BrowseError::api(format!("HTTP{}", status.as_u16()), body),
        })
    }
}

/// XRPC error payload shape
#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    message: Option<String>,
}

/// Parse the Retry-After header from a response.
/// Returns the duration to wait before retrying, capped at 60 seconds.
fn parse_retry_after(response: &reqwest::Response) -> Duration {
    const MAX_RETRY_SECONDS: u64 = 60;

    if let Some(header) = response.headers().get("retry-after")
        && let Ok(value) = header.to_str()
    {
        // Seconds (integer) is the common format
        if let Ok(seconds) = value.parse::<u64>() {
            return Duration::from_secs(seconds.min(MAX_RETRY_SECONDS));
        }

        // HTTP date (RFC 7231)
        if let Ok(http_time) = httpdate::parse_http_date(value)
            && let Ok(duration) = http_time.duration_since(std::time::SystemTime::now())
        {
            return duration.min(Duration::from_secs(MAX_RETRY_SECONDS));
        }
    }

    Duration::from_secs(MAX_RETRY_SECONDS)
}
