/// Source Fetcher
///
/// HTTP retrieval against unreliable upstreams. Rate-limit (429) and 5xx
/// responses are retried with exponential backoff; every other failure is
/// permanent and surfaces immediately so the caller can skip that page or
/// term without burning the latency budget.
use reqwest::Client;
use resilience::{with_retry, RetryConfig, RetryError};
use serde_json::Value;
use thiserror::Error;

/// Browser-like agent; the forum upstream rejects default client agents.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124 Safari/537.36";

/// Fixed non-JSON garbage the trends endpoints prefix their bodies with.
const XSSI_PREFIX: &str = ")]}',";

/// How much of an error body to keep in the error message.
const SNIPPET_LEN: usize = 200;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status}: {snippet}")]
    Status { status: u16, snippet: String },

    #[error("retries exhausted after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: Box<FetchError> },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("unexpected upstream format: {0}")]
    BadUpstreamFormat(String),
}

impl FetchError {
    /// Only rate limiting and server-side flapping are worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Status { status, .. } if *status == 429 || *status >= 500)
    }
}

/// A fetched response body, shaped by content-type sniffing.
#[derive(Debug, Clone)]
pub enum FetchedBody {
    Json(Value),
    Text(String),
}

impl FetchedBody {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FetchedBody::Text(t) => Some(t),
            FetchedBody::Json(_) => None,
        }
    }
}

#[derive(Clone)]
pub struct SourceFetcher {
    client: Client,
    retry: RetryConfig,
}

impl SourceFetcher {
    pub fn new(client: Client, retry: RetryConfig) -> Self {
        Self { client, retry }
    }

    /// Fetch a URL with retry/backoff. `headers` are extra request headers
    /// on top of the default User-Agent (e.g. the forum's age-gate cookie).
    pub async fn fetch_with_retry(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<FetchedBody, FetchError> {
        let client = self.client.clone();
        let url = url.to_string();
        let headers = headers.to_vec();

        with_retry(&self.retry, FetchError::is_retryable, move || {
            let client = client.clone();
            let url = url.clone();
            let headers = headers.clone();
            async move { fetch_once(&client, &url, &headers).await }
        })
        .await
        .map_err(|e| match e {
            RetryError::Exhausted { attempts, last } => FetchError::RetriesExhausted {
                attempts,
                last: Box::new(last),
            },
            RetryError::Aborted(e) => e,
        })
    }
}

async fn fetch_once(
    client: &Client,
    url: &str,
    headers: &[(String, String)],
) -> Result<FetchedBody, FetchError> {
    let mut request = client.get(url).header("user-agent", USER_AGENT);
    for (name, value) in headers {
        request = request.header(name.as_str(), value.as_str());
    }

    let response = request
        .send()
        .await
        .map_err(|e| FetchError::Transport(e.to_string()))?;

    let status = response.status();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_lowercase();

    let text = response
        .text()
        .await
        .map_err(|e| FetchError::Transport(e.to_string()))?;

    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
            snippet: truncate_snippet(&text),
        });
    }

    if content_type.contains("application/json") || content_type.contains("application/ld+json") {
        // Malformed JSON under a JSON content type falls back to text,
        // matching the tolerant listing-page path; strict parsing is the
        // trends client's job via parse_prefixed_json.
        match serde_json::from_str(&text) {
            Ok(value) => Ok(FetchedBody::Json(value)),
            Err(_) => Ok(FetchedBody::Text(text)),
        }
    } else {
        Ok(FetchedBody::Text(text))
    }
}

fn truncate_snippet(body: &str) -> String {
    body.chars().take(SNIPPET_LEN).collect()
}

/// Strip the trends endpoints' anti-XSSI prefix, if present.
pub fn strip_xssi_prefix(body: &str) -> &str {
    body.trim_start()
        .strip_prefix(XSSI_PREFIX)
        .map(|rest| rest.trim_start())
        .unwrap_or_else(|| body.trim_start())
}

/// Parse a trends response body that may carry the XSSI prefix.
///
/// An HTML body (upstream error page) or a still-unparseable body is a
/// `BadUpstreamFormat`, distinguishable from transport/status failures.
pub fn parse_prefixed_json(body: &str) -> Result<Value, FetchError> {
    let stripped = strip_xssi_prefix(body);

    if stripped.starts_with('<') {
        return Err(FetchError::BadUpstreamFormat(
            "HTML response where JSON was expected".to_string(),
        ));
    }

    serde_json::from_str(stripped)
        .map_err(|e| FetchError::BadUpstreamFormat(format!("unparseable JSON body: {}", e)))
}
