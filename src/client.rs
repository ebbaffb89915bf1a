//! Client for the Claude OAuth usage endpoint.

use crate::error::{LimitsError, Result};
use crate::models::Usage;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Default API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Environment variable overriding the base URL
pub const BASE_URL_ENV: &str = "CLAUDE_API_BASE_URL";

const USAGE_PATH: &str = "/api/oauth/usage";

/// Beta header required for OAuth API
const ANTHROPIC_BETA_HEADER: &str = "anthropic-beta";
const ANTHROPIC_BETA_VALUE: &str = "oauth-2025-04-20";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// Retry configuration
const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF: Duration = Duration::from_millis(500);
const MAX_BACKOFF: Duration = Duration::from_secs(5);

/// User agent in the same shape Claude Code sends
fn user_agent() -> String {
    format!(
        "claude-code/{} ({}; {}) Rust",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// 429 and every 5xx may succeed on a later attempt.
pub fn is_retriable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Exponential backoff before retry number `attempt + 1`, capped at 5s.
pub fn backoff_duration(initial: Duration, attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt);
    initial.saturating_mul(factor).min(MAX_BACKOFF)
}

#[derive(Clone)]
pub struct UsageClient {
    access_token: String,
    base_url: String,
    http: reqwest::Client,
    initial_backoff: Duration,
}

impl UsageClient {
    /// Creates a client for `access_token`. The base URL comes from
    /// `CLAUDE_API_BASE_URL` when set, otherwise the public endpoint.
    pub fn new(access_token: impl Into<String>) -> Result<Self> {
        let base_url = std::env::var(BASE_URL_ENV)
            .ok()
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            access_token: access_token.into(),
            base_url,
            http,
            initial_backoff: INITIAL_BACKOFF,
        })
    }

    /// Overrides the base URL, including one set through the environment.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn with_initial_backoff(mut self, initial: Duration) -> Self {
        self.initial_backoff = initial;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches current usage, retrying transient failures with backoff.
    pub async fn get_usage(&self) -> Result<Usage> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), USAGE_PATH);
        let mut attempt = 0;

        loop {
            if attempt > 0 {
                let delay = backoff_duration(self.initial_backoff, attempt - 1);
                debug!("Retry {} in {:?}", attempt, delay);
                tokio::time::sleep(delay).await;
            }

            match self.request_usage(&url).await {
                Ok(usage) => return Ok(usage),
                Err(e) if e.is_retriable() && attempt < MAX_RETRIES => {
                    warn!("Usage request failed (attempt {}): {}", attempt + 1, e);
                    attempt += 1;
                }
                Err(e) if e.is_retriable() => {
                    return Err(LimitsError::RetriesExhausted {
                        attempts: attempt + 1,
                        source: Box::new(e),
                    })
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn request_usage(&self, url: &str) -> Result<Usage> {
        let response = self
            .http
            .get(url)
            .headers(self.headers()?)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LimitsError::Api {
                status: status.as_u16(),
                message: error_message(status, &body),
                retriable: is_retriable(status),
            });
        }

        let body = response.bytes().await?;
        let raw: Value = serde_json::from_slice(&body)?;
        Ok(Usage::new(raw))
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.access_token))
                .map_err(|e| LimitsError::Credentials(format!("invalid token format: {e}")))?,
        );
        headers.insert(
            ANTHROPIC_BETA_HEADER,
            HeaderValue::from_static(ANTHROPIC_BETA_VALUE),
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&user_agent())
                .unwrap_or_else(|_| HeaderValue::from_static("claude-code")),
        );
        Ok(headers)
    }
}

/// Prefers the API's own error text over the bare status reason.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        match json.get("error") {
            Some(Value::String(msg)) if !msg.is_empty() => return msg.clone(),
            Some(Value::Object(err)) => {
                if let Some(Value::String(msg)) = err.get("message") {
                    return msg.clone();
                }
            }
            _ => {}
        }
    }
    status
        .canonical_reason()
        .unwrap_or("unknown error")
        .to_string()
}
