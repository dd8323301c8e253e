//! Wish provider backed by a generative-text service.
//!
//! # Architecture
//!
//! - [`WishBackend`] - a single request/response call that may fail
//! - [`gemini`] - Google Gemini client (GenerateContent API)
//! - [`WishProvider`] - wraps a backend and never fails: any backend error is
//!   logged and replaced by [`Wish::FALLBACK`]
//!
//! Every call is a fresh request. There is no retry, no caching, and no timeout
//! beyond the transport defaults of the shared HTTP client.

pub mod gemini;
pub mod wire_types;

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt};
use thiserror::Error;

pub use cakewalk_types;
use cakewalk_types::Wish;
pub use gemini::GeminiBackend;

/// Canonical Gemini API base URL.
pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Model used when the config does not name one.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Fixed prompt sent on every wish request.
pub const WISH_PROMPT: &str =
    "Write a short, heartwarming, and poetic birthday wish (max 20 words). Do not use quotes.";

const CONNECT_TIMEOUT_SECS: u64 = 30;
const TCP_KEEPALIVE_SECS: u64 = 60;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;

const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

/// Failure of a single backend call.
///
/// Never escapes [`WishProvider::fetch_wish`]; it only reaches the logs.
#[derive(Debug, Error)]
pub enum WishError {
    #[error("no API key configured for the wish backend")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("API reported an error: {0}")]
    Api(String),
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("backend returned no text")]
    Empty,
}

/// A generative-text backend that turns a prompt into a short text.
pub trait WishBackend: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, WishError>>;
}

/// Backend used when no credentials are available. Every call fails fast.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineBackend;

impl WishBackend for OfflineBackend {
    fn name(&self) -> &'static str {
        "offline"
    }

    fn generate<'a>(&'a self, _prompt: &'a str) -> BoxFuture<'a, Result<String, WishError>> {
        async { Err(WishError::MissingApiKey) }.boxed()
    }
}

/// Always-resolving wish source.
#[derive(Clone)]
pub struct WishProvider {
    backend: Arc<dyn WishBackend>,
}

impl WishProvider {
    pub fn new(backend: impl WishBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    #[must_use]
    pub fn offline() -> Self {
        Self::new(OfflineBackend)
    }

    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Ask the backend for a wish. Resolves to [`Wish::FALLBACK`] on any failure.
    pub async fn fetch_wish(&self) -> Wish {
        let outcome = self
            .backend
            .generate(WISH_PROMPT)
            .await
            .and_then(|text| Wish::new(text).map_err(|_| WishError::Empty));

        match outcome {
            Ok(wish) => {
                tracing::info!(backend = self.backend.name(), "Generated birthday wish");
                wish
            }
            Err(error) => {
                tracing::error!(
                    backend = self.backend.name(),
                    %error,
                    "Failed to generate wish, using fallback"
                );
                Wish::fallback()
            }
        }
    }
}

impl std::fmt::Debug for WishProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WishProvider")
            .field("backend", &self.backend.name())
            .finish()
    }
}

/// Shared hardened HTTP client.
pub fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        base_client_builder().build().unwrap_or_else(|e| {
            tracing::error!("Failed to build hardened HTTP client: {e}. Using defaults.");
            reqwest::Client::new()
        })
    })
}

/// Client for loopback endpoints such as local proxies, which may speak plain HTTP.
pub fn loopback_http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        base_client_builder()
            .https_only(false)
            .build()
            .unwrap_or_else(|e| {
                tracing::error!("Failed to build loopback HTTP client: {e}. Using defaults.");
                reqwest::Client::new()
            })
    })
}

/// Whether `url` is plain HTTP to this machine.
#[must_use]
pub fn is_loopback_http(url: &str) -> bool {
    let Some(rest) = url.strip_prefix("http://") else {
        return false;
    };
    if rest.starts_with("[::1]") {
        return true;
    }
    let host = rest.split([':', '/']).next().unwrap_or_default();
    matches!(host, "localhost" | "127.0.0.1")
}

fn base_client_builder() -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .redirect(reqwest::redirect::Policy::none())
        .https_only(true)
        .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
        .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
}

/// Read an error response body, truncated to a fixed size.
pub async fn read_capped_error_body(response: reqwest::Response) -> String {
    use futures_util::StreamExt;
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let Ok(chunk) = chunk else { break };
        body.extend_from_slice(&chunk);
        if body.len() > MAX_ERROR_BODY_BYTES {
            body.truncate(MAX_ERROR_BODY_BYTES);
            let text = String::from_utf8_lossy(&body);
            return format!("{text}...(truncated)");
        }
    }
    String::from_utf8_lossy(&body).into_owned()
}
