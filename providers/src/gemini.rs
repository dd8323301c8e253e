use cakewalk_types::ApiKey;
use futures_util::future::{BoxFuture, FutureExt};
use serde_json::{Value, json};

use crate::wire_types::gemini as typed;
use crate::{
    DEFAULT_GEMINI_MODEL, GEMINI_API_BASE_URL, WishBackend, WishError, http_client,
    is_loopback_http, loopback_http_client, read_capped_error_body,
};

/// Google Gemini `generateContent` client.
///
/// A missing API key is not a construction error: the backend then fails every
/// call with [`WishError::MissingApiKey`] and the provider falls back.
#[derive(Debug, Clone)]
pub struct GeminiBackend {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<ApiKey>,
}

impl GeminiBackend {
    #[must_use]
    pub fn new(api_key: Option<ApiKey>) -> Self {
        Self {
            client: http_client().clone(),
            base_url: GEMINI_API_BASE_URL.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            api_key,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point at another endpoint. Plain HTTP is accepted for loopback hosts only.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        if is_loopback_http(&self.base_url) {
            self.client = loopback_http_client().clone();
        }
        self
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    async fn generate_text(&self, prompt: &str) -> Result<String, WishError> {
        let api_key = self.api_key.as_ref().ok_or(WishError::MissingApiKey)?;
        let body = build_request_body(prompt);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key.as_str())
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = read_capped_error_body(response).await;
            return Err(WishError::Status { status, body });
        }

        let bytes = response.bytes().await?;
        let parsed: typed::Response =
            serde_json::from_slice(&bytes).map_err(|e| WishError::Decode(e.to_string()))?;
        extract_text(parsed)
    }
}

impl WishBackend for GeminiBackend {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, WishError>> {
        self.generate_text(prompt).boxed()
    }
}

/// Build the request body for a single-turn generation.
///
/// Thinking is disabled (`thinkingBudget: 0`) because the wish should arrive fast.
fn build_request_body(prompt: &str) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": prompt }]
        }],
        "generationConfig": {
            "thinkingConfig": { "thinkingBudget": 0 }
        }
    })
}

/// Join the visible text parts of the first candidate.
fn extract_text(response: typed::Response) -> Result<String, WishError> {
    if let Some(error) = response.error {
        return Err(WishError::Api(error.message_or_default().to_string()));
    }

    let Some(candidate) = response.candidates.and_then(|c| c.into_iter().next()) else {
        let reason = response
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason)
            .unwrap_or_else(|| "no candidates".to_string());
        return Err(WishError::Api(reason));
    };

    let text: String = candidate
        .content
        .and_then(|content| content.parts)
        .unwrap_or_default()
        .into_iter()
        .filter(|part| !part.thought)
        .filter_map(|part| part.text)
        .collect();

    let trimmed = text.trim();
    if trimmed.is_empty() {
        tracing::warn!(
            finish_reason = candidate.finish_reason.as_deref().unwrap_or("unknown"),
            "Gemini returned an empty candidate"
        );
        return Err(WishError::Empty);
    }
    Ok(trimmed.to_string())
}


#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::WishProvider;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend_for(server: &MockServer) -> GeminiBackend {
        GeminiBackend::new(Some(ApiKey::new("test-key").unwrap()))
            .with_base_url(server.uri())
            .with_client(reqwest::Client::new())
    }

    fn success_body(text: &str) -> Value {
        json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }]
        })
    }

    #[tokio::test]
    async fn generates_wish_from_mock_server() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "generationConfig": { "thinkingConfig": { "thinkingBudget": 0 } }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("Stay sparkly!")))
            .expect(1)
            .mount(&server)
            .await;

        let provider = WishProvider::new(backend_for(&server));
        let wish = provider.fetch_wish().await;
        assert_eq!(wish.as_str(), "Stay sparkly!");
    }

    #[tokio::test]
    async fn server_error_surfaces_status_from_backend() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .expect(1)
            .mount(&server)
            .await;

        let result = backend_for(&server).generate("hi").await;
        match result {
            Err(WishError::Status { status, body }) => {
                assert_eq!(status, reqwest::StatusCode::SERVICE_UNAVAILABLE);
                assert_eq!(body, "overloaded");
            }
            other => panic!("expected Status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn server_error_is_not_retried_and_falls_back() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let provider = WishProvider::new(backend_for(&server));
        assert!(provider.fetch_wish().await.is_fallback());
    }

    #[tokio::test]
    async fn malformed_body_falls_back() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let backend = backend_for(&server);
        assert!(matches!(
            backend.generate("hi").await,
            Err(WishError::Decode(_))
        ));

        let provider = WishProvider::new(backend);
        assert!(provider.fetch_wish().await.is_fallback());
    }

    #[tokio::test]
    async fn unreachable_server_falls_back() {
        let server = MockServer::start().await;
        let backend = backend_for(&server);
        drop(server);

        let provider = WishProvider::new(backend);
        assert!(provider.fetch_wish().await.is_fallback());
    }
}
