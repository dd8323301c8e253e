//! Wish provider behavior against a mock Gemini endpoint.

use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use cakewalk_engine::{GeminiBackend, Wish, WishProvider};
use cakewalk_providers::WISH_PROMPT;

use crate::common::{
    GENERATE_PATH, TEST_KEY, gemini_body, gemini_provider, mount_gemini_failure,
    start_gemini_mock,
};

#[tokio::test]
async fn sends_fixed_prompt_without_thinking() {
    let server = start_gemini_mock().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(header("x-goog-api-key", TEST_KEY))
        .and(body_partial_json(serde_json::json!({
            "contents": [{ "role": "user", "parts": [{ "text": WISH_PROMPT }] }],
            "generationConfig": { "thinkingConfig": { "thinkingBudget": 0 } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_body("  Shine on!  ")))
        .expect(1)
        .mount(&server)
        .await;

    let wish = gemini_provider(&server).fetch_wish().await;
    assert_eq!(wish.as_str(), "Shine on!");
}

#[tokio::test]
async fn error_status_resolves_to_fallback() {
    let server = start_gemini_mock().await;
    mount_gemini_failure(&server, 500).await;

    let wish = gemini_provider(&server).fetch_wish().await;
    assert_eq!(wish, Wish::fallback());
}

#[tokio::test]
async fn blank_text_resolves_to_fallback() {
    let server = start_gemini_mock().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_body("   ")))
        .mount(&server)
        .await;

    assert!(gemini_provider(&server).fetch_wish().await.is_fallback());
}

#[tokio::test]
async fn missing_key_never_reaches_the_network() {
    let server = start_gemini_mock().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_body("unused")))
        .expect(0)
        .mount(&server)
        .await;

    let provider = WishProvider::new(GeminiBackend::new(None).with_base_url(server.uri()));
    assert!(provider.fetch_wish().await.is_fallback());
}

#[tokio::test]
async fn custom_model_changes_endpoint() {
    let server = start_gemini_mock().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-test:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_body("Custom!")))
        .expect(1)
        .mount(&server)
        .await;

    let backend = GeminiBackend::new(Some(cakewalk_engine::ApiKey::new(TEST_KEY).unwrap()))
        .with_model("gemini-test")
        .with_base_url(server.uri());
    let wish = WishProvider::new(backend).fetch_wish().await;
    assert_eq!(wish.as_str(), "Custom!");
}
