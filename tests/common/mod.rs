//! Shared test utilities and fixtures
//!
//! Common infrastructure for integration tests: a mock Gemini endpoint and
//! helpers that drive the app the way the frame loop does.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cakewalk_engine::effects::LAYER_FALL_DURATION;
use cakewalk_engine::{
    ApiKey, App, GeminiBackend, LAYER_COUNT, ManualClock, Phase, UiOptions, WishProvider,
};
use cakewalk_tui::report_landings;

pub const TEST_KEY: &str = "test-key";
pub const GENERATE_PATH: &str = "/models/gemini-2.5-flash:generateContent";

/// Frame cadence used when simulating the render loop.
pub const FRAME: Duration = Duration::from_millis(16);

/// Start a mock server that simulates the Gemini API
pub async fn start_gemini_mock() -> MockServer {
    MockServer::start().await
}

pub fn gemini_body(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

/// Mount a successful `generateContent` response
pub async fn mount_gemini_wish(server: &MockServer, text: &str) {
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(header("x-goog-api-key", TEST_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_body(text)))
        .mount(server)
        .await;
}

/// Mount an error status for every request
pub async fn mount_gemini_failure(server: &MockServer, status: u16) {
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(status).set_body_string("upstream unavailable"))
        .mount(server)
        .await;
}

pub fn gemini_provider(server: &MockServer) -> WishProvider {
    let backend =
        GeminiBackend::new(Some(ApiKey::new(TEST_KEY).unwrap())).with_base_url(server.uri());
    WishProvider::new(backend)
}

/// An app on a virtual clock, wired to the mock Gemini server.
pub fn gemini_app(server: &MockServer) -> (App, ManualClock) {
    let clock = ManualClock::new();
    let app = App::with_parts(
        Arc::new(clock.clone()),
        gemini_provider(server),
        UiOptions::default(),
    );
    (app, clock)
}

/// Tick until no wish is in flight, sleeping briefly so HTTP calls can finish.
pub async fn settle(app: &mut App) {
    for _ in 0..500 {
        app.tick();
        if !app.wish_loading() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("wish fetch never completed");
}

/// One frame of the render loop: report landings, then advance.
pub fn frame(app: &mut App, clock: &ManualClock) {
    clock.advance(FRAME);
    report_landings(app);
    app.tick();
}

/// Run frames until `phase` is reached or `limit` of virtual time passes.
pub fn run_until(app: &mut App, clock: &ManualClock, phase: Phase, limit: Duration) -> Duration {
    let start = clock_now(clock);
    while app.phase() != phase {
        assert!(
            clock_now(clock) - start <= limit,
            "phase {phase} not reached within {limit:?}, stuck in {}",
            app.phase()
        );
        frame(app, clock);
    }
    clock_now(clock) - start
}

fn clock_now(clock: &ManualClock) -> Duration {
    use cakewalk_engine::Clock;
    clock.now()
}

/// Upper bound on the stacking sequence in virtual time.
pub fn stacking_budget() -> Duration {
    let per_layer = LAYER_FALL_DURATION + Duration::from_millis(600) + FRAME * 2;
    per_layer * u32::from(LAYER_COUNT)
}
