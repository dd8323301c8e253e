//! End-to-end celebration runs against a mock Gemini endpoint.

use std::time::Duration;

use ratatui::{Terminal, backend::TestBackend};

use cakewalk_engine::{Phase, StackProgress, TITLE_DURATION, TITLE_FADE_OUT, Wish};
use cakewalk_tui::{Action, apply_action, draw};

use crate::common::{
    FRAME, gemini_app, mount_gemini_failure, mount_gemini_wish, run_until, settle,
    stacking_budget, start_gemini_mock,
};

fn screen(app: &cakewalk_engine::App) -> String {
    let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
    terminal.draw(|frame| draw(frame, app)).unwrap();
    let buffer = terminal.backend().buffer();
    let mut out = String::new();
    for y in 0..buffer.area.height {
        for x in 0..buffer.area.width {
            out.push_str(buffer[(x, y)].symbol());
        }
        out.push('\n');
    }
    out
}

#[tokio::test]
async fn build_light_and_receive_wish() {
    let server = start_gemini_mock().await;
    mount_gemini_wish(&server, "Stay sparkly!").await;

    let (mut app, clock) = gemini_app(&server);
    app.begin();
    settle(&mut app).await;

    assert!(!apply_action(&mut app, Action::Activate));
    assert_eq!(app.phase(), Phase::Stacking);
    run_until(&mut app, &clock, Phase::ReadyToLight, stacking_budget());
    assert_eq!(app.session().stack_progress(), StackProgress::CANDLE);
    assert!(screen(&app).contains("Tap the candle to light it!"));

    assert!(!apply_action(&mut app, Action::LightCandle));
    assert_eq!(app.phase(), Phase::Celebrating);
    assert!(!app.confetti().is_empty());

    let elapsed = run_until(
        &mut app,
        &clock,
        Phase::Finished,
        TITLE_DURATION + TITLE_FADE_OUT + FRAME,
    );
    assert!(elapsed >= TITLE_DURATION + TITLE_FADE_OUT);
    assert!(app.session().show_wish_overlay());

    clock_settle(&mut app, &clock);
    let rendered = screen(&app);
    assert!(rendered.contains("Stay sparkly!"));
    assert!(rendered.contains("Play Again"));
}

#[tokio::test]
async fn backend_outage_still_reaches_finished_with_fallback() {
    let server = start_gemini_mock().await;
    mount_gemini_failure(&server, 503).await;

    let (mut app, clock) = gemini_app(&server);
    app.begin();
    settle(&mut app).await;

    let _ = app.activate();
    run_until(&mut app, &clock, Phase::ReadyToLight, stacking_budget());
    let _ = app.activate();
    run_until(
        &mut app,
        &clock,
        Phase::Finished,
        TITLE_DURATION + TITLE_FADE_OUT + FRAME,
    );
    assert_eq!(app.wish_text(), Wish::FALLBACK.as_str());
}

#[tokio::test]
async fn another_wish_and_play_again() {
    let server = start_gemini_mock().await;
    mount_gemini_wish(&server, "Make it a great one").await;

    let (mut app, clock) = gemini_app(&server);
    app.begin();
    settle(&mut app).await;

    assert!(!apply_action(&mut app, Action::AnotherWish));
    assert!(!app.wish_loading());

    let _ = app.activate();
    run_until(&mut app, &clock, Phase::ReadyToLight, stacking_budget());
    let _ = app.activate();
    run_until(
        &mut app,
        &clock,
        Phase::Finished,
        TITLE_DURATION + TITLE_FADE_OUT + FRAME,
    );

    assert!(!apply_action(&mut app, Action::AnotherWish));
    assert!(app.wish_loading());
    assert!(screen(&app).contains("Thinking of a new wish..."));
    settle(&mut app).await;
    assert_eq!(app.wish_text(), "Make it a great one");

    assert!(!apply_action(&mut app, Action::Restart));
    assert_eq!(app.phase(), Phase::Initial);
    assert!(!app.session().show_wish_overlay());
    assert!(screen(&app).contains("Build the Cake"));
    settle(&mut app).await;

    assert!(apply_action(&mut app, Action::Quit));
    assert!(server.received_requests().await.unwrap().len() >= 3);
}

/// Let the wish card finish sliding in.
fn clock_settle(app: &mut cakewalk_engine::App, clock: &cakewalk_engine::ManualClock) {
    clock.advance(Duration::from_secs(1));
    app.tick();
}
