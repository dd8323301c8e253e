//! TUI rendering for Cakewalk using ratatui.
//!
//! [`draw`] renders the scene for whatever phase the app is in. The frame
//! loop also calls [`report_landings`] each frame, which is how the engine
//! learns that a falling layer has come to rest.

mod cake;
mod effects;
mod input;
mod theme;

pub use effects::{pop_scale, slide_up};
pub use input::{Action, InputPump, action_for, apply_action, handle_events};
pub use theme::{Glyphs, Palette, glyphs, palette, parse_hex, spinner_frame, styles};

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Padding, Paragraph, Wrap},
};
use unicode_width::UnicodeWidthStr;

use cakewalk_engine::{App, Phase};

use self::cake::{CAKE_ROWS, draw_cake, draw_confetti};

const WISH_CARD_WIDTH: u16 = 60;
const CREDIT: &str = "Powered by Google Gemini";

/// Report a layer that has finished falling. Returns true if the engine accepted it.
///
/// Each layer is reported once; frames after the report are no-ops until the
/// next layer starts falling.
pub fn report_landings(app: &mut App) -> bool {
    let Some((index, drop)) = app.active_layer_drop() else {
        return false;
    };
    if !drop.landed || app.session().awaiting_landing() != Some(index) {
        return false;
    }
    app.layer_landed(index).is_applied()
}

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let options = app.ui_options();
    let palette = palette(options);
    let glyphs = glyphs(options);
    let bg_block = Block::default().style(Style::default().bg(palette.bg));
    frame.render_widget(bg_block, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Min(1),    // Scene
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());
    let scene = chunks[0];

    draw_cake(frame, app, cake_area(scene), &palette, &glyphs);
    draw_confetti(frame, app, scene, &palette, &glyphs);

    match app.phase() {
        Phase::Initial => draw_start_card(frame, scene, &palette, &glyphs),
        Phase::ReadyToLight => draw_candle_hint(frame, scene, &palette),
        Phase::Stacking | Phase::Celebrating | Phase::Finished => {}
    }
    if app.title_opacity() > 0.0 {
        draw_title(frame, app, scene, &palette);
    }
    if app.session().show_wish_overlay() {
        draw_wish_card(frame, app, scene, &palette, &glyphs);
    }

    draw_status_bar(frame, app, chunks[1], &palette);
}

/// The lower part of the scene where the cake stands.
fn cake_area(scene: Rect) -> Rect {
    let height = scene.height.min(CAKE_ROWS.saturating_mul(2));
    Rect {
        y: scene.bottom().saturating_sub(height),
        height,
        ..scene
    }
}

/// A `width` x `height` rectangle centered in `area`, clipped to it.
fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn card_block(palette: &Palette) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.border))
        .style(Style::default().bg(palette.bg_card))
        .padding(Padding::horizontal(2))
}

fn draw_start_card(frame: &mut Frame, scene: Rect, palette: &Palette, glyphs: &Glyphs) {
    let area = centered_rect(scene, 40, 7);
    let lines = vec![
        Line::from(Span::styled("It's a Special Day!", styles::heading(palette))),
        Line::from(""),
        Line::from(Span::styled(
            format!(" {} Build the Cake ", glyphs.sparkle),
            styles::button(palette),
        )),
        Line::from(""),
        Line::from(Span::styled("press Enter", styles::key_hint(palette))),
    ];
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(card_block(palette)),
        area,
    );
}

fn draw_candle_hint(frame: &mut Frame, scene: Rect, palette: &Palette) {
    let text = " Tap the candle to light it! ";
    let width = text.width() as u16;
    if scene.height < 3 {
        return;
    }
    let area = Rect {
        x: scene.x + scene.width.saturating_sub(width) / 2,
        y: scene.y + 1,
        width: width.min(scene.width),
        height: 1,
    };
    frame.render_widget(
        Paragraph::new(Span::styled(text, styles::hint_pill(palette))),
        area,
    );
}

fn draw_title(frame: &mut Frame, app: &App, scene: Rect, palette: &Palette) {
    let upper_half = Rect {
        height: scene.height / 2,
        ..scene
    };
    let base = centered_rect(upper_half, 32, 5);
    let area = pop_scale(base, app.title_opacity());
    let mut style = styles::heading(palette);
    if app.title_opacity() < 0.5 {
        style = style.add_modifier(Modifier::DIM);
    }
    let lines = vec![
        Line::from(Span::styled("Happy", style)),
        Line::from(Span::styled("Birthday!", style)),
    ];
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(card_block(palette)),
        area,
    );
}

fn draw_wish_card(frame: &mut Frame, app: &App, scene: Rect, palette: &Palette, glyphs: &Glyphs) {
    let inner_width = usize::from(WISH_CARD_WIDTH.min(scene.width).saturating_sub(6)).max(1);
    let wish = app.wish_text();
    let wrapped_rows = wish.width().div_ceil(inner_width).max(1) as u16;
    let height = wrapped_rows + 8;

    let base = centered_rect(scene, WISH_CARD_WIDTH, height);
    let area = slide_up(base, scene, app.wish_card_progress());

    let options = app.ui_options();
    let action = if app.wish_loading() {
        Line::from(vec![
            Span::styled(
                spinner_frame(app.tick_count() as usize / 8, options),
                styles::key_hint(palette),
            ),
            Span::styled(" Thinking of a new wish...", styles::key_hint(palette)),
        ])
    } else {
        Line::from(vec![
            Span::styled("[w] ", styles::key_hint(palette)),
            Span::styled("Generate another wish with Gemini", styles::link(palette)),
        ])
    };

    let lines = vec![
        Line::from(glyphs.cake_icon),
        Line::from(""),
        Line::from(Span::styled(wish.to_string(), styles::wish_text(palette))),
        Line::from(""),
        action,
        Line::from(""),
        Line::from(vec![
            Span::styled("[r] ", styles::key_hint(palette)),
            Span::styled(" Play Again ", styles::button(palette)),
        ]),
    ];
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(card_block(palette)),
        area,
    );
}

fn key_hints(phase: Phase) -> &'static str {
    match phase {
        Phase::Initial => "Enter build  q quit",
        Phase::Stacking => "q quit",
        Phase::ReadyToLight => "Enter/c light  q quit",
        Phase::Celebrating => "r restart  q quit",
        Phase::Finished => "w another wish  r play again  q quit",
    }
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let left = key_hints(app.phase());
    let right = app.status_message().unwrap_or(CREDIT);
    let gap = usize::from(area.width).saturating_sub(left.width() + right.width());

    let line = Line::from(vec![
        Span::styled(left, styles::key_hint(palette)),
        Span::raw(" ".repeat(gap)),
        Span::styled(right, Style::default().fg(palette.text_muted)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use ratatui::{Terminal, backend::TestBackend};

    use cakewalk_engine::{
        CANDLE_REVEAL_DELAY, LAYER_COUNT, LAYER_SETTLE_DELAY, ManualClock, TITLE_DURATION,
        TITLE_FADE_OUT, UiOptions, Wish, WishProvider, effects::LAYER_FALL_DURATION,
    };

    use super::*;

    fn test_app(options: UiOptions) -> (App, ManualClock) {
        let clock = ManualClock::new();
        let app = App::with_parts(Arc::new(clock.clone()), WishProvider::offline(), options)
            .with_prefetch(false);
        (app, clock)
    }

    fn render(app: &App) -> String {
        let backend = TestBackend::new(80, 30);
        let mut terminal = Terminal::new(backend).unwrap();
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

    /// Run the frame loop's per-frame work until the candle is ready.
    fn stack(app: &mut App, clock: &ManualClock) {
        assert!(app.start().is_applied());
        for _ in 0..LAYER_COUNT {
            clock.advance(LAYER_FALL_DURATION);
            assert!(report_landings(app));
            assert!(!report_landings(app));
            clock.advance(LAYER_SETTLE_DELAY.max(CANDLE_REVEAL_DELAY));
            app.tick();
        }
        assert_eq!(app.phase(), Phase::ReadyToLight);
    }

    #[test]
    fn initial_screen_offers_build_button() {
        let (app, _clock) = test_app(UiOptions::default());
        let screen = render(&app);
        assert!(screen.contains("It's a Special Day!"));
        assert!(screen.contains("Build the Cake"));
        assert!(screen.contains("Powered by Google Gemini"));
    }

    #[test]
    fn status_message_replaces_credit() {
        let (mut app, _clock) = test_app(UiOptions::default());
        app.set_status("No Gemini API key found");
        let screen = render(&app);
        assert!(screen.contains("No Gemini API key found"));
        assert!(!screen.contains("Powered by"));
    }

    #[test]
    fn landings_reported_once_per_layer() {
        let (mut app, clock) = test_app(UiOptions::default());
        assert!(!report_landings(&mut app));
        let _ = app.start();
        assert!(!report_landings(&mut app));
        clock.advance(LAYER_FALL_DURATION);
        assert!(report_landings(&mut app));
        assert!(!report_landings(&mut app));
        clock.advance(Duration::from_millis(100));
        assert!(!report_landings(&mut app));
    }

    #[test]
    fn ready_to_light_shows_candle_hint() {
        let (mut app, clock) = test_app(UiOptions::default());
        stack(&mut app, &clock);
        let screen = render(&app);
        assert!(screen.contains("Tap the candle to light it!"));
        assert!(screen.contains("Click Me!"));
        assert!(!screen.contains("Build the Cake"));
    }

    #[test]
    fn celebrating_shows_title() {
        let (mut app, clock) = test_app(UiOptions::default());
        stack(&mut app, &clock);
        let _ = app.light_candle();
        clock.advance(Duration::from_millis(500));
        let screen = render(&app);
        assert!(screen.contains("Happy"));
        assert!(screen.contains("Birthday!"));
        assert!(!screen.contains("Tap the candle"));
    }

    #[tokio::test]
    async fn finished_shows_wish_card() {
        let (mut app, clock) = test_app(UiOptions {
            ascii_only: true,
            ..UiOptions::default()
        });
        stack(&mut app, &clock);
        let _ = app.light_candle();
        clock.advance(TITLE_DURATION);
        app.tick();
        clock.advance(TITLE_FADE_OUT);
        app.tick();
        assert_eq!(app.phase(), Phase::Finished);

        assert!(app.wish_loading());
        let screen = render(&app);
        assert!(screen.contains("Thinking of a new wish..."));
        assert!(screen.contains(Wish::PLACEHOLDER.as_str()));

        for _ in 0..100 {
            if !app.wish_loading() {
                break;
            }
            tokio::task::yield_now().await;
            app.tick();
        }
        clock.advance(Duration::from_secs(1));
        let screen = render(&app);
        assert!(screen.contains(Wish::FALLBACK.as_str()));
        assert!(screen.contains("Generate another wish with Gemini"));
        assert!(screen.contains("Play Again"));
        assert!(!screen.contains("Happy"));
    }

    #[test]
    fn small_terminal_does_not_panic() {
        let (mut app, clock) = test_app(UiOptions::default());
        let _ = app.start();
        clock.advance(Duration::from_millis(300));
        let backend = TestBackend::new(12, 6);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| draw(frame, &app)).unwrap();
    }
}
