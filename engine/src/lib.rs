//! Core engine for Cakewalk - celebration state machine and orchestration.
//!
//! This crate contains the App state machine without TUI dependencies. The
//! render layer drives it by calling [`App::tick`] once per frame and
//! reporting layer landings and candle clicks back.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

pub use cakewalk_config::{CakewalkConfig, ConfigError};
pub use cakewalk_providers::{self, GeminiBackend, WishBackend, WishError, WishProvider};
pub use cakewalk_types::{
    ApiKey, EmptyStringError, LAYER_COUNT, NonEmptyStaticStr, NonEmptyString, Phase,
    StackProgress, UiOptions, Wish,
};

pub mod clock;
pub mod effects;
mod session;
mod timeline;

pub use clock::{Clock, ManualClock, SystemClock};
pub use effects::{ConfettiParticle, LayerDrop};
pub use session::{
    CANDLE_REVEAL_DELAY, LAYER_SETTLE_DELAY, Session, SessionTimer, TITLE_DURATION,
    TITLE_FADE_OUT, Transition, WishRequest, WishRequestKind, WishTicket,
};
pub use timeline::Timeline;

const MISSING_KEY_STATUS: &str = "No Gemini API key found; using the built-in wish";

/// A wish fetch running on the tokio runtime.
#[derive(Debug)]
struct WishTask {
    ticket: WishTicket,
    handle: JoinHandle<Wish>,
}

#[derive(Debug)]
pub struct App {
    session: Session,
    clock: Arc<dyn Clock>,
    provider: WishProvider,
    wish_task: Option<WishTask>,
    options: UiOptions,
    /// Fetch a wish as soon as the session begins instead of at the wish card.
    prefetch: bool,
    /// When the layer currently falling became active.
    layer_started_at: Option<Duration>,
    status_message: Option<String>,
    should_quit: bool,
    tick: u64,
}

impl App {
    /// Build an app backed by Gemini and the system clock.
    ///
    /// A missing config falls back to defaults, with the API key still taken
    /// from the environment when present.
    #[must_use]
    pub fn new(config: Option<&CakewalkConfig>) -> Self {
        let defaults = CakewalkConfig::default();
        let config = config.unwrap_or(&defaults);

        let api_key = config.gemini_api_key();
        let has_key = api_key.is_some();
        let mut backend = GeminiBackend::new(api_key);
        if let Some(model) = config.gemini_model() {
            backend = backend.with_model(model);
        }
        if let Some(base_url) = config.gemini_base_url() {
            backend = backend.with_base_url(base_url);
        }
        tracing::info!(model = backend.model(), has_key, "Wish backend configured");

        let mut app = Self::with_parts(
            Arc::new(SystemClock::new()),
            WishProvider::new(backend),
            config.ui_options(),
        )
        .with_prefetch(config.prefetch_wish());

        if !has_key {
            tracing::warn!("No Gemini API key configured; wishes will use the fallback");
            app.set_status(MISSING_KEY_STATUS);
        }
        app
    }

    /// Assemble an app from explicit parts. Prefetch is on.
    #[must_use]
    pub fn with_parts(clock: Arc<dyn Clock>, provider: WishProvider, options: UiOptions) -> Self {
        Self {
            session: Session::new(),
            clock,
            provider,
            wish_task: None,
            options,
            prefetch: true,
            layer_started_at: None,
            status_message: None,
            should_quit: false,
            tick: 0,
        }
    }

    pub fn with_prefetch(mut self, prefetch: bool) -> Self {
        self.prefetch = prefetch;
        self
    }

    /// Session start: issue the eager wish fetch if enabled.
    ///
    /// Must be called from within a tokio runtime.
    pub fn begin(&mut self) {
        if self.prefetch {
            self.spawn_wish(WishRequestKind::Prefetch);
        }
    }

    #[must_use]
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// "Build the Cake".
    pub fn start(&mut self) -> Transition {
        let transition = self.session.start();
        if transition.is_applied() {
            self.layer_started_at = Some(self.now());
        }
        transition
    }

    /// The render layer saw layer `index` reach its resting place.
    pub fn layer_landed(&mut self, index: u8) -> Transition {
        let now = self.now();
        self.session.layer_landed(index, now)
    }

    pub fn light_candle(&mut self) -> Transition {
        let now = self.now();
        self.session.light_candle(now)
    }

    /// Primary action: start building, or light the candle once it is ready.
    pub fn activate(&mut self) -> Transition {
        match self.session.phase() {
            Phase::Initial => self.start(),
            Phase::ReadyToLight => self.light_candle(),
            Phase::Stacking | Phase::Celebrating | Phase::Finished => Transition::Ignored,
        }
    }

    /// Ask for a fresh wish. Only honored on the wish card with nothing in flight.
    pub fn request_another_wish(&mut self) -> bool {
        self.spawn_wish(WishRequestKind::Refresh)
    }

    /// Play again: cancel everything in flight and begin a new session.
    pub fn restart(&mut self) {
        if let Some(task) = self.wish_task.take() {
            task.handle.abort();
        }
        self.session.reset();
        self.layer_started_at = None;
        self.begin();
    }

    pub fn request_quit(&mut self) {
        self.should_quit = true;
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Advance one frame: fire due timers and collect a finished wish fetch.
    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
        let now = self.now();

        for timer in self.session.advance(now) {
            match timer {
                SessionTimer::PlaceLayer(_) => self.layer_started_at = Some(now),
                SessionTimer::RevealCandle => self.layer_started_at = None,
                SessionTimer::ShowWish => {
                    if self.session.wish().is_none() && !self.session.wish_loading() {
                        self.spawn_wish(WishRequestKind::Prefetch);
                    }
                }
                SessionTimer::HideTitle => {}
            }
        }

        self.poll_wish();
    }

    fn spawn_wish(&mut self, kind: WishRequestKind) -> bool {
        match self.session.request_wish(kind) {
            WishRequest::Issued(ticket) => {
                let provider = self.provider.clone();
                let handle = tokio::spawn(async move { provider.fetch_wish().await });
                tracing::debug!(?kind, backend = self.provider.backend_name(), "Wish requested");
                self.wish_task = Some(WishTask { ticket, handle });
                true
            }
            WishRequest::AlreadyLoading => {
                tracing::debug!(?kind, "Wish already loading, request ignored");
                false
            }
            WishRequest::NotFinished => {
                tracing::debug!(?kind, phase = %self.session.phase(), "Wish refresh ignored");
                false
            }
        }
    }

    fn poll_wish(&mut self) {
        use futures_util::future::FutureExt;

        // Check if the task is finished (non-blocking)
        let finished = self
            .wish_task
            .as_ref()
            .is_some_and(|task| task.handle.is_finished());
        if !finished {
            return;
        }
        let Some(WishTask { ticket, handle }) = self.wish_task.take() else {
            return;
        };

        let wish = match handle.now_or_never() {
            Some(Ok(wish)) => wish,
            Some(Err(error)) => {
                tracing::error!(%error, "Wish task failed, using fallback");
                Wish::fallback()
            }
            None => {
                tracing::warn!("Finished wish task was not ready, using fallback");
                Wish::fallback()
            }
        };

        if self.session.complete_wish(ticket, wish) {
            tracing::info!(phase = %self.session.phase(), "Wish ready");
        }
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.session.phase()
    }

    /// The falling layer and where it is right now.
    #[must_use]
    pub fn active_layer_drop(&self) -> Option<(u8, LayerDrop)> {
        let index = self.session.stack_progress().active_layer()?;
        let started = self.layer_started_at?;
        let elapsed = self.now().saturating_sub(started);
        Some((index, effects::layer_drop(elapsed)))
    }

    /// Confetti on screen right now; empty outside the celebration or with
    /// reduced motion.
    #[must_use]
    pub fn confetti(&self) -> Vec<ConfettiParticle> {
        if self.options.reduced_motion {
            return Vec::new();
        }
        match self.session.celebration_started_at() {
            Some(started) => effects::confetti_particles(self.now().saturating_sub(started)),
            None => Vec::new(),
        }
    }

    #[must_use]
    pub fn flame_scale(&self) -> f32 {
        if self.options.reduced_motion {
            1.0
        } else {
            effects::flame_scale(self.now())
        }
    }

    /// Opacity of the "Happy Birthday!" card, fading in when shown and out
    /// once hidden.
    #[must_use]
    pub fn title_opacity(&self) -> f32 {
        let now = self.now();
        if self.session.show_title_overlay() {
            let shown_at = self.session.celebration_started_at().unwrap_or(now);
            return effects::fade_in(now.saturating_sub(shown_at), effects::TITLE_FADE_IN);
        }
        match (self.session.phase(), self.session.title_hidden_at()) {
            (Phase::Celebrating, Some(hidden_at)) => {
                effects::fade_out(now.saturating_sub(hidden_at), TITLE_FADE_OUT)
            }
            _ => 0.0,
        }
    }

    /// How far the wish card has slid into place, `1.0` once settled.
    #[must_use]
    pub fn wish_card_progress(&self) -> f32 {
        if !self.session.show_wish_overlay() {
            return 0.0;
        }
        if self.options.reduced_motion {
            return 1.0;
        }
        let shown_at = self
            .session
            .title_hidden_at()
            .map_or(Duration::ZERO, |hidden_at| hidden_at + TITLE_FADE_OUT);
        effects::fade_in(
            self.now().saturating_sub(shown_at),
            effects::WISH_CARD_SLIDE_IN,
        )
    }

    /// Text for the wish card: the wish, or the placeholder until one arrives.
    #[must_use]
    pub fn wish_text(&self) -> &str {
        self.session
            .wish()
            .map_or(Wish::PLACEHOLDER.as_str(), Wish::as_str)
    }

    #[must_use]
    pub fn wish_loading(&self) -> bool {
        self.session.wish_loading()
    }

    #[must_use]
    pub fn ui_options(&self) -> UiOptions {
        self.options
    }

    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        self.provider.backend_name()
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    #[must_use]
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick
    }
}
