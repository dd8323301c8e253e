//! Presentation state machine.
//!
//! The session sequences the celebration:
//!
//! ```text
//! Initial --start--> Stacking --layer 3 landed + 600ms--> ReadyToLight
//!     --candle--> Celebrating --3500ms--> (title hidden) --1000ms--> Finished
//! ```
//!
//! Inside `Stacking`, each "layer k landed" signal schedules the next layer
//! 500ms later. Every follow-up is a [`Timeline`] entry evaluated against the
//! caller's clock, so [`Session::reset`] can cancel all of them at once.
//!
//! Stimuli outside their valid phase are ignored, never errors.

use std::time::Duration;

use cakewalk_types::{LAYER_COUNT, Phase, StackProgress, Wish};

use crate::timeline::Timeline;

/// Pause between a layer landing and the next one starting to fall.
pub const LAYER_SETTLE_DELAY: Duration = Duration::from_millis(500);
/// Pause between the top layer landing and the candle appearing.
pub const CANDLE_REVEAL_DELAY: Duration = Duration::from_millis(600);
/// How long the title card stays up after the candle is lit.
pub const TITLE_DURATION: Duration = Duration::from_millis(3500);
/// Gap between hiding the title card and showing the wish card.
pub const TITLE_FADE_OUT: Duration = Duration::from_millis(1000);

/// Follow-up events the session schedules for itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionTimer {
    /// Set the stack progress to this step.
    PlaceLayer(u8),
    /// Place the candle slot and wait for the candle click.
    RevealCandle,
    HideTitle,
    ShowWish,
}

/// Outcome of an external stimulus.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    Ignored,
}

impl Transition {
    #[must_use]
    pub fn is_applied(self) -> bool {
        matches!(self, Transition::Applied)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WishRequestKind {
    /// Eager fetch at session start; allowed in any phase.
    Prefetch,
    /// User asked for another wish; only once the wish card is up.
    Refresh,
}

/// Identifies one wish request within one session generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WishTicket {
    generation: u64,
    serial: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WishRequest {
    Issued(WishTicket),
    /// A request is already in flight; the new one is dropped.
    AlreadyLoading,
    /// Refresh requested before the `Finished` phase.
    NotFinished,
}

/// The single celebration session.
#[derive(Debug)]
pub struct Session {
    phase: Phase,
    stack_progress: StackProgress,
    /// Highest layer index that has reported landing.
    landed_through: Option<u8>,
    show_title_overlay: bool,
    show_wish_overlay: bool,
    wish: Option<Wish>,
    pending_wish: Option<WishTicket>,
    celebration_started_at: Option<Duration>,
    title_hidden_at: Option<Duration>,
    timers: Timeline<SessionTimer>,
    generation: u64,
    next_serial: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: Phase::Initial,
            stack_progress: StackProgress::EMPTY,
            landed_through: None,
            show_title_overlay: false,
            show_wish_overlay: false,
            wish: None,
            pending_wish: None,
            celebration_started_at: None,
            title_hidden_at: None,
            timers: Timeline::new(),
            generation: 0,
            next_serial: 0,
        }
    }

    /// User starts building the cake.
    pub fn start(&mut self) -> Transition {
        if self.phase != Phase::Initial {
            tracing::debug!(phase = %self.phase, "Ignoring start outside initial phase");
            return Transition::Ignored;
        }
        self.phase = Phase::Stacking;
        self.stack_progress = StackProgress::FIRST_LAYER;
        tracing::info!("Celebration started, first layer dropping");
        Transition::Applied
    }

    /// The render layer reports that layer `index` reached its resting place.
    ///
    /// Only the layer currently in flight counts, and only once.
    pub fn layer_landed(&mut self, index: u8, now: Duration) -> Transition {
        if self.awaiting_landing() != Some(index) {
            tracing::debug!(
                index,
                progress = %self.stack_progress,
                phase = %self.phase,
                "Ignoring landing of a layer that is not in flight"
            );
            return Transition::Ignored;
        }

        self.landed_through = Some(index);
        let next = index + 1;
        if next < LAYER_COUNT {
            self.timers
                .schedule(now + LAYER_SETTLE_DELAY, SessionTimer::PlaceLayer(next));
        } else {
            self.timers
                .schedule(now + CANDLE_REVEAL_DELAY, SessionTimer::RevealCandle);
        }
        tracing::debug!(index, "Layer landed");
        Transition::Applied
    }

    /// The user clicked the candle.
    pub fn light_candle(&mut self, now: Duration) -> Transition {
        if self.phase != Phase::ReadyToLight {
            tracing::debug!(phase = %self.phase, "Ignoring candle click");
            return Transition::Ignored;
        }
        self.phase = Phase::Celebrating;
        self.show_title_overlay = true;
        self.celebration_started_at = Some(now);
        self.timers
            .schedule(now + TITLE_DURATION, SessionTimer::HideTitle);
        tracing::info!("Candle lit");
        Transition::Applied
    }

    /// Fire every timer due at or before `now`, earliest first.
    ///
    /// Follow-ups are scheduled relative to the due time of the timer that
    /// created them, so a late tick catches up without reordering anything.
    pub fn advance(&mut self, now: Duration) -> Vec<SessionTimer> {
        let mut fired = Vec::new();
        while let Some((due, timer)) = self.timers.pop_due(now) {
            self.fire(due, timer);
            fired.push(timer);
        }
        fired
    }

    fn fire(&mut self, due: Duration, timer: SessionTimer) {
        match timer {
            SessionTimer::PlaceLayer(step) => {
                if self.phase != Phase::Stacking {
                    return;
                }
                if let Some(progress) = StackProgress::new(step)
                    && progress > self.stack_progress
                {
                    self.stack_progress = progress;
                    tracing::debug!(step, "Next layer dropping");
                }
            }
            SessionTimer::RevealCandle => {
                if self.phase != Phase::Stacking {
                    return;
                }
                self.stack_progress = StackProgress::CANDLE;
                self.phase = Phase::ReadyToLight;
                tracing::info!("Cake assembled, waiting for the candle");
            }
            SessionTimer::HideTitle => {
                if self.phase != Phase::Celebrating {
                    return;
                }
                self.show_title_overlay = false;
                self.title_hidden_at = Some(due);
                self.timers
                    .schedule(due + TITLE_FADE_OUT, SessionTimer::ShowWish);
            }
            SessionTimer::ShowWish => {
                if self.phase != Phase::Celebrating {
                    return;
                }
                self.phase = Phase::Finished;
                self.show_wish_overlay = true;
                tracing::info!(has_wish = self.wish.is_some(), "Showing wish");
            }
        }
    }

    /// Return to the initial state and cancel every pending timer.
    ///
    /// Wish requests issued before the reset can no longer complete.
    pub fn reset(&mut self) {
        let generation = self.generation.wrapping_add(1);
        let next_serial = self.next_serial;
        *self = Self {
            generation,
            next_serial,
            ..Self::new()
        };
        tracing::info!(generation, "Session reset");
    }

    pub fn request_wish(&mut self, kind: WishRequestKind) -> WishRequest {
        if kind == WishRequestKind::Refresh && self.phase != Phase::Finished {
            return WishRequest::NotFinished;
        }
        if self.pending_wish.is_some() {
            return WishRequest::AlreadyLoading;
        }
        let ticket = WishTicket {
            generation: self.generation,
            serial: self.next_serial,
        };
        self.next_serial = self.next_serial.wrapping_add(1);
        self.pending_wish = Some(ticket);
        WishRequest::Issued(ticket)
    }

    /// Deliver the result of a request. Returns false for stale tickets.
    pub fn complete_wish(&mut self, ticket: WishTicket, wish: Wish) -> bool {
        if self.pending_wish != Some(ticket) {
            tracing::debug!(?ticket, "Discarding stale wish");
            return false;
        }
        self.pending_wish = None;
        self.wish = Some(wish);
        true
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn stack_progress(&self) -> StackProgress {
        self.stack_progress
    }

    #[must_use]
    pub fn show_title_overlay(&self) -> bool {
        self.show_title_overlay
    }

    #[must_use]
    pub fn show_wish_overlay(&self) -> bool {
        self.show_wish_overlay
    }

    #[must_use]
    pub fn wish(&self) -> Option<&Wish> {
        self.wish.as_ref()
    }

    #[must_use]
    pub fn wish_loading(&self) -> bool {
        self.pending_wish.is_some()
    }

    /// The layer in flight that has not reported landing yet.
    #[must_use]
    pub fn awaiting_landing(&self) -> Option<u8> {
        if self.phase != Phase::Stacking {
            return None;
        }
        self.stack_progress
            .active_layer()
            .filter(|index| self.landed_through.is_none_or(|landed| landed < *index))
    }

    #[must_use]
    pub fn candle_lit(&self) -> bool {
        self.phase.candle_lit()
    }

    #[must_use]
    pub fn celebration_started_at(&self) -> Option<Duration> {
        self.celebration_started_at
    }

    #[must_use]
    pub fn title_hidden_at(&self) -> Option<Duration> {
        self.title_hidden_at
    }

    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }
}
