//! Core domain types for Cakewalk.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory
#![allow(clippy::missing_panics_doc)] // Panics are documented in assertions

mod ui;
pub use ui::UiOptions;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ============================================================================
// NonEmpty String Types
// ============================================================================

/// A string guaranteed to be non-empty (after trimming).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NonEmptyString(String);

#[derive(Debug, Error)]
#[error("text must not be empty")]
pub struct EmptyStringError;

impl NonEmptyString {
    pub fn new(value: impl Into<String>) -> Result<Self, EmptyStringError> {
        let value = value.into();
        if value.trim().is_empty() {
            Err(EmptyStringError)
        } else {
            Ok(Self(value))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for NonEmptyString {
    type Error = EmptyStringError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// A compile-time checked non-empty static string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NonEmptyStaticStr(&'static str);

impl NonEmptyStaticStr {
    #[must_use]
    pub const fn new(value: &'static str) -> Self {
        assert!(!value.is_empty(), "NonEmptyStaticStr must not be empty");
        Self(value)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

// ============================================================================
// Celebration Phase
// ============================================================================

/// One discrete step of the celebration sequence.
///
/// Phases only move forward in declaration order. The only way back to
/// [`Phase::Initial`] is a full session reset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    #[default]
    Initial,
    Stacking,
    ReadyToLight,
    Celebrating,
    Finished,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::Initial,
        Phase::Stacking,
        Phase::ReadyToLight,
        Phase::Celebrating,
        Phase::Finished,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Phase::Initial => "initial",
            Phase::Stacking => "stacking",
            Phase::ReadyToLight => "ready_to_light",
            Phase::Celebrating => "celebrating",
            Phase::Finished => "finished",
        }
    }

    /// The phase that directly follows this one, if any.
    #[must_use]
    pub const fn next(self) -> Option<Phase> {
        match self {
            Phase::Initial => Some(Phase::Stacking),
            Phase::Stacking => Some(Phase::ReadyToLight),
            Phase::ReadyToLight => Some(Phase::Celebrating),
            Phase::Celebrating => Some(Phase::Finished),
            Phase::Finished => None,
        }
    }

    /// Whether the candle flame is burning in this phase.
    #[must_use]
    pub const fn candle_lit(self) -> bool {
        matches!(self, Phase::Celebrating | Phase::Finished)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Stack Progress
// ============================================================================

/// Number of cake layers dropped before the candle slot.
pub const LAYER_COUNT: u8 = 4;

/// How far the cake has been assembled.
///
/// `EMPTY` means no layer has been placed (`-1` in numeric form). Steps
/// `0..LAYER_COUNT` name the layer currently in flight, and step
/// `LAYER_COUNT` means every layer landed and the candle slot is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct StackProgress(Option<u8>);

impl StackProgress {
    pub const EMPTY: Self = Self(None);
    pub const FIRST_LAYER: Self = Self(Some(0));
    pub const CANDLE: Self = Self(Some(LAYER_COUNT));

    /// Build a progress value from a step in `0..=LAYER_COUNT`.
    #[must_use]
    pub const fn new(step: u8) -> Option<Self> {
        if step <= LAYER_COUNT {
            Some(Self(Some(step)))
        } else {
            None
        }
    }

    /// Numeric form: `-1` for empty, otherwise the step.
    #[must_use]
    pub fn as_i8(self) -> i8 {
        self.0.map_or(-1, |step| step as i8)
    }

    /// The layer currently falling, if a layer (not the candle) is active.
    #[must_use]
    pub fn active_layer(self) -> Option<u8> {
        self.0.filter(|step| *step < LAYER_COUNT)
    }

    /// Advance by one step, saturating at the candle slot.
    #[must_use]
    pub fn next(self) -> Self {
        match self.0 {
            None => Self::FIRST_LAYER,
            Some(step) if step < LAYER_COUNT => Self(Some(step + 1)),
            Some(_) => Self::CANDLE,
        }
    }

    #[must_use]
    pub fn layer_visible(self, index: u8) -> bool {
        self.0.is_some_and(|step| step >= index)
    }

    #[must_use]
    pub fn candle_visible(self) -> bool {
        self == Self::CANDLE
    }
}

impl fmt::Display for StackProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i8())
    }
}

// ============================================================================
// Wish
// ============================================================================

/// A short celebratory message shown at the end of the sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wish(NonEmptyString);

impl Wish {
    /// Returned by the wish provider whenever the backend fails.
    pub const FALLBACK: NonEmptyStaticStr =
        NonEmptyStaticStr::new("Wishing you a day filled with laughter and joy!");

    /// Shown while the wish card is open but no wish has arrived.
    pub const PLACEHOLDER: NonEmptyStaticStr =
        NonEmptyStaticStr::new("May your day be as sweet as this cake!");

    /// Build a wish from generated text. Surrounding whitespace is dropped.
    pub fn new(text: impl AsRef<str>) -> Result<Self, EmptyStringError> {
        NonEmptyString::new(text.as_ref().trim()).map(Self)
    }

    #[must_use]
    pub fn fallback() -> Self {
        Self(NonEmptyString(Self::FALLBACK.as_str().to_owned()))
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.as_str() == Self::FALLBACK.as_str()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Wish {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// API Key
// ============================================================================

/// Credential for the generative-text backend.
///
/// `Debug` is manually implemented to redact the key value, preventing accidental
/// credential disclosure in logs or error messages.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(value: impl Into<String>) -> Result<Self, EmptyStringError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            Err(EmptyStringError)
        } else {
            Ok(Self(trimmed.to_owned()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey(<redacted>)")
    }
}
