//! Animation curves for the render layer.
//!
//! Everything here is a pure function of elapsed time. Renderers call these
//! every frame; nothing feeds back into the session.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// How long confetti keeps being emitted after the candle is lit.
pub const CONFETTI_DURATION: Duration = Duration::from_millis(3000);
/// Gap between two emissions of the burst pair.
pub const CONFETTI_EMIT_INTERVAL: Duration = Duration::from_millis(50);
/// How long a single particle stays on screen.
pub const CONFETTI_LIFETIME: Duration = Duration::from_millis(1500);
pub const CONFETTI_COLORS: [&str; 4] = ["#F9A8D4", "#F472B6", "#EC4899", "#FFD700"];

/// Height above its resting place at which a layer starts falling.
pub const DROP_HEIGHT: f32 = 10.0;
pub const LAYER_FALL_DURATION: Duration = Duration::from_millis(700);
pub const TITLE_FADE_IN: Duration = Duration::from_millis(400);
pub const WISH_CARD_SLIDE_IN: Duration = Duration::from_millis(600);

// Vertical origin of every burst, as a fraction of the screen height from the top.
const BURST_ORIGIN_Y: f32 = 0.5;
// Screen heights per second squared.
const GRAVITY: f32 = 1.2;

pub(crate) fn normalized_progress(elapsed: Duration, duration: Duration) -> f32 {
    if duration.is_zero() {
        return 1.0;
    }

    let elapsed = elapsed.as_secs_f32();
    let total = duration.as_secs_f32();
    (elapsed / total).clamp(0.0, 1.0)
}

#[must_use]
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

#[must_use]
pub fn ease_in_quad(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t
}

/// Opacity of something that started appearing `elapsed` ago.
#[must_use]
pub fn fade_in(elapsed: Duration, duration: Duration) -> f32 {
    ease_out_cubic(normalized_progress(elapsed, duration))
}

/// Opacity of something that started disappearing `elapsed` ago.
#[must_use]
pub fn fade_out(elapsed: Duration, duration: Duration) -> f32 {
    1.0 - ease_out_cubic(normalized_progress(elapsed, duration))
}

/// One side of the confetti cannon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Burst {
    /// Horizontal origin, `0.0` is the left edge and `1.0` the right edge.
    pub origin_x: f32,
    /// Launch direction in degrees, counter-clockwise from the positive x axis.
    pub angle_deg: f32,
    pub spread_deg: f32,
    pub particle_count: u8,
    pub colors: &'static [&'static str],
}

impl Burst {
    pub const LEFT: Self = Self {
        origin_x: 0.0,
        angle_deg: 60.0,
        spread_deg: 55.0,
        particle_count: 5,
        colors: &CONFETTI_COLORS,
    };
    pub const RIGHT: Self = Self {
        origin_x: 1.0,
        angle_deg: 120.0,
        spread_deg: 55.0,
        particle_count: 5,
        colors: &CONFETTI_COLORS,
    };
}

/// The burst pair to emit at `elapsed` since the candle was lit, or `None`
/// once the confetti window has closed.
#[must_use]
pub fn confetti_bursts(elapsed: Duration) -> Option<[Burst; 2]> {
    (elapsed < CONFETTI_DURATION).then_some([Burst::LEFT, Burst::RIGHT])
}

/// A single confetti piece in normalized screen space (`y` grows downward).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfettiParticle {
    pub x: f32,
    pub y: f32,
    pub color: &'static str,
    /// Fraction of the particle's lifetime already spent, in `0.0..1.0`.
    pub age: f32,
}

impl ConfettiParticle {
    #[must_use]
    pub fn on_screen(&self) -> bool {
        (0.0..=1.0).contains(&self.x) && (0.0..=1.0).contains(&self.y)
    }
}

/// Per-particle generator, seeded so every frame recomputes the same particle.
fn particle_rng(wave: u64, index: u8) -> StdRng {
    StdRng::seed_from_u64((wave << 8) | u64::from(index))
}

/// Every particle alive at `elapsed` since the candle was lit.
///
/// Emission waves repeat every [`CONFETTI_EMIT_INTERVAL`] while
/// [`confetti_bursts`] is active. The same seed drives both sides, so the
/// right burst is an exact mirror of the left one.
#[must_use]
pub fn confetti_particles(elapsed: Duration) -> Vec<ConfettiParticle> {
    let interval = CONFETTI_EMIT_INTERVAL.as_millis() as u64;
    let elapsed_ms = elapsed.as_millis() as u64;
    let last_wave = elapsed_ms.min(CONFETTI_DURATION.as_millis() as u64 - 1) / interval;
    let lifetime_ms = CONFETTI_LIFETIME.as_millis() as u64;

    let mut particles = Vec::new();
    for wave in 0..=last_wave {
        let emitted_at = wave * interval;
        let Some(age_ms) = elapsed_ms.checked_sub(emitted_at) else {
            continue;
        };
        if age_ms >= lifetime_ms {
            continue;
        }
        let age_secs = age_ms as f32 / 1000.0;
        let age = age_ms as f32 / lifetime_ms as f32;

        for index in 0..Burst::LEFT.particle_count {
            let mut rng = particle_rng(wave, index);
            let left = Burst::LEFT;
            let jitter = rng.random_range(-0.5_f32..0.5) * left.spread_deg;
            let angle = (left.angle_deg + jitter).to_radians();
            let speed = rng.random_range(0.5_f32..1.0);
            let color = left.colors[rng.random_range(0..left.colors.len())];

            let dx = angle.cos() * speed * age_secs;
            let y = BURST_ORIGIN_Y - angle.sin() * speed * age_secs
                + 0.5 * GRAVITY * age_secs * age_secs;

            particles.push(ConfettiParticle {
                x: left.origin_x + dx,
                y,
                color,
                age,
            });
            particles.push(ConfettiParticle {
                x: Burst::RIGHT.origin_x - dx,
                y,
                color,
                age,
            });
        }
    }
    particles
}

/// Candle flame scale at `t` since the session clock started.
#[must_use]
pub fn flame_scale(t: Duration) -> f32 {
    let t = t.as_secs_f32();
    1.0 + (t * 10.0).sin() * 0.1 + (t * 25.0).cos() * 0.1
}

/// Position of a falling layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerDrop {
    /// Distance above the resting place, `0.0` once landed.
    pub height: f32,
    pub landed: bool,
}

/// Where a layer is `elapsed` after it became active.
#[must_use]
pub fn layer_drop(elapsed: Duration) -> LayerDrop {
    let fallen = ease_in_quad(normalized_progress(elapsed, LAYER_FALL_DURATION));
    let landed = elapsed >= LAYER_FALL_DURATION;
    LayerDrop {
        height: if landed { 0.0 } else { DROP_HEIGHT * (1.0 - fallen) },
        landed,
    }
}
