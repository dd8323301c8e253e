//! Color theme and glyphs for the Cakewalk TUI.
//!
//! Tailwind pink shades by default with an optional high-contrast override.

use ratatui::style::{Color, Modifier, Style};

use cakewalk_types::{LAYER_COUNT, UiOptions};

/// Pink palette constants.
mod colors {
    use super::Color;

    // === Backgrounds ===
    pub const BG: Color = Color::Rgb(253, 242, 248); // pink-50
    pub const BG_CARD: Color = Color::Rgb(255, 255, 255);
    pub const BG_HINT: Color = Color::Rgb(64, 64, 64);
    pub const BORDER: Color = Color::Rgb(252, 231, 243); // pink-100

    // === Foregrounds ===
    pub const TEXT_PRIMARY: Color = Color::Rgb(31, 41, 55); // gray-800
    pub const TEXT_MUTED: Color = Color::Rgb(156, 163, 175); // gray-400
    pub const TEXT_ON_DARK: Color = Color::Rgb(255, 255, 255);

    // === Brand ===
    pub const PRIMARY: Color = Color::Rgb(219, 39, 119); // pink-600
    pub const ACCENT: Color = Color::Rgb(236, 72, 153); // pink-500

    // === Cake ===
    pub const LAYER_0: Color = Color::Rgb(251, 207, 232); // pink-100
    pub const LAYER_1: Color = Color::Rgb(244, 114, 182); // pink-400
    pub const LAYER_2: Color = Color::Rgb(236, 72, 153); // pink-500
    pub const LAYER_3: Color = Color::Rgb(190, 24, 93); // pink-700
    pub const PLATE: Color = Color::Rgb(229, 231, 235); // gray-200
    pub const CANDLE: Color = Color::Rgb(255, 250, 240);
    pub const WICK: Color = Color::Rgb(51, 51, 51);
    pub const FLAME: Color = Color::Rgb(255, 165, 0);
    pub const FLAME_CORE: Color = Color::Rgb(255, 215, 0);
}

/// Resolved theme palette used by the UI.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg: Color,
    pub bg_card: Color,
    pub bg_hint: Color,
    pub border: Color,
    pub text_primary: Color,
    pub text_muted: Color,
    pub text_on_dark: Color,
    pub primary: Color,
    pub accent: Color,
    pub layers: [Color; LAYER_COUNT as usize],
    pub plate: Color,
    pub candle: Color,
    pub wick: Color,
    pub flame: Color,
    pub flame_core: Color,
    /// Use the confetti's own colors instead of a fixed one.
    pub confetti_rgb: bool,
}

impl Palette {
    #[must_use]
    pub fn standard() -> Self {
        Self {
            bg: colors::BG,
            bg_card: colors::BG_CARD,
            bg_hint: colors::BG_HINT,
            border: colors::BORDER,
            text_primary: colors::TEXT_PRIMARY,
            text_muted: colors::TEXT_MUTED,
            text_on_dark: colors::TEXT_ON_DARK,
            primary: colors::PRIMARY,
            accent: colors::ACCENT,
            layers: [
                colors::LAYER_0,
                colors::LAYER_1,
                colors::LAYER_2,
                colors::LAYER_3,
            ],
            plate: colors::PLATE,
            candle: colors::CANDLE,
            wick: colors::WICK,
            flame: colors::FLAME,
            flame_core: colors::FLAME_CORE,
            confetti_rgb: true,
        }
    }

    #[must_use]
    pub fn high_contrast() -> Self {
        Self {
            bg: Color::Black,
            bg_card: Color::Black,
            bg_hint: Color::Black,
            border: Color::White,
            text_primary: Color::White,
            text_muted: Color::Gray,
            text_on_dark: Color::White,
            primary: Color::LightMagenta,
            accent: Color::Magenta,
            layers: [
                Color::White,
                Color::LightMagenta,
                Color::Magenta,
                Color::Red,
            ],
            plate: Color::Gray,
            candle: Color::White,
            wick: Color::Gray,
            flame: Color::Yellow,
            flame_core: Color::LightYellow,
            confetti_rgb: false,
        }
    }

    /// Color for a confetti piece given as `#RRGGBB`.
    #[must_use]
    pub fn confetti(&self, hex: &str) -> Color {
        if self.confetti_rgb {
            parse_hex(hex).unwrap_or(self.accent)
        } else {
            self.accent
        }
    }
}

#[must_use]
pub fn palette(options: UiOptions) -> Palette {
    if options.high_contrast {
        Palette::high_contrast()
    } else {
        Palette::standard()
    }
}

/// Parse `#RRGGBB` into an RGB color.
#[must_use]
pub fn parse_hex(hex: &str) -> Option<Color> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
    Some(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// ASCII/Unicode glyphs for the cake and its effects.
#[derive(Debug, Clone, Copy)]
pub struct Glyphs {
    pub layer_fill: &'static str,
    pub frosting: &'static str,
    pub plate: &'static str,
    pub candle: &'static str,
    pub wick: &'static str,
    /// Flame from smallest to largest.
    pub flame_frames: &'static [&'static str],
    pub confetti: &'static [&'static str],
    pub cake_icon: &'static str,
    pub sparkle: &'static str,
    pub spinner_frames: &'static [&'static str],
}

const SPINNER_FRAMES: &[&str] = &[
    "⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏",
];
const SPINNER_FRAMES_ASCII: &[&str] = &["|", "/", "-", "\\"];

#[must_use]
pub fn glyphs(options: UiOptions) -> Glyphs {
    if options.ascii_only {
        Glyphs {
            layer_fill: "#",
            frosting: "~",
            plate: "=",
            candle: "|",
            wick: "'",
            flame_frames: &[".", "o", "O"],
            confetti: &["*", "+", "o", "."],
            cake_icon: "(cake)",
            sparkle: "*",
            spinner_frames: SPINNER_FRAMES_ASCII,
        }
    } else {
        Glyphs {
            layer_fill: "█",
            frosting: "▀",
            plate: "▔",
            candle: "┃",
            wick: "╷",
            flame_frames: &["▴", "▲", "♦"],
            confetti: &["▪", "▴", "●", "◆"],
            cake_icon: "🎂",
            sparkle: "✨",
            spinner_frames: SPINNER_FRAMES,
        }
    }
}

/// When `reduced_motion` is enabled, returns a static glyph instead of cycling.
#[must_use]
pub fn spinner_frame(tick: usize, options: UiOptions) -> &'static str {
    let frames = glyphs(options).spinner_frames;
    if options.reduced_motion {
        frames[0]
    } else {
        frames[tick % frames.len()]
    }
}

/// Flame glyph for a flicker scale around `1.0`.
#[must_use]
pub fn flame_frame(glyphs: &Glyphs, scale: f32) -> &'static str {
    let frames = glyphs.flame_frames;
    let index = if scale < 0.95 {
        0
    } else if scale <= 1.05 {
        1
    } else {
        2
    };
    frames[index.min(frames.len() - 1)]
}

/// Pre-defined styles for common UI elements.
pub mod styles {
    use super::{Modifier, Palette, Style};

    #[must_use]
    pub fn heading(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.primary)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn button(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.text_on_dark)
            .bg(palette.accent)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn key_hint(palette: &Palette) -> Style {
        Style::default().fg(palette.text_muted)
    }

    #[must_use]
    pub fn hint_pill(palette: &Palette) -> Style {
        Style::default().fg(palette.text_on_dark).bg(palette.bg_hint)
    }

    #[must_use]
    pub fn wish_text(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.text_primary)
            .add_modifier(Modifier::ITALIC)
    }

    #[must_use]
    pub fn link(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.accent)
            .add_modifier(Modifier::UNDERLINED)
    }
}
