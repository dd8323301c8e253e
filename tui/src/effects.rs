//! Overlay motion for the title and wish cards.

use ratatui::layout::Rect;

use cakewalk_engine::effects::ease_out_cubic;

/// Grow the title card from half size as it fades in, shrink it as it fades out.
#[must_use]
pub fn pop_scale(base: Rect, opacity: f32) -> Rect {
    let t = ease_out_cubic(opacity);
    scale_rect(base, 0.5 + 0.5 * t)
}

/// Slide a card up into its resting place as `progress` goes from 0 to 1.
#[must_use]
pub fn slide_up(base: Rect, viewport: Rect, progress: f32) -> Rect {
    let t = ease_out_cubic(progress);
    let viewport_bottom = viewport.y.saturating_add(viewport.height);
    let base_bottom = base.y.saturating_add(base.height);
    let max_offset = viewport_bottom.saturating_sub(base_bottom);
    let offset = max_offset.min(base.height.saturating_div(2)).min(6);
    let y_offset = ((1.0 - t) * f32::from(offset)).round() as u16;
    Rect {
        y: base.y.saturating_add(y_offset),
        ..base
    }
}

fn scale_rect(base: Rect, scale: f32) -> Rect {
    let width = (f32::from(base.width) * scale).round() as u16;
    let height = (f32::from(base.height) * scale).round() as u16;
    let width = width.max(1).min(base.width);
    let height = height.max(1).min(base.height);
    let x = base.x + (base.width.saturating_sub(width) / 2);
    let y = base.y + (base.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}
