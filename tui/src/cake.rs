//! The cake scene: plate, layers, candle and confetti.

use ratatui::{
    Frame,
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
};
use unicode_width::UnicodeWidthStr;

use cakewalk_engine::{App, LAYER_COUNT, Phase, effects::DROP_HEIGHT};

use crate::theme::{Glyphs, Palette, flame_frame};

/// Rows per cake layer.
pub(crate) const LAYER_ROWS: u16 = 2;
/// Layer radii from bottom to top; widths scale relative to the first.
const LAYER_RADII: [f32; LAYER_COUNT as usize] = [2.5, 2.0, 1.5, 1.0];
const MAX_CAKE_WIDTH: u16 = 44;
const MIN_LAYER_WIDTH: u16 = 4;
const CANDLE_ROWS: u16 = 2;

/// Rows the resting cake needs: plate, layers, candle, wick and flame.
pub(crate) const CAKE_ROWS: u16 = 1 + LAYER_COUNT as u16 * LAYER_ROWS + CANDLE_ROWS + 2;

/// Where the layers go for a given scene area.
#[derive(Debug, Clone, Copy)]
struct CakeGeometry {
    area: Rect,
    plate_row: u16,
    max_width: u16,
}

impl CakeGeometry {
    fn new(area: Rect) -> Self {
        Self {
            area,
            plate_row: area.bottom().saturating_sub(1),
            max_width: area.width.saturating_sub(4).min(MAX_CAKE_WIDTH),
        }
    }

    /// Top row of layer `index` once it rests on the stack.
    fn rest_row(&self, index: u8) -> u16 {
        self.plate_row
            .saturating_sub((u16::from(index) + 1) * LAYER_ROWS)
    }

    fn layer_width(&self, index: u8) -> u16 {
        let ratio = LAYER_RADII[usize::from(index)] / LAYER_RADII[0];
        ((f32::from(self.max_width) * ratio).round() as u16).max(MIN_LAYER_WIDTH)
    }

    fn centered_x(&self, width: u16) -> u16 {
        self.area.x + self.area.width.saturating_sub(width) / 2
    }

    /// Top row of a falling layer `height` units above its rest row.
    fn falling_row(&self, index: u8, height: f32) -> u16 {
        let rest = self.rest_row(index);
        let rows_above = rest.saturating_sub(self.area.y);
        let offset = (height / DROP_HEIGHT * f32::from(rows_above)).round() as u16;
        rest.saturating_sub(offset.min(rows_above))
    }

    fn contains_row(&self, row: u16) -> bool {
        row >= self.area.y && row < self.area.bottom()
    }
}

pub(crate) fn draw_cake(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    if area.width < MIN_LAYER_WIDTH || area.height < 3 {
        return;
    }
    let geometry = CakeGeometry::new(area);
    let buf = frame.buffer_mut();
    let session = app.session();
    let progress = session.stack_progress();

    let plate_width = geometry.max_width.saturating_add(4).min(area.width);
    put(
        buf,
        &geometry,
        geometry.centered_x(plate_width),
        geometry.plate_row,
        &glyphs.plate.repeat(usize::from(plate_width)),
        Style::default().fg(palette.plate),
    );

    let falling = app.active_layer_drop();
    for index in 0..LAYER_COUNT {
        if !progress.layer_visible(index) {
            continue;
        }
        let top = match falling {
            Some((active, drop)) if active == index => geometry.falling_row(index, drop.height),
            _ => geometry.rest_row(index),
        };
        draw_layer(buf, &geometry, index, top, palette, glyphs);
    }

    if progress.candle_visible() {
        draw_candle(buf, &geometry, app, palette, glyphs);
    }
}

fn draw_layer(
    buf: &mut Buffer,
    geometry: &CakeGeometry,
    index: u8,
    top: u16,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let width = geometry.layer_width(index);
    let x = geometry.centered_x(width);
    let color = palette.layers[usize::from(index)];
    let style = Style::default().fg(color);
    let frosting = glyphs.frosting.repeat(usize::from(width));
    put(buf, geometry, x, top, &frosting, style);
    for row in 1..LAYER_ROWS {
        put(
            buf,
            geometry,
            x,
            top + row,
            &glyphs.layer_fill.repeat(usize::from(width)),
            style,
        );
    }
}

fn draw_candle(
    buf: &mut Buffer,
    geometry: &CakeGeometry,
    app: &App,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let cake_top = geometry.rest_row(LAYER_COUNT - 1);
    let x = geometry.centered_x(1);
    let candle_style = Style::default()
        .fg(palette.candle)
        .add_modifier(Modifier::BOLD);
    for row in 1..=CANDLE_ROWS {
        let y = cake_top.saturating_sub(row);
        put(buf, geometry, x, y, glyphs.candle, candle_style);
    }
    let wick_row = cake_top.saturating_sub(CANDLE_ROWS + 1);
    let wick_style = Style::default().fg(palette.wick);
    put(buf, geometry, x, wick_row, glyphs.wick, wick_style);

    let label_row = wick_row.saturating_sub(1);
    if app.session().candle_lit() {
        let flame = flame_frame(glyphs, app.flame_scale());
        let flame_style = Style::default()
            .fg(palette.flame)
            .bg(palette.bg)
            .add_modifier(Modifier::BOLD);
        put(buf, geometry, x, label_row, flame, flame_style);
        if app.flame_scale() > 1.1 {
            let sparkle_style = Style::default().fg(palette.flame_core);
            put(buf, geometry, x, wick_row, glyphs.sparkle, sparkle_style);
        }
    } else if app.phase() == Phase::ReadyToLight {
        let label = "Click Me!";
        let label_x = geometry.centered_x(label.width() as u16);
        put(
            buf,
            geometry,
            label_x,
            label_row,
            label,
            Style::default().fg(palette.text_primary),
        );
    }
}

pub(crate) fn draw_confetti(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    if area.width < 2 || area.height < 2 {
        return;
    }
    let buf = frame.buffer_mut();
    let span_x = f32::from(area.width - 1);
    let span_y = f32::from(area.height - 1);
    for (index, particle) in app.confetti().iter().enumerate() {
        if !particle.on_screen() {
            continue;
        }
        let col = area.x + (particle.x * span_x).round() as u16;
        let row = area.y + (particle.y * span_y).round() as u16;
        let glyph = glyphs.confetti[index / 2 % glyphs.confetti.len()];
        let mut style = Style::default().fg(palette.confetti(particle.color));
        if particle.age > 0.75 {
            style = style.add_modifier(Modifier::DIM);
        }
        buf.set_string(col, row, glyph, style);
    }
}

fn put(buf: &mut Buffer, geometry: &CakeGeometry, x: u16, y: u16, text: &str, style: Style) {
    if geometry.contains_row(y) {
        buf.set_string(x, y, text, style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layers_narrow_toward_the_top() {
        let geometry = CakeGeometry::new(Rect::new(0, 0, 60, 20));
        let widths: Vec<u16> = (0..LAYER_COUNT).map(|i| geometry.layer_width(i)).collect();
        assert_eq!(widths[0], MAX_CAKE_WIDTH);
        assert!(widths.windows(2).all(|pair| pair[0] > pair[1]));
    }

    #[test]
    fn layers_stack_upward_from_the_plate() {
        let geometry = CakeGeometry::new(Rect::new(0, 0, 60, 20));
        assert_eq!(geometry.plate_row, 19);
        assert_eq!(geometry.rest_row(0), 17);
        assert_eq!(geometry.rest_row(3), 11);
    }

    #[test]
    fn falling_layer_starts_at_scene_top() {
        let geometry = CakeGeometry::new(Rect::new(0, 2, 60, 20));
        assert_eq!(geometry.falling_row(0, DROP_HEIGHT), 2);
        assert_eq!(geometry.falling_row(0, 0.0), geometry.rest_row(0));
    }

    #[test]
    fn narrow_area_keeps_minimum_width() {
        let geometry = CakeGeometry::new(Rect::new(0, 0, 6, 20));
        assert_eq!(geometry.layer_width(3), MIN_LAYER_WIDTH);
    }
}
