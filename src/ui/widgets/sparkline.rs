//! Price sparkline widget for inline visualization
//!
//! Values are scaled between the series min and max, so small moves stay
//! visible. When there are more values than columns, the most recent ones are
//! drawn.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Block characters for different levels (8 levels)
const BLOCKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// A one-row sparkline of prices
pub struct PriceSparkline<'a> {
    values: &'a [f64],
    min: f64,
    max: f64,
    style: Style,
    /// Style for the last (most recent) value
    marker_style: Style,
}

impl<'a> PriceSparkline<'a> {
    pub fn new(values: &'a [f64]) -> Self {
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Self {
            values,
            min,
            max,
            style: Style::default().fg(Color::Cyan),
            marker_style: Style::default().fg(Color::Yellow),
        }
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    fn value_to_block(&self, value: f64) -> char {
        let range = self.max - self.min;
        if !range.is_finite() || range <= 0.0 {
            // Flat series
            return BLOCKS[3];
        }
        let normalized = ((value - self.min) / range).clamp(0.0, 1.0);
        let index = ((normalized * 7.0).round() as usize).min(7);
        BLOCKS[index]
    }
}

impl<'a> Widget for PriceSparkline<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 || self.values.is_empty() {
            return;
        }

        let width = area.width as usize;
        let start = self.values.len().saturating_sub(width);
        let visible = &self.values[start..];
        let last = visible.len() - 1;

        for (i, value) in visible.iter().enumerate() {
            let style = if i == last {
                self.marker_style
            } else {
                self.style
            };

            if let Some(cell) = buf.cell_mut((area.x + i as u16, area.y)) {
                cell.set_char(self.value_to_block(*value)).set_style(style);
            }
        }
    }
}
