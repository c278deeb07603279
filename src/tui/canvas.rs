//! The game's drawing calls onto a ratatui buffer

use crate::render::{self, wrap, RenderTarget, Size};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Widget};

fn palette(color: render::Color) -> Color {
    match color {
        render::Color::Black => Color::Black,
        render::Color::Board => Color::Blue,
        render::Color::Gold => Color::Yellow,
        render::Color::White => Color::White,
        render::Color::Gray => Color::DarkGray,
        render::Color::Red => Color::Red,
        render::Color::Green => Color::Green,
    }
}

/// Draws onto one frame's buffer
pub struct Canvas<'a> {
    buf: &'a mut Buffer,
}

impl<'a> Canvas<'a> {
    pub fn new(buf: &'a mut Buffer) -> Self {
        Self { buf }
    }

    /// `area` clipped to the buffer
    fn clip(&self, area: render::Rect) -> Rect {
        Rect::new(area.x, area.y, area.width, area.height).intersection(self.buf.area)
    }

    fn paint(&mut self, area: Rect, color: Color) {
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                if let Some(cell) = self.buf.cell_mut((x, y)) {
                    cell.set_symbol(" ").set_bg(color);
                }
            }
        }
    }
}

impl RenderTarget for Canvas<'_> {
    fn size(&self) -> Size {
        Size::new(self.buf.area.width, self.buf.area.height)
    }

    fn clear(&mut self, color: render::Color) {
        let area = self.buf.area;
        self.paint(area, palette(color));
    }

    fn fill_rect(&mut self, area: render::Rect, color: render::Color) {
        let area = self.clip(area);
        self.paint(area, palette(color));
    }

    fn outline_rect(&mut self, area: render::Rect, color: render::Color) {
        let area = self.clip(area);
        if area.width < 2 || area.height < 2 {
            return;
        }
        Block::bordered()
            .border_style(Style::default().fg(palette(color)))
            .render(area, self.buf);
    }

    fn draw_text(&mut self, area: render::Rect, text: &str, color: render::Color) {
        let area = self.clip(area);
        if area.is_empty() {
            return;
        }
        let lines = wrap(text, area.width as usize);
        let shown = lines.len().min(area.height as usize);
        let top = area.y + (area.height - shown as u16) / 2;
        let style = Style::default().fg(palette(color));
        for (i, line) in lines.iter().take(shown).enumerate() {
            let len = line.chars().count().min(area.width as usize) as u16;
            let x = area.x + (area.width - len) / 2;
            self.buf.set_stringn(x, top + i as u16, line, area.width as usize, style);
        }
    }

    fn draw_line(&mut self, x: u16, y: u16, text: &str, color: render::Color) {
        let bounds = self.buf.area;
        if x >= bounds.right() || y >= bounds.bottom() {
            return;
        }
        let room = (bounds.right() - x) as usize;
        self.buf.set_stringn(x, y, text, room, Style::default().fg(palette(color)));
    }
}
