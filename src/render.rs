//! Drawing surface the game states paint onto
//!
//! Coordinates are terminal cells. States only ever see `RenderTarget`; the
//! terminal front end implements it on a ratatui frame, and tests record the
//! calls instead.

/// Surface size in cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: u16,
    pub height: u16,
}

impl Size {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }

    pub fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Shrink by `dx` on the left and right and `dy` on the top and bottom
    pub fn inset(&self, dx: u16, dy: u16) -> Rect {
        Rect {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
            width: self.width.saturating_sub(dx * 2),
            height: self.height.saturating_sub(dy * 2),
        }
    }

    /// `n` equal columns; the last one absorbs the remainder
    pub fn columns(&self, n: u16) -> Vec<Rect> {
        if n == 0 {
            return Vec::new();
        }
        let width = self.width / n;
        (0..n)
            .map(|i| {
                let x = self.x + i * width;
                let w = if i + 1 == n { self.right() - x } else { width };
                Rect::new(x, self.y, w, self.height)
            })
            .collect()
    }

    /// `n` equal rows; the last one absorbs the remainder
    pub fn rows(&self, n: u16) -> Vec<Rect> {
        if n == 0 {
            return Vec::new();
        }
        let height = self.height / n;
        (0..n)
            .map(|i| {
                let y = self.y + i * height;
                let h = if i + 1 == n { self.bottom() - y } else { height };
                Rect::new(self.x, y, self.width, h)
            })
            .collect()
    }

    /// Split off `height` rows at the bottom: (rest, bottom)
    pub fn split_bottom(&self, height: u16) -> (Rect, Rect) {
        let height = height.min(self.height);
        let top = Rect::new(self.x, self.y, self.width, self.height - height);
        let bottom = Rect::new(self.x, top.bottom(), self.width, height);
        (top, bottom)
    }

    /// Split off `height` rows at the top: (top, rest)
    pub fn split_top(&self, height: u16) -> (Rect, Rect) {
        let height = height.min(self.height);
        let top = Rect::new(self.x, self.y, self.width, height);
        let rest = Rect::new(self.x, top.bottom(), self.width, self.height - height);
        (top, rest)
    }

    /// A `width` x `height` box centred in this one
    pub fn centered(&self, width: u16, height: u16) -> Rect {
        let width = width.min(self.width);
        let height = height.min(self.height);
        Rect::new(
            self.x + (self.width - width) / 2,
            self.y + (self.height - height) / 2,
            width,
            height,
        )
    }
}

/// The game's palette
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Black,
    /// Board blue
    Board,
    Gold,
    White,
    Gray,
    Red,
    Green,
}

pub trait RenderTarget {
    fn size(&self) -> Size;
    fn clear(&mut self, color: Color);
    fn fill_rect(&mut self, area: Rect, color: Color);
    fn outline_rect(&mut self, area: Rect, color: Color);
    /// Wrap `text` to the width of `area` and centre it both ways
    fn draw_text(&mut self, area: Rect, text: &str, color: Color);
    /// One left-aligned line, clipped to the surface
    fn draw_line(&mut self, x: u16, y: u16, text: &str, color: Color);
}

/// Greedy word wrap; words longer than `width` are split
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return Vec::new();
    }
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > width {
                if !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                }
                lines.push(word.drain(..width).collect());
            }
            let word: String = word.into_iter().collect();
            let needed = if line.is_empty() {
                word.chars().count()
            } else {
                line.chars().count() + 1 + word.chars().count()
            };
            if needed > width && !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(&word);
        }
        lines.push(line);
    }
    while lines.last().is_some_and(|l| l.is_empty()) && lines.len() > 1 {
        lines.pop();
    }
    lines
}

/// A drawing call captured by `RecordingTarget`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOp {
    Clear(Color),
    Fill(Rect, Color),
    Outline(Rect, Color),
    Text(Rect, String, Color),
    Line(u16, u16, String, Color),
}

/// Records draw calls for inspection in tests
#[derive(Debug, Clone, Default)]
pub struct RecordingTarget {
    size: Size,
    pub ops: Vec<DrawOp>,
}

impl RecordingTarget {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            size: Size::new(width, height),
            ops: Vec::new(),
        }
    }

    /// Every string drawn, in order
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text(_, text, _) | DrawOp::Line(_, _, text, _) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn shows(&self, needle: &str) -> bool {
        self.texts().iter().any(|t| t.contains(needle))
    }
}

impl RenderTarget for RecordingTarget {
    fn size(&self) -> Size {
        self.size
    }

    fn clear(&mut self, color: Color) {
        self.ops.clear();
        self.ops.push(DrawOp::Clear(color));
    }

    fn fill_rect(&mut self, area: Rect, color: Color) {
        self.ops.push(DrawOp::Fill(area, color));
    }

    fn outline_rect(&mut self, area: Rect, color: Color) {
        self.ops.push(DrawOp::Outline(area, color));
    }

    fn draw_text(&mut self, area: Rect, text: &str, color: Color) {
        self.ops.push(DrawOp::Text(area, text.to_string(), color));
    }

    fn draw_line(&mut self, x: u16, y: u16, text: &str, color: Color) {
        self.ops.push(DrawOp::Line(x, y, text.to_string(), color));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_cover_width() {
        let cols = Rect::new(2, 0, 80, 10).columns(6);
        assert_eq!(cols.len(), 6);
        assert_eq!(cols[0].x, 2);
        assert_eq!(cols[5].right(), 82);
        assert!(cols.windows(2).all(|w| w[0].right() == w[1].x));
    }

    #[test]
    fn test_rows_cover_height() {
        let rows = Rect::new(0, 3, 10, 23).rows(5);
        assert_eq!(rows[0].y, 3);
        assert_eq!(rows[4].bottom(), 26);
    }

    #[test]
    fn test_contains() {
        let r = Rect::new(10, 5, 4, 2);
        assert!(r.contains(10, 5));
        assert!(r.contains(13, 6));
        assert!(!r.contains(14, 6));
        assert!(!r.contains(9, 5));
    }

    #[test]
    fn test_split_and_center() {
        let area = Size::new(80, 24).area();
        let (top, bottom) = area.split_bottom(3);
        assert_eq!(top.height, 21);
        assert_eq!(bottom.y, 21);
        let boxed = area.centered(20, 4);
        assert_eq!(boxed, Rect::new(30, 10, 20, 4));
        assert_eq!(area.centered(200, 100), area);
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("the quick brown fox", 10), vec!["the quick", "brown fox"]);
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap("one\ntwo", 20), vec!["one", "two"]);
        assert!(wrap("anything", 0).is_empty());
    }

    #[test]
    fn test_recording_target() {
        let mut target = RecordingTarget::new(80, 24);
        target.draw_text(Rect::new(0, 0, 10, 1), "$200", Color::Gold);
        target.clear(Color::Board);
        target.draw_line(0, 0, "HISTORY", Color::White);
        assert!(target.shows("HISTORY"));
        assert!(!target.shows("$200"));
    }
}
