//! Layout of the sample text on screen.
//!
//! Two strategies share one per-character styling rule: typed positions are
//! drawn as the *expected* character, green when the typed one matched and red
//! when it did not, and everything from the cursor onwards is dimmed. The
//! viewport is whatever area the caller hands in for the current frame.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
};

use crate::session::{Layout, Session, SessionConfig};

/// Shown in place of an expected whitespace character that was mistyped
const MISSED_WHITESPACE: char = '·';

/// Visual class of one sample position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Correct,
    Error,
    Cursor,
    Untyped,
}

impl CharClass {
    pub fn style(&self) -> Style {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_bold_style = bold_style.add_modifier(Modifier::DIM);

        match self {
            CharClass::Correct => bold_style.fg(Color::Green),
            CharClass::Error => bold_style.fg(Color::Red),
            CharClass::Cursor => dim_bold_style.add_modifier(Modifier::UNDERLINED),
            CharClass::Untyped => dim_bold_style,
        }
    }
}

/// The glyph and class drawn for sample position `idx`.
/// Mistakes show what should have been typed, never what was.
pub fn styled_char(session: &Session, idx: usize) -> (char, CharClass) {
    let expected = session.sample()[idx];
    let cursor = session.cursor();

    if idx < cursor {
        if session.is_correct_at(idx) {
            (expected, CharClass::Correct)
        } else if expected.is_whitespace() {
            (MISSED_WHITESPACE, CharClass::Error)
        } else {
            (display_char(expected), CharClass::Error)
        }
    } else if idx == cursor {
        (display_char(expected), CharClass::Cursor)
    } else {
        (display_char(expected), CharClass::Untyped)
    }
}

fn display_char(c: char) -> char {
    if c.is_control() {
        ' '
    } else {
        c
    }
}

fn put(buf: &mut Buffer, x: u16, y: u16, (c, class): (char, CharClass)) {
    if let Some(cell) = buf.cell_mut((x, y)) {
        cell.set_char(c);
        cell.set_style(class.style());
    }
}

/// A layout algorithm from sample positions to screen cells
pub trait RenderStrategy {
    /// Rows this strategy wants for `session` at `width` columns
    fn rows(&self, session: &Session, width: u16) -> u16;

    fn render(&self, session: &Session, area: Rect, buf: &mut Buffer);
}

/// Pick the strategy for a session; fixed for its lifetime
pub fn strategy_for(config: &SessionConfig) -> Box<dyn RenderStrategy> {
    match config.layout {
        Layout::Scrolled => Box::new(RenderScrolled::new(config.look_ahead)),
        Layout::Wrapped => Box::new(RenderWrapped),
    }
}

/// Horizontal offset that keeps the cursor `margin` columns clear of the right edge
pub fn scroll_offset(cursor: usize, width: usize, margin: usize) -> usize {
    if cursor + margin < width {
        0
    } else {
        cursor + margin + 1 - width
    }
}

/// The slice of the sample visible on the single scrolled row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollWindow {
    pub offset: usize,
    pub typed_len: usize,
    pub untyped_len: usize,
}

impl ScrollWindow {
    /// `margin` is capped at `width - 1` so the cursor column always fits
    pub fn new(cursor: usize, total: usize, width: usize, margin: usize) -> Self {
        let margin = margin.min(width.saturating_sub(1));
        let offset = scroll_offset(cursor, width, margin).min(total);
        let visible = (total - offset).min(width);
        let typed_len = cursor.saturating_sub(offset).min(visible);

        Self {
            offset,
            typed_len,
            untyped_len: visible - typed_len,
        }
    }

    pub fn visible(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.typed_len + self.untyped_len
    }
}

/// One row, scrolled so the cursor keeps `look_ahead` characters of context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderScrolled {
    look_ahead: u16,
}

impl RenderScrolled {
    pub fn new(look_ahead: u16) -> Self {
        Self { look_ahead }
    }
}

impl RenderStrategy for RenderScrolled {
    fn rows(&self, _session: &Session, _width: u16) -> u16 {
        1
    }

    fn render(&self, session: &Session, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }

        let window = ScrollWindow::new(
            session.cursor(),
            session.total_chars(),
            area.width as usize,
            self.look_ahead as usize,
        );

        for (col, idx) in window.visible().enumerate() {
            put(buf, area.x + col as u16, area.y, styled_char(session, idx));
        }
    }
}

/// Row and column of position `idx` when wrapping at `width` columns
pub fn wrap_position(idx: usize, width: usize) -> Option<(usize, usize)> {
    if width == 0 {
        return None;
    }

    Some((idx / width, idx % width))
}

/// Every character, wrapped at the viewport width; rows past the bottom are dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderWrapped;

impl RenderStrategy for RenderWrapped {
    fn rows(&self, session: &Session, width: u16) -> u16 {
        if width == 0 {
            return 0;
        }

        session
            .total_chars()
            .div_ceil(width as usize)
            .min(u16::MAX as usize) as u16
    }

    fn render(&self, session: &Session, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }

        for idx in 0..session.total_chars() {
            let Some((row, col)) = wrap_position(idx, area.width as usize) else {
                return;
            };
            if row >= area.height as usize {
                break;
            }

            put(
                buf,
                area.x + col as u16,
                area.y + row as u16,
                styled_char(session, idx),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KeyInput;

    fn session(text: &str, typed: &str) -> Session {
        let mut s = Session::new("test.txt", text, SessionConfig::default());
        for c in typed.chars() {
            s.apply(KeyInput::Printable(c));
        }
        s
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf.cell((x, y)).map(|c| c.symbol()).unwrap_or(" "))
            .collect()
    }

    #[test]
    fn test_scroll_offset() {
        assert_eq!(scroll_offset(0, 80, 20), 0);
        assert_eq!(scroll_offset(59, 80, 20), 0);
        assert_eq!(scroll_offset(60, 80, 20), 1);
        assert_eq!(scroll_offset(100, 80, 20), 41);
    }

    #[test]
    fn test_scroll_window_never_negative() {
        for cursor in 0..30 {
            for width in 0..30 {
                for margin in 0..30 {
                    let total = 25.max(cursor);
                    let w = ScrollWindow::new(cursor, total, width, margin);
                    assert!(w.typed_len + w.untyped_len <= width);
                    assert!(w.offset + w.typed_len <= cursor.max(w.offset));
                    assert!(w.visible().end <= total);
                }
            }
        }
    }

    #[test]
    fn test_scroll_window_keeps_cursor_in_view() {
        let w = ScrollWindow::new(100, 200, 80, 20);
        assert_eq!(w.offset, 41);
        assert_eq!(w.typed_len, 59);
        assert_eq!(w.untyped_len, 21);
    }

    #[test]
    fn test_margin_wider_than_viewport() {
        // margin capped to 1: the cursor sits in the first column
        let w = ScrollWindow::new(3, 10, 2, 5);
        assert_eq!(w.offset, 3);
        assert_eq!(w.typed_len, 0);
        assert_eq!(w.untyped_len, 2);
    }

    #[test]
    fn test_cursor_always_in_window() {
        for width in 1..30 {
            for margin in 0..40 {
                for cursor in 0..25 {
                    let w = ScrollWindow::new(cursor, 25, width, margin);
                    assert!(w.visible().contains(&cursor), "{cursor} {width} {margin}");
                }
            }
        }
    }

    #[test]
    fn test_render_scrolled_look_ahead_wider_than_row() {
        let s = session("the quick brown fox jumps", "t");
        let area = Rect::new(0, 0, 15, 1);
        let mut buf = Buffer::empty(area);

        RenderScrolled::new(20).render(&s, area, &mut buf);

        // look-ahead capped to 14, offset = 1 + 14 + 1 - 15
        assert_eq!(row_text(&buf, 0), "he quick brown ");
        assert_eq!(buf.cell((0, 0)).unwrap().symbol(), "h");
        assert!(buf.cell((0, 0)).unwrap().modifier.contains(Modifier::UNDERLINED));
    }

    #[test]
    fn test_control_chars_never_drawn_raw() {
        let s = session("a\x07b", "ax");
        assert_eq!(styled_char(&s, 1), (' ', CharClass::Error));
    }

    #[test]
    fn test_wrap_position_bijection() {
        for width in 1..12 {
            let mut seen = std::collections::HashSet::new();
            for idx in 0..50 {
                let (row, col) = wrap_position(idx, width).unwrap();
                assert!(col < width);
                assert_eq!(row * width + col, idx);
                assert!(seen.insert((row, col)));
            }
        }
        assert_eq!(wrap_position(3, 0), None);
    }

    #[test]
    fn test_styled_char_shows_expected_on_error() {
        let s = session("hello", "hx");

        assert_eq!(styled_char(&s, 0), ('h', CharClass::Correct));
        assert_eq!(styled_char(&s, 1), ('e', CharClass::Error));
        assert_eq!(styled_char(&s, 2), ('l', CharClass::Cursor));
        assert_eq!(styled_char(&s, 3), ('l', CharClass::Untyped));
    }

    #[test]
    fn test_styled_char_missed_space() {
        let s = session("a b", "ax");
        assert_eq!(styled_char(&s, 1), (MISSED_WHITESPACE, CharClass::Error));
    }

    #[test]
    fn test_corrected_position_renders_correct() {
        let mut s = session("ab", "x");
        s.apply(KeyInput::Backspace);
        s.apply(KeyInput::Printable('a'));

        assert_eq!(styled_char(&s, 0), ('a', CharClass::Correct));
    }

    #[test]
    fn test_render_scrolled_short_text() {
        let s = session("hello", "hx");
        let area = Rect::new(0, 0, 10, 1);
        let mut buf = Buffer::empty(area);

        RenderScrolled::new(3).render(&s, area, &mut buf);

        assert_eq!(row_text(&buf, 0), "hello     ");
        assert_eq!(buf.cell((0, 0)).unwrap().fg, Color::Green);
        assert_eq!(buf.cell((1, 0)).unwrap().fg, Color::Red);
        assert!(buf.cell((2, 0)).unwrap().modifier.contains(Modifier::UNDERLINED));
        assert!(buf.cell((4, 0)).unwrap().modifier.contains(Modifier::DIM));
    }

    #[test]
    fn test_render_scrolled_follows_cursor() {
        let s = session("abcdefghijklmnop", "abcdefgh");
        let area = Rect::new(0, 0, 6, 1);
        let mut buf = Buffer::empty(area);

        RenderScrolled::new(2).render(&s, area, &mut buf);

        // offset = 8 + 2 + 1 - 6
        assert_eq!(row_text(&buf, 0), "fghijk");
        assert!(buf.cell((3, 0)).unwrap().modifier.contains(Modifier::UNDERLINED));
    }

    #[test]
    fn test_render_wrapped() {
        let s = session("abcdefg", "abc");
        let area = Rect::new(0, 0, 3, 5);
        let mut buf = Buffer::empty(area);

        RenderWrapped.render(&s, area, &mut buf);

        assert_eq!(row_text(&buf, 0), "abc");
        assert_eq!(row_text(&buf, 1), "def");
        assert_eq!(row_text(&buf, 2), "g  ");
        assert!(buf.cell((0, 1)).unwrap().modifier.contains(Modifier::UNDERLINED));
        assert_eq!(RenderWrapped.rows(&s, 3), 3);
    }

    #[test]
    fn test_render_wrapped_clips_rows() {
        let s = session("abcdefg", "");
        let area = Rect::new(0, 0, 2, 2);
        let mut buf = Buffer::empty(area);

        RenderWrapped.render(&s, area, &mut buf);

        assert_eq!(row_text(&buf, 0), "ab");
        assert_eq!(row_text(&buf, 1), "cd");
    }

    #[test]
    fn test_render_zero_width_is_noop() {
        let s = session("abc", "a");
        let area = Rect::new(0, 0, 0, 3);
        let mut buf = Buffer::empty(area);

        RenderWrapped.render(&s, area, &mut buf);
        RenderScrolled::new(20).render(&s, area, &mut buf);
        assert_eq!(RenderWrapped.rows(&s, 0), 0);
    }

    #[test]
    fn test_strategy_for_layout() {
        let s = session("abcdef", "");
        let wrapped = strategy_for(&SessionConfig {
            layout: Layout::Wrapped,
            ..SessionConfig::default()
        });
        let scrolled = strategy_for(&SessionConfig::default());

        assert_eq!(wrapped.rows(&s, 2), 3);
        assert_eq!(scrolled.rows(&s, 2), 1);
    }
}
