use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Lowest accepted printable character (space)
pub const PRINTABLE_MIN: char = ' ';
/// Highest accepted printable character (tilde)
pub const PRINTABLE_MAX: char = '~';

const DEL: u32 = 0x7f;
const BS: u32 = 8;

/// A raw key event, classified the way the typing loop cares about it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Backspace,
    Printable(char),
    /// Leave the session without recording a score
    Abort,
    /// The terminal changed size; only triggers a redraw
    Resize,
    Other,
}

impl KeyInput {
    /// Classify a raw key code. Backspace wins over the printable range.
    pub fn from_code(code: u32) -> Self {
        match code {
            DEL | BS => KeyInput::Backspace,
            _ => match char::from_u32(code) {
                Some(c) if (PRINTABLE_MIN..=PRINTABLE_MAX).contains(&c) => KeyInput::Printable(c),
                _ => KeyInput::Other,
            },
        }
    }

    pub fn from_key_event(key: KeyEvent) -> Self {
        if key.kind == KeyEventKind::Release {
            return KeyInput::Other;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') => KeyInput::Abort,
                // ctrl+h is how many terminals spell ^H
                KeyCode::Char('h') => KeyInput::Backspace,
                _ => KeyInput::Other,
            };
        }

        match key.code {
            KeyCode::Backspace => KeyInput::Backspace,
            KeyCode::Esc => KeyInput::Abort,
            KeyCode::Char(c) => KeyInput::from_code(c as u32),
            _ => KeyInput::Other,
        }
    }

    /// Mouse, focus and paste events only trigger a redraw
    pub fn from_event(event: Event) -> Self {
        match event {
            Event::Key(key) => KeyInput::from_key_event(key),
            Event::Resize(..) => KeyInput::Resize,
            _ => KeyInput::Other,
        }
    }
}
