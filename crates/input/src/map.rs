//! Key mapping from terminal events to the raw bytes the bridge expects.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::types::Keypress;

/// Map a key event to the byte the engine would have read from a terminal.
///
/// Arrow keys become numeric-keypad directions. Key releases and keys with
/// no single-byte form map to `None`.
pub fn key_to_byte(key: KeyEvent) -> Option<Keypress> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    let byte = match key.code {
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) => {
            if !c.is_ascii_alphabetic() {
                return None;
            }
            return Some(Keypress::ctrl(c.to_ascii_lowercase() as u8));
        }
        KeyCode::Char(c) if c.is_ascii() => c as u8,
        KeyCode::Enter => Keypress::RETURN.0,
        KeyCode::Esc => Keypress::ESCAPE.0,
        KeyCode::Backspace => 0x08,
        KeyCode::Tab => b'\t',
        KeyCode::Delete => 0x7f,

        // Movement
        KeyCode::Up => b'8',
        KeyCode::Down => b'2',
        KeyCode::Left => b'4',
        KeyCode::Right => b'6',
        KeyCode::Home => b'7',
        KeyCode::PageUp => b'9',
        KeyCode::End => b'1',
        KeyCode::PageDown => b'3',

        _ => return None,
    };
    Some(Keypress(byte))
}

/// Check if key should close the viewer.
pub fn should_quit(key: KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyEventState, KeyModifiers};

    fn byte(code: KeyCode) -> Option<u8> {
        key_to_byte(KeyEvent::from(code)).map(|k| k.0)
    }

    #[test]
    fn test_character_keys() {
        assert_eq!(byte(KeyCode::Char('h')), Some(b'h'));
        assert_eq!(byte(KeyCode::Char('S')), Some(b'S'));
        assert_eq!(byte(KeyCode::Char(' ')), Some(b' '));
        assert_eq!(byte(KeyCode::Char('é')), None);
    }

    #[test]
    fn test_special_keys() {
        assert_eq!(byte(KeyCode::Enter), Some(b'\r'));
        assert_eq!(byte(KeyCode::Esc), Some(0x1b));
        assert_eq!(byte(KeyCode::Backspace), Some(0x08));
        assert_eq!(byte(KeyCode::Tab), Some(b'\t'));
        assert_eq!(byte(KeyCode::F(1)), None);
    }

    #[test]
    fn test_movement_keys() {
        assert_eq!(byte(KeyCode::Up), Some(b'8'));
        assert_eq!(byte(KeyCode::Down), Some(b'2'));
        assert_eq!(byte(KeyCode::Left), Some(b'4'));
        assert_eq!(byte(KeyCode::Right), Some(b'6'));
        assert_eq!(byte(KeyCode::PageDown), Some(b'3'));
    }

    #[test]
    fn test_control_keys() {
        let ctrl_x = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL);
        assert_eq!(key_to_byte(ctrl_x), Some(Keypress(0x18)));
        let ctrl_upper = KeyEvent::new(KeyCode::Char('X'), KeyModifiers::CONTROL);
        assert_eq!(key_to_byte(ctrl_upper), Some(Keypress(0x18)));
        let ctrl_digit = KeyEvent::new(KeyCode::Char('1'), KeyModifiers::CONTROL);
        assert_eq!(key_to_byte(ctrl_digit), None);
    }

    #[test]
    fn test_releases_are_ignored() {
        let release = KeyEvent {
            code: KeyCode::Char('a'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(key_to_byte(release), None);
    }

    #[test]
    fn test_quit_keys() {
        assert!(should_quit(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL
        )));
        assert!(!should_quit(KeyEvent::from(KeyCode::Char('c'))));
        assert!(!should_quit(KeyEvent::from(KeyCode::Char('Q'))));
    }
}
