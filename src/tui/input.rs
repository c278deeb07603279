//! Terminal events to game input

use crate::app::InputEvent;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind};

/// Function keys F1..=F5 stand in for buzzers 1..=5
const BUZZER_KEYS: u8 = 5;

fn map_key(key: &KeyEvent) -> Option<InputEvent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Esc => Some(InputEvent::Quit),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(InputEvent::Quit),
        KeyCode::Enter => Some(InputEvent::Enter),
        KeyCode::Backspace => Some(InputEvent::Backspace),
        KeyCode::F(n) if (1..=BUZZER_KEYS).contains(&n) => Some(InputEvent::Buzz(usize::from(n - 1))),
        KeyCode::Char(c) => Some(InputEvent::Key(c)),
        _ => None,
    }
}

/// The game input for a terminal event, if it means anything to the game
pub fn map_event(event: &Event) -> Option<InputEvent> {
    match event {
        Event::Key(key) => map_key(key),
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => Some(InputEvent::Click {
                x: mouse.column,
                y: mouse.row,
            }),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::MouseEvent;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_keys() {
        assert_eq!(map_event(&key(KeyCode::Esc)), Some(InputEvent::Quit));
        assert_eq!(map_event(&key(KeyCode::Enter)), Some(InputEvent::Enter));
        assert_eq!(map_event(&key(KeyCode::Char('+'))), Some(InputEvent::Key('+')));
        assert_eq!(map_event(&key(KeyCode::Backspace)), Some(InputEvent::Backspace));
        assert_eq!(map_event(&key(KeyCode::Tab)), None);
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(map_event(&ctrl_c), Some(InputEvent::Quit));
    }

    #[test]
    fn test_function_keys_buzz() {
        assert_eq!(map_event(&key(KeyCode::F(1))), Some(InputEvent::Buzz(0)));
        assert_eq!(map_event(&key(KeyCode::F(5))), Some(InputEvent::Buzz(4)));
        assert_eq!(map_event(&key(KeyCode::F(6))), None);
    }

    #[test]
    fn test_key_release_ignored() {
        let release = Event::Key(KeyEvent::new_with_kind(
            KeyCode::Char('a'),
            KeyModifiers::NONE,
            KeyEventKind::Release,
        ));
        assert_eq!(map_event(&release), None);
    }

    #[test]
    fn test_left_click() {
        let click = Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 12,
            row: 7,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(map_event(&click), Some(InputEvent::Click { x: 12, y: 7 }));
        let right = Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Right),
            column: 1,
            row: 1,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(map_event(&right), None);
    }
}
