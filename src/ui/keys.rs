/// Keyboard plumbing: iced events in, triage input and app messages out
use iced::keyboard::{self, key::Named};
use iced::{event, window, Event};

use crate::triage::input::{Key, Modifiers};
use crate::Message;

pub fn key_from_iced(key: &keyboard::Key) -> Key {
    match key {
        keyboard::Key::Named(named) => match named {
            Named::Enter => Key::Enter,
            Named::Backspace => Key::Backspace,
            Named::Escape => Key::Escape,
            Named::ArrowUp => Key::ArrowUp,
            Named::ArrowDown => Key::ArrowDown,
            Named::ArrowLeft => Key::ArrowLeft,
            Named::ArrowRight => Key::ArrowRight,
            Named::Shift | Named::Alt | Named::Control | Named::Super | Named::Meta => {
                Key::Modifier
            }
            _ => Key::Other,
        },
        keyboard::Key::Character(c) => c.chars().next().map(Key::char).unwrap_or(Key::Other),
        keyboard::Key::Unidentified => Key::Other,
    }
}

pub fn modifiers_from_iced(modifiers: keyboard::Modifiers) -> Modifiers {
    Modifiers {
        shift: modifiers.shift(),
        alt: modifiers.alt(),
        command: modifiers.command(),
    }
}

/// 1..=9 for digit keys
pub fn digit(key: Key) -> Option<usize> {
    match key {
        Key::Char(c) => c
            .to_digit(10)
            .filter(|d| (1..=9).contains(d))
            .map(|d| d as usize),
        _ => None,
    }
}

/// Global event listener for `iced::event::listen_with`
pub fn listen(event: Event, status: event::Status, _window: window::Id) -> Option<Message> {
    match event {
        Event::Keyboard(keyboard::Event::KeyPressed { key, modifiers, .. }) => {
            // Typing into a text field
            if status == event::Status::Captured {
                return None;
            }
            Some(Message::KeyPressed(
                key_from_iced(&key),
                modifiers_from_iced(modifiers),
            ))
        }
        // Releases always go through so a held gesture can finish
        Event::Keyboard(keyboard::Event::KeyReleased { key, .. }) => {
            Some(Message::KeyReleased(key_from_iced(&key)))
        }
        Event::Keyboard(keyboard::Event::ModifiersChanged(modifiers)) => {
            Some(Message::ModifiersChanged(modifiers_from_iced(modifiers)))
        }
        Event::Window(window::Event::Unfocused) => Some(Message::WindowUnfocused),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_characters_are_lowercased() {
        assert_eq!(key_from_iced(&keyboard::Key::Character("K".into())), Key::Char('k'));
        assert_eq!(key_from_iced(&keyboard::Key::Character("y".into())), Key::Char('y'));
    }

    #[test]
    fn test_named_keys() {
        assert_eq!(key_from_iced(&keyboard::Key::Named(Named::Enter)), Key::Enter);
        assert_eq!(key_from_iced(&keyboard::Key::Named(Named::ArrowLeft)), Key::ArrowLeft);
        assert_eq!(key_from_iced(&keyboard::Key::Named(Named::Shift)), Key::Modifier);
        assert_eq!(key_from_iced(&keyboard::Key::Named(Named::Tab)), Key::Other);
        assert_eq!(key_from_iced(&keyboard::Key::Unidentified), Key::Other);
    }

    #[test]
    fn test_modifiers() {
        let modifiers = modifiers_from_iced(keyboard::Modifiers::SHIFT | keyboard::Modifiers::ALT);
        assert!(modifiers.shift && modifiers.alt && !modifiers.command);
        assert!(modifiers_from_iced(keyboard::Modifiers::COMMAND).command);
    }

    #[test]
    fn test_digit() {
        assert_eq!(digit(Key::Char('1')), Some(1));
        assert_eq!(digit(Key::Char('9')), Some(9));
        assert_eq!(digit(Key::Char('0')), None);
        assert_eq!(digit(Key::Char('k')), None);
        assert_eq!(digit(Key::Enter), None);
    }

    #[test]
    fn test_listen_forwards_blur() {
        let message = listen(
            Event::Window(window::Event::Unfocused),
            event::Status::Ignored,
            window::Id::unique(),
        );
        assert!(matches!(message, Some(Message::WindowUnfocused)));
    }
}
