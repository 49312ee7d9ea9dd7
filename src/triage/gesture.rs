/// Press-to-preview, release-to-commit key gestures.
///
/// A key-down on a bound key only arms the gesture and reports a preview so
/// the UI can render the pressed look. The action fires on the matching
/// key-up. Losing window focus, or pressing another key before release,
/// cancels the gesture without firing.
use tracing::debug;

use super::input::{Key, Modifiers};
use crate::state::data::Classification;

/// A key (plus required modifiers) mapped to an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding<A> {
    pub key: Key,
    pub modifiers: Modifiers,
    pub action: A,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureState<A> {
    Idle,
    Pressed { key: Key, action: A },
}

/// Output of a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal<A> {
    /// Gesture armed; show the active look, do not mutate anything yet
    Preview(A),
    /// Gesture released on the same key; perform the action now
    Commit(A),
    /// Gesture abandoned; clear the active look
    Cancelled(A),
}

#[derive(Debug, Clone)]
pub struct GestureEngine<A> {
    bindings: Vec<Binding<A>>,
    state: GestureState<A>,
}

impl<A: Copy + PartialEq> GestureEngine<A> {
    pub fn new(bindings: Vec<Binding<A>>) -> Self {
        GestureEngine {
            bindings,
            state: GestureState::Idle,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> GestureState<A> {
        self.state
    }

    /// Action currently held down, if any
    pub fn pressed(&self) -> Option<A> {
        match self.state {
            GestureState::Idle => None,
            GestureState::Pressed { action, .. } => Some(action),
        }
    }

    fn lookup(&self, key: Key, modifiers: Modifiers) -> Option<A> {
        self.bindings
            .iter()
            .find(|binding| binding.key == key && modifiers.satisfies(binding.modifiers))
            .map(|binding| binding.action)
    }

    pub fn key_down(&mut self, key: Key, modifiers: Modifiers) -> Option<Signal<A>> {
        // Modifiers pressed on their own never start or break a gesture
        if key.is_modifier() {
            return None;
        }

        match self.state {
            GestureState::Pressed { key: held, .. } if held == key => {
                // Auto-repeat
                None
            }
            GestureState::Pressed { action, .. } => {
                debug!("gesture cancelled by another key-down");
                self.state = GestureState::Idle;
                Some(Signal::Cancelled(action))
            }
            GestureState::Idle => {
                let action = self.lookup(key, modifiers)?;
                self.state = GestureState::Pressed { key, action };
                Some(Signal::Preview(action))
            }
        }
    }

    pub fn key_up(&mut self, key: Key) -> Option<Signal<A>> {
        match self.state {
            GestureState::Pressed { key: held, action } if held == key => {
                self.state = GestureState::Idle;
                Some(Signal::Commit(action))
            }
            _ => None,
        }
    }

    /// Window lost focus: drop any pending gesture without committing
    pub fn blur(&mut self) -> Option<Signal<A>> {
        match std::mem::replace(&mut self.state, GestureState::Idle) {
            GestureState::Idle => None,
            GestureState::Pressed { action, .. } => {
                debug!("gesture cancelled by window blur");
                Some(Signal::Cancelled(action))
            }
        }
    }
}

/// Bindings for the classify phase: K / M / Y
pub fn triage_bindings() -> Vec<Binding<Classification>> {
    vec![
        Binding {
            key: Key::Char('k'),
            modifiers: Modifiers::NONE,
            action: Classification::Keep,
        },
        Binding {
            key: Key::Char('m'),
            modifiers: Modifiers::NONE,
            action: Classification::Maybe,
        },
        Binding {
            key: Key::Char('y'),
            modifiers: Modifiers::NONE,
            action: Classification::Yeet,
        },
    ]
}

/// Action for the project view's start gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartTriage;

/// Shift+Enter starts triage on the selected folder tab
pub fn start_bindings() -> Vec<Binding<StartTriage>> {
    vec![Binding {
        key: Key::Enter,
        modifiers: Modifiers::SHIFT,
        action: StartTriage,
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> GestureEngine<Classification> {
        GestureEngine::new(triage_bindings())
    }

    #[test]
    fn test_press_then_release_commits_once() {
        let mut engine = engine();

        assert_eq!(
            engine.key_down(Key::char('K'), Modifiers::NONE),
            Some(Signal::Preview(Classification::Keep))
        );
        assert_eq!(engine.pressed(), Some(Classification::Keep));
        assert_eq!(
            engine.key_up(Key::char('k')),
            Some(Signal::Commit(Classification::Keep))
        );
        assert_eq!(engine.key_up(Key::char('k')), None);
        assert_eq!(engine.state(), GestureState::Idle);
    }

    #[test]
    fn test_key_repeat_previews_once() {
        let mut engine = engine();

        assert!(engine.key_down(Key::char('y'), Modifiers::NONE).is_some());
        assert_eq!(engine.key_down(Key::char('y'), Modifiers::NONE), None);
        assert_eq!(engine.key_down(Key::char('y'), Modifiers::NONE), None);

        let commits = [engine.key_up(Key::char('y')), engine.key_up(Key::char('y'))];
        assert_eq!(
            commits.iter().filter(|s| matches!(s, Some(Signal::Commit(_)))).count(),
            1
        );
    }

    #[test]
    fn test_blur_cancels_without_commit() {
        let mut engine = engine();

        engine.key_down(Key::char('m'), Modifiers::NONE);
        assert_eq!(engine.blur(), Some(Signal::Cancelled(Classification::Maybe)));
        assert_eq!(engine.key_up(Key::char('m')), None);
        assert_eq!(engine.blur(), None);
    }

    #[test]
    fn test_other_key_down_cancels() {
        let mut engine = engine();

        engine.key_down(Key::char('k'), Modifiers::NONE);
        assert_eq!(
            engine.key_down(Key::char('m'), Modifiers::NONE),
            Some(Signal::Cancelled(Classification::Keep))
        );
        assert_eq!(engine.pressed(), None);
        assert_eq!(engine.key_up(Key::char('k')), None);
        assert_eq!(engine.key_up(Key::char('m')), None);
    }

    #[test]
    fn test_unbound_and_modified_keys_are_ignored() {
        let mut engine = engine();

        assert_eq!(engine.key_down(Key::char('x'), Modifiers::NONE), None);
        assert_eq!(engine.key_down(Key::char('k'), Modifiers::COMMAND), None);
        assert_eq!(engine.key_down(Key::char('k'), Modifiers::ALT), None);
        assert_eq!(
            engine.key_down(Key::char('k'), Modifiers::SHIFT),
            Some(Signal::Preview(Classification::Keep))
        );
    }

    #[test]
    fn test_start_gesture_survives_shift_release() {
        let mut engine = GestureEngine::new(start_bindings());

        assert_eq!(engine.key_down(Key::Modifier, Modifiers::SHIFT), None);
        assert_eq!(engine.key_down(Key::Enter, Modifiers::NONE), None);
        assert_eq!(
            engine.key_down(Key::Enter, Modifiers::SHIFT),
            Some(Signal::Preview(StartTriage))
        );
        assert_eq!(engine.key_up(Key::Modifier), None);
        assert_eq!(engine.key_up(Key::Enter), Some(Signal::Commit(StartTriage)));
    }
}
