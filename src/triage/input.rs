/// A physical key as the triage core sees it; `ui::keys` translates iced events into these
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A printable character, always lower-cased
    Char(char),
    Enter,
    Backspace,
    Escape,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    /// Shift, Alt, Ctrl or Cmd pressed on their own
    Modifier,
    Other,
}

impl Key {
    pub fn char(c: char) -> Self {
        Key::Char(c.to_ascii_lowercase())
    }

    pub fn is_modifier(self) -> bool {
        matches!(self, Key::Modifier)
    }
}

/// Modifier state at the time of a key event.
///
/// `command` is Cmd on macOS and Ctrl elsewhere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub alt: bool,
    pub command: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        alt: false,
        command: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        alt: false,
        command: false,
    };

    pub const ALT: Modifiers = Modifiers {
        shift: false,
        alt: true,
        command: false,
    };

    pub const COMMAND: Modifiers = Modifiers {
        shift: false,
        alt: false,
        command: true,
    };

    /// Whether these modifiers satisfy a binding's requirement.
    ///
    /// Alt and Command must match exactly; Shift only matters when required,
    /// so `K` and `Shift+K` both trigger a plain `K` binding.
    pub fn satisfies(self, required: Modifiers) -> bool {
        self.alt == required.alt
            && self.command == required.command
            && (!required.shift || self.shift)
    }
}
