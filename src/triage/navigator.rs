/// Keyboard and pointer navigation across the three review columns.
///
/// Columns are the ledger's ordered lists in fixed Keep, Maybe, Yeet order.
/// The navigator owns the selection set and the focused image, and turns
/// arrow keys and reclassification shortcuts into selection changes or
/// batch moves on the ledger.
use indexmap::IndexSet;
use tracing::debug;

use super::input::{Key, Modifiers};
use super::ledger::Ledger;
use crate::state::data::{Classification, ImageId};

const COLUMN_COUNT: usize = Classification::ALL.len();

/// Column and row of an image in the review grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub column: usize,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Up or left
    Back,
    /// Down or right
    Forward,
}

/// A review-phase command decoded from a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewCommand {
    Vertical { direction: Direction, extend: bool },
    Horizontal { direction: Direction },
    MoveSelected { direction: Direction },
    Reclassify(Classification),
}

impl ReviewCommand {
    pub fn from_key(key: Key, modifiers: Modifiers) -> Option<Self> {
        let command = match key {
            Key::ArrowUp => ReviewCommand::Vertical {
                direction: Direction::Back,
                extend: modifiers.shift,
            },
            Key::ArrowDown => ReviewCommand::Vertical {
                direction: Direction::Forward,
                extend: modifiers.shift,
            },
            Key::ArrowLeft if modifiers.alt => ReviewCommand::MoveSelected {
                direction: Direction::Back,
            },
            Key::ArrowRight if modifiers.alt => ReviewCommand::MoveSelected {
                direction: Direction::Forward,
            },
            Key::ArrowLeft => ReviewCommand::Horizontal {
                direction: Direction::Back,
            },
            Key::ArrowRight => ReviewCommand::Horizontal {
                direction: Direction::Forward,
            },
            Key::Enter | Key::Backspace if modifiers.command => {
                ReviewCommand::Reclassify(Classification::Maybe)
            }
            Key::Enter if !modifiers.shift => ReviewCommand::Reclassify(Classification::Keep),
            Key::Backspace if !modifiers.shift => ReviewCommand::Reclassify(Classification::Yeet),
            _ => return None,
        };
        Some(command)
    }
}

/// Find an image's column and row by scanning the three lists
pub fn locate(ledger: &Ledger, id: &ImageId) -> Option<Location> {
    ledger.locate(id).map(|(bucket, index)| Location {
        column: bucket.column(),
        index,
    })
}

/// Review selection: a set of selected images plus the focused one
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected: IndexSet<ImageId>,
    focused: Option<ImageId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn selected(&self) -> &IndexSet<ImageId> {
        &self.selected
    }

    pub fn focused(&self) -> Option<&ImageId> {
        self.focused.as_ref()
    }

    pub fn is_selected(&self, id: &ImageId) -> bool {
        self.selected.contains(id)
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.focused = None;
    }

    fn select_only(&mut self, id: ImageId) {
        self.selected.clear();
        self.selected.insert(id.clone());
        self.focused = Some(id);
    }

    /// Pointer click: replace the selection, or toggle the image when `toggle`
    pub fn click(&mut self, id: ImageId, toggle: bool) {
        if toggle {
            if !self.selected.shift_remove(&id) {
                self.selected.insert(id.clone());
            }
            self.focused = Some(id);
        } else {
            self.select_only(id);
        }
    }

    /// Drop an image that was reclassified elsewhere (drag and drop) or unset
    pub fn purge(&mut self, id: &ImageId) {
        self.selected.shift_remove(id);
    }

    /// Drop every id the ledger no longer knows about
    pub fn retain_classified(&mut self, ledger: &Ledger) {
        self.selected.retain(|id| ledger.get(id).is_some());
        if self.focused.as_ref().is_some_and(|id| ledger.get(id).is_none()) {
            self.focused = None;
        }
    }

    /// Apply a decoded command; returns true if the ledger was modified
    pub fn apply(&mut self, ledger: &mut Ledger, command: ReviewCommand) -> bool {
        match command {
            ReviewCommand::Vertical { direction, extend } => {
                self.move_vertical(ledger, direction, extend);
                false
            }
            ReviewCommand::Horizontal { direction } => {
                self.navigate_horizontal(ledger, direction);
                false
            }
            ReviewCommand::MoveSelected { direction } => {
                if self.selected.is_empty() || self.focus_location(ledger).is_none() {
                    // Nothing to carry: behave like a plain arrow
                    self.navigate_horizontal(ledger, direction);
                    false
                } else {
                    self.move_selected(ledger, direction)
                }
            }
            ReviewCommand::Reclassify(bucket) => self.reclassify_selected(ledger, bucket),
        }
    }

    fn focus_location(&self, ledger: &Ledger) -> Option<Location> {
        self.focused.as_ref().and_then(|id| locate(ledger, id))
    }

    /// Select the first image of the first non-empty column
    fn bootstrap(&mut self, ledger: &Ledger) {
        if let Some(first) = Classification::ALL
            .iter()
            .find_map(|bucket| ledger.order(*bucket).get(0))
        {
            self.select_only(first.clone());
        }
    }

    pub fn move_vertical(&mut self, ledger: &Ledger, direction: Direction, extend: bool) {
        let Some(location) = self.focus_location(ledger) else {
            self.bootstrap(ledger);
            return;
        };

        let column = ledger.order(Classification::ALL[location.column]);
        let index = match direction {
            Direction::Back => location.index.saturating_sub(1),
            Direction::Forward => (location.index + 1).min(column.len() - 1),
        };
        let Some(id) = column.get(index).cloned() else {
            return;
        };

        if extend {
            self.selected.insert(id.clone());
            self.focused = Some(id);
        } else {
            self.select_only(id);
        }
    }

    pub fn navigate_horizontal(&mut self, ledger: &Ledger, direction: Direction) {
        let Some(location) = self.focus_location(ledger) else {
            self.bootstrap(ledger);
            return;
        };

        // Other columns only; wraps around both ends
        for step in 1..COLUMN_COUNT {
            let column = match direction {
                Direction::Forward => (location.column + step) % COLUMN_COUNT,
                Direction::Back => (location.column + COLUMN_COUNT - step) % COLUMN_COUNT,
            };
            let order = ledger.order(Classification::ALL[column]);
            if order.is_empty() {
                continue;
            }

            let index = location.index.min(order.len() - 1);
            if let Some(id) = order.get(index).cloned() {
                self.select_only(id);
            }
            return;
        }

        debug!("horizontal navigation: no other non-empty column");
    }

    /// Alt+arrow: move the whole selection one column over, never wrapping
    pub fn move_selected(&mut self, ledger: &mut Ledger, direction: Direction) -> bool {
        let Some(location) = self.focus_location(ledger) else {
            return false;
        };
        if self.selected.is_empty() {
            return false;
        }

        let target = match direction {
            Direction::Back => location.column.checked_sub(1),
            Direction::Forward => Some(location.column + 1),
        };
        let Some(bucket) = target.and_then(Classification::from_column) else {
            debug!("move-selected past the edge column ignored");
            return false;
        };

        self.reclassify_selected(ledger, bucket)
    }

    /// Batch-reclassify the selection, then clear selection and focus
    pub fn reclassify_selected(&mut self, ledger: &mut Ledger, bucket: Classification) -> bool {
        let ids: Vec<ImageId> = self
            .selected
            .iter()
            .filter(|id| ledger.get(id).is_some())
            .cloned()
            .collect();
        if ids.is_empty() {
            return false;
        }

        ledger.reclassify_batch(ids.iter(), bucket);
        self.clear();
        true
    }
}
