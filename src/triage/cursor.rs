/// Index of the "active" image during one-at-a-time triage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TriageCursor {
    index: usize,
}

impl TriageCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Advance after a classification; stays put on the last image
    pub fn advance(&mut self, image_count: usize) {
        if self.index + 1 < image_count {
            self.index += 1;
        }
    }

    /// Step back one image, never below zero
    pub fn retreat(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    /// Arrow-key navigation without classifying
    pub fn step_forward(&mut self, image_count: usize) {
        self.advance(image_count);
    }

    pub fn step_back(&mut self) {
        self.retreat();
    }

    /// Jump to an image from the scrubber; ignored when out of range
    pub fn jump_to(&mut self, index: usize, image_count: usize) {
        if index < image_count {
            self.index = index;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_stops_at_last() {
        let mut cursor = TriageCursor::new();
        cursor.advance(2);
        assert_eq!(cursor.index(), 1);
        cursor.advance(2);
        assert_eq!(cursor.index(), 1);
    }

    #[test]
    fn test_retreat_floors_at_zero() {
        let mut cursor = TriageCursor::new();
        cursor.retreat();
        assert_eq!(cursor.index(), 0);
    }

    #[test]
    fn test_jump_out_of_range_is_ignored() {
        let mut cursor = TriageCursor::new();
        cursor.jump_to(3, 3);
        assert_eq!(cursor.index(), 0);
        cursor.jump_to(2, 3);
        assert_eq!(cursor.index(), 2);
    }
}
