/// A triage session: one folder's images plus every decision made about them.
///
/// The session is created when the user starts triage on a folder and
/// dropped when they leave or the commit succeeds. Nothing in it outlives
/// the session.
use std::collections::HashMap;
use std::path::PathBuf;

use tracing::{debug, info};

use super::commit::TriagePlan;
use super::cursor::TriageCursor;
use super::ledger::Ledger;
use super::navigator::{ReviewCommand, Selection};
use crate::state::data::{Classification, Folder, Image, ImageId, OutputLayout};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// One image at a time, driven by the cursor
    Classify,
    /// All three buckets visible and editable
    Review,
}

#[derive(Debug, Clone)]
pub struct TriageSession {
    project_path: PathBuf,
    output_layout: OutputLayout,
    folder: Folder,
    images: Vec<Image>,
    positions: HashMap<ImageId, usize>,
    ledger: Ledger,
    cursor: TriageCursor,
    selection: Selection,
    phase: Phase,
}

impl TriageSession {
    pub fn new(
        project_path: PathBuf,
        output_layout: OutputLayout,
        folder: Folder,
        images: Vec<Image>,
    ) -> Self {
        let positions = images
            .iter()
            .enumerate()
            .map(|(index, image)| (image.id.clone(), index))
            .collect();

        info!(
            "Triage session started for {} ({} images)",
            folder.source_path.display(),
            images.len()
        );

        TriageSession {
            project_path,
            output_layout,
            folder,
            images,
            positions,
            ledger: Ledger::new(),
            cursor: TriageCursor::new(),
            selection: Selection::new(),
            phase: Phase::Classify,
        }
    }

    pub fn folder(&self) -> &Folder {
        &self.folder
    }

    #[cfg(test)]
    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn cursor(&self) -> usize {
        self.cursor.index()
    }

    pub fn image(&self, id: &ImageId) -> Option<&Image> {
        self.positions.get(id).and_then(|index| self.images.get(*index))
    }

    /// Image under the triage cursor
    pub fn current(&self) -> Option<&Image> {
        self.images.get(self.cursor.index())
    }

    /// (classified, total)
    pub fn progress(&self) -> (usize, usize) {
        (self.ledger.len(), self.images.len())
    }

    pub fn is_complete(&self) -> bool {
        !self.images.is_empty() && self.ledger.len() == self.images.len()
    }

    /// Review is reachable once anything has been classified
    pub fn can_review(&self) -> bool {
        !self.ledger.is_empty()
    }

    /// Patch a thumbnail that finished loading after the session started
    pub fn set_thumbnail(&mut self, id: &ImageId, thumbnail: PathBuf) {
        if let Some(index) = self.positions.get(id).copied() {
            self.images[index].thumbnail = Some(thumbnail);
        }
    }

    /// Classify the image under the cursor and advance.
    ///
    /// On the last image the cursor stays put, so classifying again changes
    /// the decision for that image.
    pub fn classify(&mut self, classification: Classification) {
        let Some(image) = self.images.get(self.cursor.index()) else {
            debug!("classify ignored: no image under cursor");
            return;
        };

        self.ledger.classify(image.id.clone(), classification);
        self.cursor.advance(self.images.len());
    }

    /// Single-level undo for the image under the cursor.
    ///
    /// A classified image is returned to unset and the cursor stays on it.
    /// An unclassified image means there is nothing to undo here, so the
    /// cursor steps back one.
    pub fn unclassify(&mut self) {
        let Some(image) = self.images.get(self.cursor.index()) else {
            debug!("unclassify ignored: no image under cursor");
            return;
        };

        let id = image.id.clone();
        if self.ledger.unclassify(&id).is_some() {
            self.selection.purge(&id);
            self.selection.retain_classified(&self.ledger);
        } else {
            self.cursor.retreat();
        }
    }

    pub fn step_forward(&mut self) {
        self.cursor.step_forward(self.images.len());
    }

    pub fn step_back(&mut self) {
        self.cursor.step_back();
    }

    pub fn jump_to(&mut self, index: usize) {
        self.cursor.jump_to(index, self.images.len());
    }

    pub fn enter_review(&mut self) -> bool {
        if !self.can_review() {
            return false;
        }
        self.phase = Phase::Review;
        true
    }

    /// Back to one-at-a-time classification; decisions are kept
    pub fn leave_review(&mut self) {
        self.selection.clear();
        self.phase = Phase::Classify;
    }

    /// Drag and drop: move one image to a column at a position
    pub fn drop_on(&mut self, id: &ImageId, bucket: Classification, target_index: Option<usize>) {
        if self.ledger.get(id).is_none() {
            return;
        }
        if self.ledger.reclassify(id, bucket, target_index) {
            self.selection.purge(id);
        }
    }

    pub fn click(&mut self, id: ImageId, toggle: bool) {
        if self.ledger.get(&id).is_some() {
            self.selection.click(id, toggle);
        }
    }

    /// Review keyboard command; returns true if the ledger changed
    pub fn review(&mut self, command: ReviewCommand) -> bool {
        if self.phase != Phase::Review {
            return false;
        }
        self.selection.apply(&mut self.ledger, command)
    }

    /// Read the ledger into the three ordered path lists
    pub fn plan(&self) -> TriagePlan {
        let paths = |bucket: Classification| -> Vec<PathBuf> {
            self.ledger
                .order(bucket)
                .iter()
                .filter_map(|id| self.image(id))
                .map(|image| image.path.clone())
                .collect()
        };

        TriagePlan {
            project_path: self.project_path.clone(),
            output_layout: self.output_layout,
            folder_id: self.folder.id.clone(),
            folder_name: self.folder.name(),
            source_path: self.folder.source_path.clone(),
            output_mode: self.folder.output_mode,
            keep: paths(Classification::Keep),
            maybe: paths(Classification::Maybe),
            yeet: paths(Classification::Yeet),
        }
    }
}
