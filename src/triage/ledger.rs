/// Classification ledger: the authoritative record of every triage decision.
///
/// The ledger keeps a map from image id to bucket together with one ordered
/// id list per bucket. The lists define display order in review and commit
/// order for the executor. An id is in exactly one list iff it has a map
/// entry; every mutation goes through this module so that holds.
use std::collections::HashMap;

use crate::state::data::{Classification, ImageId};

/// Insertion-ordered list of image ids for one bucket
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketOrder {
    ids: Vec<ImageId>,
}

impl BucketOrder {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &ImageId) -> bool {
        self.ids.contains(id)
    }

    pub fn position(&self, id: &ImageId) -> Option<usize> {
        self.ids.iter().position(|existing| existing == id)
    }

    pub fn get(&self, index: usize) -> Option<&ImageId> {
        self.ids.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageId> {
        self.ids.iter()
    }

    /// Append at the end; returns false if the id was already present
    pub fn append(&mut self, id: ImageId) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Insert at `index` clamped to the list length; returns false on duplicate
    pub fn insert_at(&mut self, index: usize, id: ImageId) -> bool {
        if self.contains(&id) {
            return false;
        }
        let index = index.min(self.ids.len());
        self.ids.insert(index, id);
        true
    }

    /// Remove the id if present, returning its former position
    pub fn remove(&mut self, id: &ImageId) -> Option<usize> {
        let index = self.position(id)?;
        self.ids.remove(index);
        Some(index)
    }

    fn retain(&mut self, keep: impl FnMut(&ImageId) -> bool) {
        self.ids.retain(keep);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    classifications: HashMap<ImageId, Classification>,
    keep: BucketOrder,
    maybe: BucketOrder,
    yeet: BucketOrder,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &ImageId) -> Option<Classification> {
        self.classifications.get(id).copied()
    }

    pub fn order(&self, bucket: Classification) -> &BucketOrder {
        match bucket {
            Classification::Keep => &self.keep,
            Classification::Maybe => &self.maybe,
            Classification::Yeet => &self.yeet,
        }
    }

    fn order_mut(&mut self, bucket: Classification) -> &mut BucketOrder {
        match bucket {
            Classification::Keep => &mut self.keep,
            Classification::Maybe => &mut self.maybe,
            Classification::Yeet => &mut self.yeet,
        }
    }

    /// Number of classified images
    pub fn len(&self) -> usize {
        self.classifications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classifications.is_empty()
    }

    /// (keep, maybe, yeet) counts
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.keep.len(), self.maybe.len(), self.yeet.len())
    }

    /// Forward classification: sets the bucket and appends to its order.
    ///
    /// An image that is already classified into another bucket is moved to
    /// the end of the new one; classifying into the same bucket again leaves
    /// its position unchanged.
    pub fn classify(&mut self, id: ImageId, bucket: Classification) {
        match self.get(&id) {
            Some(current) if current == bucket => {}
            Some(current) => {
                self.order_mut(current).remove(&id);
                self.order_mut(bucket).append(id.clone());
                self.classifications.insert(id, bucket);
            }
            None => {
                self.order_mut(bucket).append(id.clone());
                self.classifications.insert(id, bucket);
            }
        }
        self.debug_check();
    }

    /// Remove an image's classification; returns the bucket it was in
    pub fn unclassify(&mut self, id: &ImageId) -> Option<Classification> {
        let bucket = self.classifications.remove(id)?;
        self.order_mut(bucket).remove(id);
        self.debug_check();
        Some(bucket)
    }

    /// Move one image to `bucket`, optionally at a position in the target list.
    ///
    /// No-op when the image is already in `bucket`. Returns true if the
    /// ledger changed.
    pub fn reclassify(
        &mut self,
        id: &ImageId,
        bucket: Classification,
        target_index: Option<usize>,
    ) -> bool {
        if self.get(id) == Some(bucket) {
            return false;
        }

        for existing in Classification::ALL {
            if self.order_mut(existing).remove(id).is_some() {
                break;
            }
        }

        self.classifications.insert(id.clone(), bucket);
        let order = self.order_mut(bucket);
        match target_index {
            Some(index) => order.insert_at(index, id.clone()),
            None => order.append(id.clone()),
        };

        self.debug_check();
        true
    }

    /// Move a set of images to `bucket` in one step.
    ///
    /// All ids are removed from every list first, then appended to the
    /// target in the order given. Duplicate ids in the input are appended once.
    pub fn reclassify_batch<'a, I>(&mut self, ids: I, bucket: Classification)
    where
        I: IntoIterator<Item = &'a ImageId>,
    {
        let ids: Vec<&ImageId> = ids.into_iter().collect();
        if ids.is_empty() {
            return;
        }

        for existing in Classification::ALL {
            self.order_mut(existing).retain(|id| !ids.contains(&id));
        }

        for id in ids {
            self.classifications.insert(id.clone(), bucket);
            self.order_mut(bucket).append(id.clone());
        }

        self.debug_check();
    }

    /// Bucket and index of an image within its ordered list
    pub fn locate(&self, id: &ImageId) -> Option<(Classification, usize)> {
        Classification::ALL
            .iter()
            .find_map(|bucket| self.order(*bucket).position(id).map(|index| (*bucket, index)))
    }

    /// Verify the map and the three lists agree
    pub fn check_invariants(&self) -> Result<(), String> {
        let mut listed = 0;
        for bucket in Classification::ALL {
            for id in self.order(bucket).iter() {
                listed += 1;
                match self.classifications.get(id) {
                    Some(stored) if *stored == bucket => {}
                    Some(stored) => {
                        return Err(format!("{id} listed in {bucket:?} but mapped to {stored:?}"))
                    }
                    None => return Err(format!("{id} listed in {bucket:?} but unclassified")),
                }
            }
        }

        if listed != self.classifications.len() {
            return Err(format!(
                "{} ids listed but {} classified",
                listed,
                self.classifications.len()
            ));
        }

        Ok(())
    }

    fn debug_check(&self) {
        debug_assert!(
            self.check_invariants().is_ok(),
            "ledger invariant broken: {:?}",
            self.check_invariants()
        );
    }
}
