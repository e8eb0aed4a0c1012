//! Exhaustive nearest-neighbor structure keyed by slot id.
//!
//! Vectors are stored row-major in one contiguous buffer. Removal is a
//! single compaction pass over the whole buffer, so a batch of slots is
//! dropped at once and no surviving slot is ever renumbered.

use std::collections::{HashMap, HashSet};

use crate::error::{RagError, Result};

/// A slot id paired with its squared Euclidean distance to a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Slot id of the stored vector.
    pub slot: u64,
    /// Squared Euclidean distance to the query.
    pub distance: f32,
}

/// A flat (brute-force) vector index with caller-assigned slot ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatIndex {
    dimensions: usize,
    slots: Vec<u64>,
    vectors: Vec<f32>,
    positions: HashMap<u64, usize>,
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

impl FlatIndex {
    /// Create an empty index for vectors of `dimensions` components.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions, ..Self::default() }
    }

    /// Rebuild an index from its serialized parts.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::CorruptIndexError`] if the buffer length does not
    /// match `slots.len() * dimensions` or a slot id repeats.
    pub fn from_parts(dimensions: usize, slots: Vec<u64>, vectors: Vec<f32>) -> Result<Self> {
        if vectors.len() != slots.len() * dimensions {
            return Err(RagError::CorruptIndexError(format!(
                "vector buffer holds {} floats, expected {} slots x {} dimensions",
                vectors.len(),
                slots.len(),
                dimensions
            )));
        }
        let mut positions = HashMap::with_capacity(slots.len());
        for (i, slot) in slots.iter().enumerate() {
            if positions.insert(*slot, i).is_some() {
                return Err(RagError::CorruptIndexError(format!("slot {slot} appears twice")));
            }
        }
        Ok(Self { dimensions, slots, vectors, positions })
    }

    /// Split the index into `(dimensions, slots, vectors)` for serialization.
    pub fn parts(&self) -> (usize, &[u64], &[f32]) {
        (self.dimensions, &self.slots, &self.vectors)
    }

    /// Vector dimensionality.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the index holds no vectors.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slot ids in storage order.
    pub fn slots(&self) -> &[u64] {
        &self.slots
    }

    /// Whether `slot` is stored.
    pub fn contains(&self, slot: u64) -> bool {
        self.positions.contains_key(&slot)
    }

    /// The vector stored under `slot`.
    pub fn vector(&self, slot: u64) -> Option<&[f32]> {
        let pos = *self.positions.get(&slot)?;
        Some(&self.vectors[pos * self.dimensions..(pos + 1) * self.dimensions])
    }

    /// Append vectors under the given slot ids.
    ///
    /// Nothing is inserted unless every vector has the right length and every
    /// slot id is new.
    pub fn add_with_ids(&mut self, slots: &[u64], vectors: &[Vec<f32>]) -> Result<()> {
        if slots.len() != vectors.len() {
            return Err(RagError::CorruptIndexError(format!(
                "{} slot ids for {} vectors",
                slots.len(),
                vectors.len()
            )));
        }
        if let Some(v) = vectors.iter().find(|v| v.len() != self.dimensions) {
            return Err(RagError::CorruptIndexError(format!(
                "vector of {} dimensions added to a {}-dimensional index",
                v.len(),
                self.dimensions
            )));
        }
        let mut fresh = HashSet::with_capacity(slots.len());
        if let Some(slot) = slots.iter().find(|s| self.contains(**s) || !fresh.insert(**s)) {
            return Err(RagError::CorruptIndexError(format!("slot {slot} is already in use")));
        }

        for (slot, vector) in slots.iter().zip(vectors) {
            self.positions.insert(*slot, self.slots.len());
            self.slots.push(*slot);
            self.vectors.extend_from_slice(vector);
        }
        Ok(())
    }

    /// Remove every slot in `slots` in one compaction pass. Returns how many were removed.
    pub fn remove_ids(&mut self, slots: &HashSet<u64>) -> usize {
        let dims = self.dimensions;
        let before = self.slots.len();
        let mut write = 0;
        for read in 0..before {
            let slot = self.slots[read];
            if slots.contains(&slot) {
                continue;
            }
            if write != read {
                self.slots[write] = slot;
                self.vectors.copy_within(read * dims..(read + 1) * dims, write * dims);
            }
            write += 1;
        }
        self.slots.truncate(write);
        self.vectors.truncate(write * dims);
        self.positions = self.slots.iter().enumerate().map(|(i, s)| (*s, i)).collect();
        before - write
    }

    /// Drop every vector, keeping the dimensionality.
    pub fn reset(&mut self) {
        self.slots.clear();
        self.vectors.clear();
        self.positions.clear();
    }

    /// Return up to `k` nearest slots accepted by `filter`, closest first.
    ///
    /// Ties are broken by slot id so results are reproducible.
    pub fn search<F>(&self, query: &[f32], k: usize, filter: F) -> Vec<Neighbor>
    where
        F: Fn(u64) -> bool,
    {
        if k == 0 || query.len() != self.dimensions {
            return Vec::new();
        }
        let mut hits: Vec<Neighbor> = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| filter(**slot))
            .map(|(pos, slot)| Neighbor {
                slot: *slot,
                distance: squared_l2(
                    query,
                    &self.vectors[pos * self.dimensions..(pos + 1) * self.dimensions],
                ),
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.slot.cmp(&b.slot)));
        hits.truncate(k);
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> FlatIndex {
        let mut index = FlatIndex::new(2);
        index
            .add_with_ids(&[10, 11, 12, 13], &[vec![0.0, 0.0], vec![1.0, 0.0], vec![2.0, 0.0], vec![3.0, 0.0]])
            .unwrap();
        index
    }

    #[test]
    fn search_orders_by_distance() {
        let hits = index().search(&[2.9, 0.0], 3, |_| true);
        let slots: Vec<u64> = hits.iter().map(|h| h.slot).collect();
        assert_eq!(slots, [13, 12, 11]);
        assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[test]
    fn search_applies_filter_inline() {
        let hits = index().search(&[0.0, 0.0], 10, |slot| slot % 2 == 1);
        let slots: Vec<u64> = hits.iter().map(|h| h.slot).collect();
        assert_eq!(slots, [11, 13]);
    }

    #[test]
    fn batch_removal_keeps_surviving_vectors_aligned() {
        let mut index = index();
        let removed = index.remove_ids(&HashSet::from([10, 12, 99]));
        assert_eq!(removed, 2);
        assert_eq!(index.slots(), &[11, 13]);
        assert_eq!(index.vector(11), Some(&[1.0, 0.0][..]));
        assert_eq!(index.vector(13), Some(&[3.0, 0.0][..]));
        assert_eq!(index.vector(10), None);
    }

    #[test]
    fn rejects_reused_slots_and_wrong_dimensions() {
        let mut index = index();
        assert!(index.add_with_ids(&[11], &[vec![5.0, 5.0]]).is_err());
        assert!(index.add_with_ids(&[20, 20], &[vec![5.0, 5.0], vec![6.0, 6.0]]).is_err());
        assert!(index.add_with_ids(&[21], &[vec![5.0]]).is_err());
        assert_eq!(index.len(), 4);
    }

    #[test]
    fn empty_index_searches_to_nothing() {
        let mut index = index();
        index.reset();
        assert!(index.is_empty());
        assert!(index.search(&[0.0, 0.0], 5, |_| true).is_empty());
    }

    #[test]
    fn from_parts_validates_layout() {
        assert!(FlatIndex::from_parts(2, vec![1, 2], vec![0.0; 3]).is_err());
        assert!(FlatIndex::from_parts(2, vec![1, 1], vec![0.0; 4]).is_err());
        let rebuilt = FlatIndex::from_parts(2, vec![4, 7], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(rebuilt.vector(7), Some(&[3.0, 4.0][..]));
    }
}
