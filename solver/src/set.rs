use std::fmt;

use bitvec::order::Lsb0;
use bitvec::vec::BitVec;

use crate::game::VertexId;
use crate::index::AsIndex;

/// A set of vertices backed by a bitset over a fixed vertex-id space.
///
/// All sets derived from the same game share its capacity, so binary
/// operations work word by word on the underlying storage.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct VertexSet {
    bits: BitVec<usize, Lsb0>,
}

impl VertexSet {
    /// The empty set over `capacity` vertex ids.
    pub fn new(capacity: usize) -> Self {
        Self { bits: BitVec::repeat(false, capacity) }
    }

    /// The set containing every vertex id below `capacity`.
    pub fn full(capacity: usize) -> Self {
        Self { bits: BitVec::repeat(true, capacity) }
    }

    pub fn from_vertices(capacity: usize, vertices: impl IntoIterator<Item = VertexId>) -> Self {
        let mut set = Self::new(capacity);
        set.extend(vertices);
        set
    }

    pub fn capacity(&self) -> usize {
        self.bits.len()
    }

    /// Inserts `v`, returning whether it was absent.
    pub fn insert(&mut self, v: VertexId) -> bool {
        let was_present = self.bits.replace(v.to_usize(), true);
        !was_present
    }

    /// Removes `v`, returning whether it was present.
    pub fn remove(&mut self, v: VertexId) -> bool {
        self.bits.replace(v.to_usize(), false)
    }

    pub fn contains(&self, v: VertexId) -> bool {
        self.bits.get(v.to_usize()).is_some_and(|b| *b)
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    pub fn iter(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.bits.iter_ones().map(VertexId)
    }

    pub fn union_with(&mut self, other: &VertexSet) {
        self.zip_words(other, |a, b| a | b);
    }

    pub fn difference_with(&mut self, other: &VertexSet) {
        self.zip_words(other, |a, b| a & !b);
    }

    pub fn intersect_with(&mut self, other: &VertexSet) {
        self.zip_words(other, |a, b| a & b);
    }

    pub fn is_disjoint(&self, other: &VertexSet) -> bool {
        debug_assert_eq!(self.capacity(), other.capacity());
        self.iter().all(|v| !other.contains(v))
    }

    pub fn is_subset(&self, other: &VertexSet) -> bool {
        self.iter().all(|v| other.contains(v))
    }

    /// Every vertex id below the capacity that is not in `self`.
    pub fn complement(&self) -> VertexSet {
        let mut full = Self::full(self.capacity());
        full.difference_with(self);
        full
    }

    fn zip_words(&mut self, other: &VertexSet, f: impl Fn(usize, usize) -> usize) {
        assert_eq!(self.capacity(), other.capacity(), "vertex sets over different games");
        let words = self.bits.as_raw_mut_slice().iter_mut().zip(other.bits.as_raw_slice());
        for (a, &b) in words {
            *a = f(*a, b);
        }
    }
}

impl Extend<VertexId> for VertexSet {
    fn extend<T: IntoIterator<Item = VertexId>>(&mut self, iter: T) {
        for v in iter {
            self.insert(v);
        }
    }
}

impl fmt::Debug for VertexSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.bits.iter_ones()).finish()
    }
}
