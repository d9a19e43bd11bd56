use std::ops::Index;
use ahash::AHashMap;
use itertools::Itertools;
use mab::{Ring, RingOps};

/// A sparse `D`-index array over a ring. Zero entries are never stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SparseGrid<R, const D: usize> {
    data: AHashMap<[usize; D], R>,
    zero: R
}

impl<R, const D: usize> SparseGrid<R, D>
where R: Ring, for<'x> &'x R: RingOps<R> {
    pub fn new() -> Self {
        Self { data: AHashMap::new(), zero: R::zero() }
    }

    pub fn from_entries<It>(entries: It) -> Self
    where It: IntoIterator<Item = ([usize; D], R)> {
        let mut grid = Self::new();
        for (idx, a) in entries {
            grid.inc_entry(idx, a);
        }
        grid
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, idx: &[usize; D]) -> &R {
        self.data.get(idx).unwrap_or(&self.zero)
    }

    pub fn set_entry(&mut self, idx: [usize; D], a: R) {
        if a.is_zero() {
            self.data.remove(&idx);
        } else {
            self.data.insert(idx, a);
        }
    }

    pub fn inc_entry(&mut self, idx: [usize; D], a: R) {
        if a.is_zero() {
            return
        }

        let b = self.data.remove(&idx).unwrap_or_else(R::zero) + a;
        if !b.is_zero() {
            self.data.insert(idx, b);
        }
    }

    /// Nonzero entries in lexicographic order of their indices.
    pub fn iter(&self) -> impl Iterator<Item = (&[usize; D], &R)> {
        self.data.iter().sorted_by_key(|(idx, _)| *idx)
    }

    /// The largest index appearing in each slot, or `None` if empty.
    pub fn bounds(&self) -> Option<[usize; D]> {
        if self.is_empty() {
            return None
        }

        let mut max = [0; D];
        for idx in self.data.keys() {
            for (m, i) in max.iter_mut().zip(idx) {
                *m = (*m).max(*i);
            }
        }
        Some(max)
    }
}

impl<R, const D: usize> Default for SparseGrid<R, D>
where R: Ring, for<'x> &'x R: RingOps<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, const D: usize> Index<[usize; D]> for SparseGrid<R, D>
where R: Ring, for<'x> &'x R: RingOps<R> {
    type Output = R;

    fn index(&self, idx: [usize; D]) -> &R {
        self.get(&idx)
    }
}
