//! Title pools: named bags of titles with "all" vs "unused" membership.

use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::title::TitleId;

/// A named bag of titles available for random assignment.
///
/// `unused` is always a subset of `all`. Draws remove from `unused` only;
/// membership in `all` records which pool a title belongs to for the rest of
/// the challenge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pool {
    all: Vec<TitleId>,
    unused: Vec<TitleId>,
}

impl Pool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a title to the pool (both `all` and `unused`).
    pub fn add(&mut self, id: TitleId) {
        self.all.push(id);
        self.unused.push(id);
    }

    /// Remove a title from the pool entirely. Returns true if it was a member.
    pub fn remove(&mut self, id: TitleId) -> bool {
        let len_before = self.all.len();
        self.all.retain(|t| *t != id);
        self.unused.retain(|t| *t != id);
        self.all.len() < len_before
    }

    /// Whether the pool contains the title at all.
    pub fn contains(&self, id: TitleId) -> bool {
        self.all.contains(&id)
    }

    /// Draw one unused title uniformly at random.
    pub fn pop(&mut self, rng: &mut StdRng) -> Option<TitleId> {
        if self.unused.is_empty() {
            return None;
        }
        let idx = rng.random_range(0..self.unused.len());
        Some(self.unused.swap_remove(idx))
    }

    /// Draw `n` distinct unused titles without replacement.
    ///
    /// Atomic: if fewer than `n` titles are unused, nothing is drawn.
    pub fn pop_n(&mut self, n: usize, rng: &mut StdRng) -> Option<Vec<TitleId>> {
        if n > self.unused.len() {
            return None;
        }
        let mut drawn = Vec::with_capacity(n);
        for _ in 0..n {
            let idx = rng.random_range(0..self.unused.len());
            drawn.push(self.unused.swap_remove(idx));
        }
        Some(drawn)
    }

    /// Take a specific title out of the unused set. Returns true if it was
    /// unused.
    pub fn take(&mut self, id: TitleId) -> bool {
        let len_before = self.unused.len();
        self.unused.retain(|t| *t != id);
        self.unused.len() < len_before
    }

    /// Return a previously drawn title to the unused set.
    ///
    /// Only titles that belong to the pool and are not already unused are
    /// re-inserted, preserving `unused ⊆ all`.
    pub fn restore(&mut self, id: TitleId) -> bool {
        if !self.all.contains(&id) || self.unused.contains(&id) {
            return false;
        }
        self.unused.push(id);
        true
    }

    /// All titles ever added to this pool.
    pub fn all(&self) -> &[TitleId] {
        &self.all
    }

    /// Titles still available for drawing.
    pub fn unused(&self) -> &[TitleId] {
        &self.unused
    }

    /// Number of titles still available for drawing.
    pub fn unused_len(&self) -> usize {
        self.unused.len()
    }
}
