//! Lazy MaxMin diversity picking.
//!
//! Greedy farthest-first selection: after a seeded first pick, each step takes
//! the candidate whose minimum distance to everything picked so far is
//! largest, ties going to the lowest index. Per-candidate bounds sit in a
//! max-heap and are only brought up to date when they reach the top. A stale
//! bound can only be too high, so a candidate that is still on top once it
//! has been compared against every pick is exactly the one the eager
//! algorithm would take.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::distance::DistanceOracle;

/// Best known minimum distance of one unpicked candidate.
///
/// `checked` is how many of the picks (in pick order) `distance` already
/// accounts for.
#[derive(Debug, Clone, Copy)]
struct Bound {
    distance: f64,
    index: usize,
    checked: usize,
}

impl Bound {

    /// Folds in the picks made since the last refresh. Never raises the bound.
    fn refresh<O: DistanceOracle + ?Sized>(&mut self, oracle: &O, picks: &[usize]) {

        for &pick in &picks[self.checked..] {
            let d = oracle.distance(self.index, pick);
            if d < self.distance {
                self.distance = d;
            }
        }

        self.checked = picks.len();
    }
}

impl Ord for Bound {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| other.index.cmp(&self.index))
    }
}

impl PartialOrd for Bound {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Bound {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Bound {}

/// The seeded first pick for `n` candidates. No distances are involved.
pub fn first_pick(n: usize, seed: u64) -> Option<usize> {

    if n == 0 {
        return None;
    }

    let mut rng = StdRng::seed_from_u64(seed);
    return Some(rng.gen_range(0..n));
}

/// Picks `min(k, oracle.len())` distinct indices, starting from the seeded
/// first pick. The same oracle contents, `k` and seed always give the same
/// sequence.
pub fn pick<O: DistanceOracle + ?Sized>(oracle: &O, k: usize, seed: u64) -> Vec<usize> {

    if k == 0 {
        return Vec::new();
    }

    match first_pick(oracle.len(), seed) {
        Some(first) => pick_from(oracle, k, first),
        None => Vec::new(),
    }
}

/// Like [`pick`] with the first pick given explicitly.
///
/// # Panics
///
/// If `first` is not a valid index while picks are requested.
pub fn pick_from<O: DistanceOracle + ?Sized>(oracle: &O, k: usize, first: usize) -> Vec<usize> {

    let n = oracle.len();
    let target = k.min(n);

    if target == 0 {
        return Vec::new();
    }

    assert!(first < n, "first pick {} out of range for {} candidates", first, n);

    let mut picks: Vec<usize> = Vec::with_capacity(target);
    picks.push(first);

    if target == 1 {
        return picks;
    }

    let mut heap: BinaryHeap<Bound> = (0..n)
        .filter(|i| *i != first)
        .map(|index| Bound {
            distance: oracle.distance(index, first),
            index,
            checked: 1,
        })
        .collect();

    while picks.len() < target {

        let mut top = match heap.pop() {
            Some(top) => top,
            None => break,
        };

        match top.checked == picks.len() {
            true => picks.push(top.index),
            false => {
                top.refresh(oracle, &picks);
                heap.push(top);
            },
        }
    }

    picks
}
