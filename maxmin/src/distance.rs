//! Pairwise dissimilarity over one window's candidates.

use crate::fingerprint::{CountFingerprint, Similarity};

/// Answers `distance(i, j)` for indices into a fixed candidate list.
///
/// Implementations must be symmetric with `distance(i, i) == 0`, bounded to
/// `[0, 1]`. The triangle inequality is not assumed. Indices outside
/// `0..len()` are a caller bug and panic.
pub trait DistanceOracle {

    fn len(&self) -> usize;

    fn distance(&self, i: usize, j: usize) -> f64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `1 - similarity` over the fingerprints of one window. Owns the fingerprints,
/// so a new oracle has to be built for every window.
#[derive(Debug)]
pub struct FingerprintOracle {
    fingerprints: Vec<CountFingerprint>,
    metric: Similarity,
}

impl FingerprintOracle {

    pub fn new(fingerprints: Vec<CountFingerprint>, metric: Similarity) -> Self {
        Self { fingerprints, metric }
    }

    pub fn metric(&self) -> Similarity {
        self.metric
    }
}

impl DistanceOracle for FingerprintOracle {

    fn len(&self) -> usize {
        self.fingerprints.len()
    }

    fn distance(&self, i: usize, j: usize) -> f64 {

        assert!(
            i < self.fingerprints.len() && j < self.fingerprints.len(),
            "distance({}, {}) asked of an oracle over {} candidates",
            i,
            j,
            self.fingerprints.len()
        );

        if i == j {
            return 0.0;
        }

        self.metric.distance(&self.fingerprints[i], &self.fingerprints[j])
    }
}
