//! Circular count fingerprints and the similarity measures compared on them.
//!
//! Every atom gets an identifier hashed from its local invariants. Each round
//! rehashes that identifier together with the sorted identifiers of its bonded
//! neighbours, so round `r` describes the environment of radius `r`. All
//! identifiers from rounds `0..=radius` are folded to 32 bits and counted.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh64::xxh64;

use crate::data::Record;
use crate::molecule::Molecule;

const HASH_SEED: u64 = 0x2f0b_7a1d_c3e5_9a41;

/// Maps a record to the vector compared by the picker.
pub trait Encoder {
    fn encode(&self, record: &Record) -> CountFingerprint;
}

/// Sparse feature -> count vector, features kept sorted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CountFingerprint {
    features: Vec<(u32, u32)>,
    total: u64,
}

impl CountFingerprint {

    pub fn from_features<I: IntoIterator<Item = u32>>(features: I) -> Self {

        let mut counts: BTreeMap<u32, u32> = BTreeMap::new();
        for feature in features {
            *counts.entry(feature).or_insert(0) += 1;
        }

        let total = counts.values().map(|c| *c as u64).sum();

        return Self {
            features: counts.into_iter().collect(),
            total,
        };
    }

    pub fn features(&self) -> &[(u32, u32)] {
        &self.features
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Sum over shared features of the smaller count.
    pub fn intersection(&self, other: &CountFingerprint) -> u64 {

        let mut a = self.features.iter().peekable();
        let mut b = other.features.iter().peekable();
        let mut shared: u64 = 0;

        while let (Some(&&(fa, ca)), Some(&&(fb, cb))) = (a.peek(), b.peek()) {
            match fa.cmp(&fb) {
                std::cmp::Ordering::Less => { a.next(); },
                std::cmp::Ordering::Greater => { b.next(); },
                std::cmp::Ordering::Equal => {
                    shared += ca.min(cb) as u64;
                    a.next();
                    b.next();
                },
            }
        }

        shared
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Similarity {
    #[default]
    Dice,
    Tanimoto,
}

impl Similarity {

    /// Similarity in `[0, 1]`. Two empty fingerprints count as identical.
    pub fn similarity(self, a: &CountFingerprint, b: &CountFingerprint) -> f64 {

        let shared = a.intersection(b) as f64;
        let total = (a.total() + b.total()) as f64;

        match self {
            Similarity::Dice => {
                if total == 0.0 {
                    return 1.0;
                }
                2.0 * shared / total
            },
            Similarity::Tanimoto => {
                let union = total - shared;
                if union == 0.0 {
                    return 1.0;
                }
                shared / union
            },
        }
    }

    pub fn distance(self, a: &CountFingerprint, b: &CountFingerprint) -> f64 {
        1.0 - self.similarity(a, b)
    }
}

impl FromStr for Similarity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dice" => Ok(Similarity::Dice),
            "tanimoto" => Ok(Similarity::Tanimoto),
            other => Err(format!("unknown similarity metric: {}", other)),
        }
    }
}

impl fmt::Display for Similarity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Similarity::Dice => write!(f, "dice"),
            Similarity::Tanimoto => write!(f, "tanimoto"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MorganEncoder {
    radius: u32,
}

impl MorganEncoder {

    pub fn new(radius: u32) -> Self {
        Self { radius }
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn fingerprint(&self, molecule: &Molecule) -> CountFingerprint {

        let n = molecule.num_atoms();

        let mut identifiers: Vec<u64> = (0..n).map(|i| atom_invariant(molecule, i)).collect();
        let mut features: Vec<u32> = Vec::with_capacity(n * (self.radius as usize + 1));
        features.extend(identifiers.iter().map(|id| fold(*id)));

        let mut buf: Vec<u8> = Vec::new();
        for round in 1..=self.radius {

            let next: Vec<u64> = (0..n)
                .map(|atom| {
                    let mut environment: Vec<(u8, u64)> = molecule
                        .neighbors(atom)
                        .iter()
                        .map(|nb| (molecule.bonds()[nb.bond].order.half_units(), identifiers[nb.atom]))
                        .collect();
                    environment.sort_unstable();

                    buf.clear();
                    buf.extend_from_slice(&round.to_le_bytes());
                    buf.extend_from_slice(&identifiers[atom].to_le_bytes());
                    for (bond, id) in environment {
                        buf.push(bond);
                        buf.extend_from_slice(&id.to_le_bytes());
                    }
                    xxh64(&buf, HASH_SEED)
                })
                .collect();

            features.extend(next.iter().map(|id| fold(*id)));
            identifiers = next;
        }

        CountFingerprint::from_features(features)
    }
}

impl Encoder for MorganEncoder {
    fn encode(&self, record: &Record) -> CountFingerprint {
        self.fingerprint(&record.molecule)
    }
}

fn atom_invariant(molecule: &Molecule, index: usize) -> u64 {

    let atom = &molecule.atoms()[index];
    let degree = u8::try_from(molecule.degree(index)).unwrap_or(u8::MAX);
    let isotope = atom.isotope.unwrap_or(0).to_le_bytes();

    let bytes = [
        atom.atomic_number,
        degree,
        atom.total_hydrogens(),
        atom.charge as u8,
        atom.in_ring as u8,
        atom.aromatic as u8,
        isotope[0],
        isotope[1],
    ];

    xxh64(&bytes, HASH_SEED)
}

fn fold(id: u64) -> u32 {
    (id ^ (id >> 32)) as u32
}
