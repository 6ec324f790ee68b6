//! Run configuration, read from and written to YAML.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::fingerprint::Similarity;

/// How lines of the input store are split into records.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SupplierOptions {
    /// Skip the first line as a header.
    pub title_line: bool,
    /// Every character in here separates columns.
    pub delimiter: String,
    pub smiles_column: usize,
    pub name_column: usize,
}

impl Default for SupplierOptions {
    fn default() -> Self {
        Self {
            title_line: true,
            delimiter: " \t".to_string(),
            smiles_column: 0,
            name_column: 1,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct WriterOptions {
    pub include_header: bool,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self { include_header: true }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PickerConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    /// Records per window.
    pub pool_size: usize,
    /// Picks per window.
    pub pick_size: usize,
    pub num_iterations: usize,
    /// Fingerprint radius.
    pub radius: u32,
    pub seed: u64,
    pub metric: Similarity,
    pub supplier: SupplierOptions,
    pub writer: WriterOptions,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("ZINC_for-sale_subset.txt"),
            output_path: PathBuf::from("output/ZINC_for-sale_picked_subset.txt"),
            pool_size: 44000,
            pick_size: 1000,
            num_iterations: 500,
            radius: 3,
            seed: 23,
            metric: Similarity::Dice,
            supplier: SupplierOptions::default(),
            writer: WriterOptions::default(),
        }
    }
}

impl PickerConfig {

    pub fn from_file<P: AsRef<Path>>(filename: P) -> Result<Self, Error> {

        let serialized = std::fs::read_to_string(filename)?;
        let deserialized: Self = serde_yaml::from_str(&serialized)?;

        return Ok(deserialized);
    }

    pub fn to_file<P: AsRef<Path>>(&self, filename: P) -> Result<(), Error> {

        let serialized = serde_yaml::to_string(&self)?;
        let mut file = File::create(filename)?;
        file.write_all(serialized.as_bytes())?;

        Ok(())
    }

    pub fn validate(&self) -> Result<(), Error> {

        if self.pool_size == 0 {
            return Err(Error::InvalidConfig("pool_size must be at least 1".to_string()));
        }

        if self.supplier.smiles_column == self.supplier.name_column {
            return Err(Error::InvalidConfig(format!(
                "smiles_column and name_column are both {}",
                self.supplier.smiles_column
            )));
        }

        if self.supplier.delimiter.is_empty() {
            return Err(Error::InvalidConfig("delimiter must not be empty".to_string()));
        }

        Ok(())
    }

    /// Number of input records the run will look at.
    pub fn records_covered(&self) -> usize {
        self.pool_size.saturating_mul(self.num_iterations)
    }
}
