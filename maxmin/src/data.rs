use crate::molecule::{Molecule, SmilesError};

/// A structure read from the input store together with its parsed graph.
#[derive(Debug, PartialEq, Clone)]
pub struct Record {
    /// Position in the input store, counting from the first record after any title line.
    pub index: usize,
    pub smiles: String,
    pub name: Option<String>,
    pub molecule: Molecule,
}

impl Record {

    pub fn new(index: usize, smiles: String, name: Option<String>) -> Result<Self, SmilesError> {

        let molecule = Molecule::from_smiles(&smiles)?;

        return Ok(Self {
            index,
            smiles,
            name,
            molecule,
        });
    }

    pub fn from_smiles(index: usize, smiles: &str) -> Result<Self, SmilesError> {
        Self::new(index, smiles.to_string(), None)
    }

    /// Name written to the output store. Unnamed records fall back to their index.
    pub fn display_name(&self) -> String {

        match &self.name {
            Some(name) => name.clone(),
            None => self.index.to_string(),
        }
    }

    pub fn to_line(&self) -> String {
        format!("{} {}", self.smiles, self.display_name())
    }
}

/// What a corpus hands back for one index.
#[derive(Debug, PartialEq, Clone)]
pub enum Entry {
    Valid(Record),
    Invalid,
}

impl Entry {

    pub fn is_valid(&self) -> bool {
        matches!(self, Entry::Valid(_))
    }

    pub fn into_record(self) -> Option<Record> {
        match self {
            Entry::Valid(record) => Some(record),
            Entry::Invalid => None,
        }
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn make_record() {

        let record = Record::new(3, "C1=CC=C(C=C1)C(=O)O".to_string(), Some("benzoic_acid".to_string())).unwrap();

        assert_eq!(record.molecule.num_atoms(), 9);
        assert_eq!(record.to_line(), "C1=CC=C(C=C1)C(=O)O benzoic_acid");
    }

    #[test]
    fn unnamed_record_uses_index() {

        let record = Record::from_smiles(17, "CCO").unwrap();

        assert_eq!(record.display_name(), "17");
        assert_eq!(record.to_line(), "CCO 17");
    }

    #[test]
    fn entry_unwraps_only_valid() {

        let record = Record::from_smiles(0, "C").unwrap();

        assert!(Entry::Valid(record.clone()).is_valid());
        assert_eq!(Entry::Valid(record.clone()).into_record(), Some(record));
        assert!(!Entry::Invalid.is_valid());
        assert_eq!(Entry::Invalid.into_record(), None);
    }
}
