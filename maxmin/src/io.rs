//! Reading records from and writing picks to line-oriented SMILES files.
//!
//! The input is never loaded whole. Opening it makes one pass that counts
//! records and remembers the byte offset of every `stride`-th one, so any
//! record can be reached with one seek and at most `stride - 1` skipped lines.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::config::{SupplierOptions, WriterOptions};
use crate::data::{Entry, Record};
use crate::error::Error;

pub const CHECKPOINT_STRIDE: usize = 1024;

/// Index-addressable access to the records of an input store.
pub trait CorpusSource {

    fn len(&self) -> usize;

    /// `Ok(Entry::Invalid)` for a record that cannot be parsed. `Err` only for
    /// failures of the store itself or an index past `len()`.
    fn get(&mut self, index: usize) -> Result<Entry, Error>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Receives the picked records in pick order.
pub trait ResultSink {

    fn write(&mut self, record: &Record) -> Result<(), Error>;

    fn flush(&mut self) -> Result<(), Error>;
}

impl ResultSink for Vec<Record> {

    fn write(&mut self, record: &Record) -> Result<(), Error> {
        self.push(record.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

#[derive(Debug)]
pub struct SmilesSupplier {
    path: PathBuf,
    reader: BufReader<File>,
    options: SupplierOptions,
    checkpoints: Vec<u64>,
    stride: usize,
    num_records: usize,
    /// Index of the record the reader currently sits in front of, if known.
    position: Option<usize>,
    line: Vec<u8>,
}

impl SmilesSupplier {

    pub fn open<P: AsRef<Path>>(path: P, options: SupplierOptions) -> Result<Self, Error> {
        Self::open_with_stride(path, options, CHECKPOINT_STRIDE)
    }

    fn open_with_stride<P: AsRef<Path>>(path: P, options: SupplierOptions, stride: usize) -> Result<Self, Error> {

        assert!(stride > 0);

        let path = path.as_ref().to_path_buf();

        let file = OpenOptions::new()
                    .read(true)
                    .open(&path)
                    .map_err(|source| Error::OpenInput { path: path.clone(), source })?;

        let mut reader = BufReader::new(file);
        let mut line: Vec<u8> = Vec::new();
        let mut offset: u64 = 0;

        if options.title_line {
            offset += reader.read_until(b'\n', &mut line)? as u64;
        }

        let mut checkpoints: Vec<u64> = Vec::new();
        let mut num_records: usize = 0;

        loop {
            line.clear();
            let read = reader.read_until(b'\n', &mut line)?;
            if read == 0 {
                break;
            }

            if num_records % stride == 0 {
                checkpoints.push(offset);
            }

            offset += read as u64;
            num_records += 1;
        }

        info!("Indexed {} records in {:?}", num_records, path);

        return Ok(Self {
            path,
            reader,
            options,
            checkpoints,
            stride,
            num_records,
            position: None,
            line,
        });
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn seek_to(&mut self, index: usize) -> Result<(), Error> {

        let start = self.checkpoints[index / self.stride];
        self.reader.seek(SeekFrom::Start(start))?;

        for _ in 0..(index % self.stride) {
            self.line.clear();
            self.reader.read_until(b'\n', &mut self.line)?;
        }

        self.position = Some(index);
        Ok(())
    }

    fn parse_line(&self, index: usize) -> Entry {

        let text = match std::str::from_utf8(&self.line) {
            Ok(text) => text.trim_end_matches(&['\n', '\r'][..]),
            Err(_) => {
                debug!("Record {} is not valid UTF-8", index);
                return Entry::Invalid;
            },
        };

        let delimiter = &self.options.delimiter;
        let fields: Vec<&str> = text
            .split(|c: char| delimiter.contains(c))
            .filter(|f| !f.is_empty())
            .collect();

        let smiles = match fields.get(self.options.smiles_column) {
            Some(smiles) => smiles.to_string(),
            None => {
                debug!("Record {} has no SMILES column: {:?}", index, text);
                return Entry::Invalid;
            },
        };
        let name = fields.get(self.options.name_column).map(|s| s.to_string());

        match Record::new(index, smiles, name) {
            Ok(record) => Entry::Valid(record),
            Err(e) => {
                debug!("Record {} is invalid ({}): {:?}", index, e, text);
                Entry::Invalid
            },
        }
    }
}

impl CorpusSource for SmilesSupplier {

    fn len(&self) -> usize {
        self.num_records
    }

    fn get(&mut self, index: usize) -> Result<Entry, Error> {

        if index >= self.num_records {
            return Err(Error::IndexOutOfRange { index, len: self.num_records });
        }

        if self.position != Some(index) {
            self.seek_to(index)?;
        }

        self.line.clear();
        self.reader.read_until(b'\n', &mut self.line)?;
        self.position = Some(index + 1);

        Ok(self.parse_line(index))
    }
}

#[derive(Debug)]
pub struct SmilesWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    written: usize,
}

impl SmilesWriter {

    /// Creates (or truncates) the output store, making parent directories as needed.
    pub fn create<P: AsRef<Path>>(path: P, options: &WriterOptions) -> Result<Self, Error> {

        let path = path.as_ref().to_path_buf();
        let open_error = |source| Error::OpenOutput { path: path.clone(), source };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(open_error)?;
        }

        let file = OpenOptions::new()
                    .create(true)
                    .write(true)
                    .truncate(true)
                    .open(&path)
                    .map_err(open_error)?;

        let mut writer = BufWriter::new(file);
        if options.include_header {
            writeln!(writer, "SMILES Name")?;
        }

        Ok(Self {
            path,
            writer,
            written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records written so far, header excluded.
    pub fn written(&self) -> usize {
        self.written
    }
}

impl ResultSink for SmilesWriter {

    fn write(&mut self, record: &Record) -> Result<(), Error> {
        writeln!(self.writer, "{}", record.to_line())?;
        self.written += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Error> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod test {

    use super::*;
    use tempfile::TempDir;

    fn write_input(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("input.smi");
        fs::write(&path, contents).unwrap();
        path
    }

    fn smiles_of(entry: Entry) -> Option<String> {
        entry.into_record().map(|r| r.smiles)
    }

    #[test]
    fn reads_title_names_and_invalid_lines() {

        let dir = tempfile::tempdir().unwrap();
        let path = write_input(&dir, "SMILES Name\nCCO ethanol\nc1ccccc1\tbenzene\nC1CC broken\n\nCCN\n");

        let mut supplier = SmilesSupplier::open(&path, SupplierOptions::default()).unwrap();
        assert_eq!(supplier.len(), 5);

        let ethanol = supplier.get(0).unwrap().into_record().unwrap();
        assert_eq!(ethanol.index, 0);
        assert_eq!(ethanol.smiles, "CCO");
        assert_eq!(ethanol.name.as_deref(), Some("ethanol"));

        let benzene = supplier.get(1).unwrap().into_record().unwrap();
        assert_eq!(benzene.name.as_deref(), Some("benzene"));

        assert_eq!(supplier.get(2).unwrap(), Entry::Invalid);
        assert_eq!(supplier.get(3).unwrap(), Entry::Invalid);

        let unnamed = supplier.get(4).unwrap().into_record().unwrap();
        assert_eq!(unnamed.smiles, "CCN");
        assert_eq!(unnamed.name, None);
    }

    #[test]
    fn without_title_line_first_line_is_a_record() {

        let dir = tempfile::tempdir().unwrap();
        let path = write_input(&dir, "CCO a\r\nCC b\r\n");

        let options = SupplierOptions { title_line: false, ..SupplierOptions::default() };
        let mut supplier = SmilesSupplier::open(&path, options).unwrap();

        assert_eq!(supplier.len(), 2);
        let record = supplier.get(1).unwrap().into_record().unwrap();
        assert_eq!(record.smiles, "CC");
        assert_eq!(record.name.as_deref(), Some("b"));
    }

    #[test]
    fn custom_columns_and_delimiter() {

        let dir = tempfile::tempdir().unwrap();
        let path = write_input(&dir, "id,smiles\nZINC1,CCO\nZINC2,\n");

        let options = SupplierOptions {
            title_line: true,
            delimiter: ",".to_string(),
            smiles_column: 1,
            name_column: 0,
        };
        let mut supplier = SmilesSupplier::open(&path, options).unwrap();

        let record = supplier.get(0).unwrap().into_record().unwrap();
        assert_eq!(record.smiles, "CCO");
        assert_eq!(record.name.as_deref(), Some("ZINC1"));
        assert_eq!(supplier.get(1).unwrap(), Entry::Invalid);
    }

    #[test]
    fn random_access_matches_sequential() {

        let dir = tempfile::tempdir().unwrap();
        let mut contents = "SMILES Name\n".to_string();
        for i in 0..30 {
            contents += &format!("{} mol{}\n", "C".repeat(i % 5 + 1), i);
        }
        let path = write_input(&dir, &contents);

        let mut supplier = SmilesSupplier::open_with_stride(&path, SupplierOptions::default(), 4).unwrap();
        assert_eq!(supplier.len(), 30);

        let sequential: Vec<Option<String>> = (0..30).map(|i| smiles_of(supplier.get(i).unwrap())).collect();

        for i in [29, 0, 13, 12, 4, 3, 27, 28, 5] {
            assert_eq!(smiles_of(supplier.get(i).unwrap()), sequential[i]);
            let record = supplier.get(i).unwrap().into_record().unwrap();
            assert_eq!(record.name, Some(format!("mol{}", i)));
            assert_eq!(record.index, i);
        }
    }

    #[test]
    fn index_past_end_is_an_error() {

        let dir = tempfile::tempdir().unwrap();
        let path = write_input(&dir, "SMILES Name\nC one\n");

        let mut supplier = SmilesSupplier::open(&path, SupplierOptions::default()).unwrap();
        assert!(matches!(supplier.get(1), Err(Error::IndexOutOfRange { index: 1, len: 1 })));
    }

    #[test]
    fn empty_store_has_no_records() {

        let dir = tempfile::tempdir().unwrap();
        let path = write_input(&dir, "SMILES Name\n");

        let supplier = SmilesSupplier::open(&path, SupplierOptions::default()).unwrap();
        assert!(supplier.is_empty());
    }

    #[test]
    fn missing_input_is_fatal() {

        let dir = tempfile::tempdir().unwrap();
        let result = SmilesSupplier::open(dir.path().join("nope.smi"), SupplierOptions::default());
        assert!(matches!(result, Err(Error::OpenInput { .. })));
    }

    #[test]
    fn writer_output_reads_back() {

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/output/picked.smi");

        let records = vec![
            Record::new(4, "CCO".to_string(), Some("ethanol".to_string())).unwrap(),
            Record::from_smiles(9, "c1ccccc1").unwrap(),
        ];

        let mut writer = SmilesWriter::create(&path, &WriterOptions::default()).unwrap();
        for record in records.iter() {
            writer.write(record).unwrap();
        }
        writer.flush().unwrap();
        assert_eq!(writer.written(), 2);

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "SMILES Name\nCCO ethanol\nc1ccccc1 9\n");

        let mut supplier = SmilesSupplier::open(&path, SupplierOptions::default()).unwrap();
        assert_eq!(supplier.len(), 2);
        assert_eq!(smiles_of(supplier.get(1).unwrap()).as_deref(), Some("c1ccccc1"));
    }

    #[test]
    fn writer_without_header() {

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("picked.smi");

        let mut writer = SmilesWriter::create(&path, &WriterOptions { include_header: false }).unwrap();
        writer.write(&Record::from_smiles(0, "C").unwrap()).unwrap();
        writer.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "C 0\n");
    }
}
