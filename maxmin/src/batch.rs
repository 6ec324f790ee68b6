//! Windowed picking over a corpus too large to fingerprint at once.
//!
//! The corpus is cut into consecutive, non-overlapping windows of
//! `pool_size` records. Each window is loaded, fingerprinted, picked from and
//! written out on its own; nothing of it outlives [`BatchOrchestrator::process_window`].

use std::fmt;
use std::ops::Range;

use log::{info, warn};

use crate::config::PickerConfig;
use crate::data::{Entry, Record};
use crate::distance::FingerprintOracle;
use crate::error::Error;
use crate::fingerprint::{Encoder, MorganEncoder, Similarity};
use crate::io::{CorpusSource, ResultSink};
use crate::picker;

/// Half-open index range `[lower, upper)` over the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub number: usize,
    pub lower: usize,
    pub upper: usize,
}

impl Window {

    pub fn width(&self) -> usize {
        self.upper - self.lower
    }

    pub fn range(&self) -> Range<usize> {
        self.lower..self.upper
    }
}

/// The `count` windows of width `pool_size`, starting at index 0.
#[derive(Debug, Clone)]
pub struct Windows {
    pool_size: usize,
    next: usize,
    count: usize,
}

impl Windows {

    pub fn new(pool_size: usize, count: usize) -> Self {
        Self { pool_size, next: 0, count }
    }
}

impl Iterator for Windows {
    type Item = Window;

    fn next(&mut self) -> Option<Window> {

        if self.next >= self.count {
            return None;
        }

        let lower = self.next.saturating_mul(self.pool_size);
        let window = Window {
            number: self.next,
            lower,
            upper: lower.saturating_add(self.pool_size),
        };
        self.next += 1;

        return Some(window);
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Windows {}

/// What happened to one window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowReport {
    pub window: Window,
    /// Records requested from the corpus.
    pub scanned: usize,
    /// Window positions past the end of the corpus.
    pub missing: usize,
    pub invalid: usize,
    pub candidates: usize,
    pub picked: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStatistics {
    pub windows_processed: usize,
    pub records_scanned: usize,
    pub missing_records: usize,
    pub invalid_records: usize,
    /// Sum of the actual pick counts.
    pub records_picked: usize,
    pub pick_size: usize,
    pub num_iterations: usize,
}

impl RunStatistics {

    fn add(&mut self, report: &WindowReport) {
        self.windows_processed += 1;
        self.records_scanned += report.scanned;
        self.missing_records += report.missing;
        self.invalid_records += report.invalid;
        self.records_picked += report.picked;
    }

    /// `pick_size * num_iterations - invalid_records`, the figure older runs
    /// reported. Only exact when every window had at least `pick_size` valid
    /// candidates.
    pub fn legacy_picked_estimate(&self) -> i64 {
        (self.pick_size as i64)
            .saturating_mul(self.num_iterations as i64)
            .saturating_sub(self.invalid_records as i64)
    }
}

impl fmt::Display for RunStatistics {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Picked {} out of {} records in {} iterations, while picking {} in each iteration ({} invalid, {} missing)",
            self.records_picked,
            self.records_scanned,
            self.windows_processed,
            self.pick_size,
            self.invalid_records,
            self.missing_records,
        )
    }
}

pub struct BatchOrchestrator<S, W, E = MorganEncoder> {
    pool_size: usize,
    pick_size: usize,
    num_iterations: usize,
    seed: u64,
    metric: Similarity,
    source: S,
    sink: W,
    encoder: E,
    stats: RunStatistics,
}

impl<S: CorpusSource, W: ResultSink> BatchOrchestrator<S, W, MorganEncoder> {

    pub fn new(config: &PickerConfig, source: S, sink: W) -> Self {
        Self::with_encoder(config, source, sink, MorganEncoder::new(config.radius))
    }
}

impl<S: CorpusSource, W: ResultSink, E: Encoder> BatchOrchestrator<S, W, E> {

    pub fn with_encoder(config: &PickerConfig, source: S, sink: W, encoder: E) -> Self {

        let stats = RunStatistics {
            pick_size: config.pick_size,
            num_iterations: config.num_iterations,
            ..RunStatistics::default()
        };

        Self {
            pool_size: config.pool_size,
            pick_size: config.pick_size,
            num_iterations: config.num_iterations,
            seed: config.seed,
            metric: config.metric,
            source,
            sink,
            encoder,
            stats,
        }
    }

    pub fn windows(&self) -> Windows {
        Windows::new(self.pool_size, self.num_iterations)
    }

    pub fn statistics(&self) -> &RunStatistics {
        &self.stats
    }

    pub fn sink(&self) -> &W {
        &self.sink
    }

    /// Loads, fingerprints and picks one window, then writes the picks.
    pub fn process_window(&mut self, window: Window) -> Result<WindowReport, Error> {

        let end = window.upper.min(self.source.len()).max(window.lower);
        let scanned = end - window.lower;
        let missing = window.width() - scanned;

        if missing > 0 {
            warn!(
                "Window {} [{}, {}) extends past the end of the corpus ({} records), {} positions missing",
                window.number, window.lower, window.upper, self.source.len(), missing
            );
        }

        let (records, invalid) = self.load_candidates(window.lower..end)?;

        let fingerprints = records.iter().map(|r| self.encoder.encode(r)).collect();
        let oracle = FingerprintOracle::new(fingerprints, self.metric);

        let picks = picker::pick(&oracle, self.pick_size, self.seed);

        for &i in picks.iter() {
            self.sink.write(&records[i])?;
        }

        let report = WindowReport {
            window,
            scanned,
            missing,
            invalid,
            candidates: records.len(),
            picked: picks.len(),
        };

        info!(
            "Window {} [{}, {}): {} loaded, {} invalid, {} picked",
            window.number, window.lower, window.upper, report.candidates, report.invalid, report.picked
        );

        self.stats.add(&report);

        Ok(report)
    }

    /// One pass over `range`, keeping valid records in order and counting the rest.
    fn load_candidates(&mut self, range: Range<usize>) -> Result<(Vec<Record>, usize), Error> {

        let mut records: Vec<Record> = Vec::with_capacity(range.len());
        let mut invalid: usize = 0;

        for index in range {
            match self.source.get(index)? {
                Entry::Valid(record) => records.push(record),
                Entry::Invalid => invalid += 1,
            }
        }

        Ok((records, invalid))
    }

    /// Processes every window in order, then [`finish`](Self::finish)es.
    pub fn run(&mut self) -> Result<RunStatistics, Error> {

        for window in self.windows() {
            self.process_window(window)?;
        }

        self.finish()
    }

    /// Flushes the sink and reports the run.
    pub fn finish(&mut self) -> Result<RunStatistics, Error> {

        self.sink.flush()?;

        info!("{}", self.stats);

        let legacy = self.stats.legacy_picked_estimate();
        if legacy != self.stats.records_picked as i64 {
            warn!(
                "Picked {} records, but pick_size * num_iterations - invalid gives {}",
                self.stats.records_picked, legacy
            );
        }

        Ok(self.stats.clone())
    }
}
