//! Turning raw files into a list of graph samples.

use super::config::{DatasetConfig, ProcessingStrategy};
use super::definition::DatasetDefinition;
use super::error::Error;
use crate::featurize::{self, Vocabulary, find_overlap};
use crate::io::{self, cache, sdf, targets::TargetTable};
use crate::model::graph::GraphSample;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// Why a source record did not make it into the collection.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// The SDF record could not be parsed.
    Malformed(String),
    /// Two atoms share a position.
    Degenerate { first: usize, second: usize },
    /// Rejected by the caller's pre-filter.
    Filtered,
}

/// Progress hooks for long-running processing.
pub trait ProcessObserver {
    /// Called once with the number of source records, when known.
    fn on_start(&mut self, _total: Option<usize>) {}
    fn on_record(&mut self, _index: usize) {}
    fn on_skip(&mut self, _index: usize, _reason: &SkipReason) {}
    fn on_finish(&mut self, _report: &ProcessReport) {}
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ProcessObserver for NoopObserver {}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessReport {
    pub records: usize,
    pub kept: usize,
    pub malformed: usize,
    pub degenerate: usize,
    pub filtered: usize,
}

impl ProcessReport {
    fn skip(&mut self, index: usize, reason: SkipReason, observer: &mut dyn ProcessObserver) {
        match reason {
            SkipReason::Malformed(_) => self.malformed += 1,
            SkipReason::Degenerate { .. } => self.degenerate += 1,
            SkipReason::Filtered => self.filtered += 1,
        }
        observer.on_skip(index, &reason);
    }
}

/// Raw files the strategy needs, in the order they are read.
pub fn raw_paths(
    definition: &DatasetDefinition,
    strategy: ProcessingStrategy,
    raw_dir: &Path,
) -> Vec<PathBuf> {
    match strategy {
        ProcessingStrategy::Encode => vec![
            raw_dir.join(&definition.sdf_file),
            raw_dir.join(&definition.csv_file),
        ],
        ProcessingStrategy::Prebuilt => vec![raw_dir.join(&definition.prebuilt_file)],
    }
}

/// Everything that shapes the cached samples, as a comparable string.
pub fn fingerprint(
    definition: &DatasetDefinition,
    vocab: &Vocabulary,
    variant: &str,
    config: &DatasetConfig,
) -> String {
    let targets = &definition.targets;
    format!(
        "{}/{}/{}/{}/{}/{}/{:?}:{}:{:?}",
        definition.name,
        variant,
        config.strategy,
        config.perception,
        definition.degeneracy,
        vocab,
        targets.kind,
        targets.first,
        targets.count,
    )
}

fn keep_sample(
    sample: GraphSample,
    index: usize,
    config: &DatasetConfig,
    report: &mut ProcessReport,
    observer: &mut dyn ProcessObserver,
) -> Option<GraphSample> {
    if config.pre_filter.as_ref().is_some_and(|f| !f(&sample)) {
        report.skip(index, SkipReason::Filtered, observer);
        return None;
    }
    let sample = match &config.pre_transform {
        Some(t) => t(sample),
        None => sample,
    };
    report.kept += 1;
    Some(sample)
}

/// Reads the SDF and CSV raw files and encodes every usable molecule.
///
/// Targets are paired with records by source position before any record is
/// dropped, so `idx` and `y` of a kept sample always refer to the same molecule.
pub fn encode(
    definition: &DatasetDefinition,
    vocab: &Vocabulary,
    raw_dir: &Path,
    config: &DatasetConfig,
    observer: &mut dyn ProcessObserver,
) -> Result<(Vec<GraphSample>, ProcessReport), Error> {
    let sdf_path = raw_dir.join(&definition.sdf_file);
    let csv_path = raw_dir.join(&definition.csv_file);

    let table = TargetTable::read(&csv_path, &definition.targets)?;
    let total = sdf::count_records(&sdf_path)?;
    if total > table.len() {
        return Err(Error::TargetMismatch {
            records: total,
            rows: table.len(),
        });
    }
    if total < table.len() {
        warn!(
            "{} has {} target rows but only {total} molecules; extra rows are ignored",
            csv_path.display(),
            table.len()
        );
    }

    info!("Processing {total} molecules from {}", sdf_path.display());
    observer.on_start(Some(total));

    let mut report = ProcessReport::default();
    let mut samples = Vec::with_capacity(total);
    let reader = sdf::SdfReader::open(&sdf_path)?.with_perception(config.perception);

    for (i, result) in reader.enumerate() {
        observer.on_record(i);
        report.records += 1;

        let record = match result {
            Ok(record) => record,
            Err(e @ io::Error::Io { .. }) => return Err(e.into()),
            Err(e) => {
                warn!("Skipping molecule {i}: {e}");
                report.skip(i, SkipReason::Malformed(e.to_string()), observer);
                continue;
            }
        };

        let positions = record.positions_f32();
        if definition.degeneracy.is_degenerate(&positions) {
            warn!(
                "Skipping molecule {} as it contains overlapping atoms.",
                record.name()
            );
            let (first, second) = find_overlap(&positions).unwrap_or_default();
            report.skip(i, SkipReason::Degenerate { first, second }, observer);
            continue;
        }

        let row = table.row(i).ok_or(Error::TargetMismatch {
            records: i + 1,
            rows: table.len(),
        })?;
        let sample = featurize::featurize(&record, vocab, row, i)
            .map_err(|source| Error::Featurize { index: i, source })?;

        if let Some(sample) = keep_sample(sample, i, config, &mut report, observer) {
            samples.push(sample);
        }
    }

    debug!("{report:?}");
    observer.on_finish(&report);
    Ok((samples, report))
}

/// Loads the pre-encoded raw sample list instead of encoding.
pub fn prebuilt(
    definition: &DatasetDefinition,
    raw_dir: &Path,
    config: &DatasetConfig,
    observer: &mut dyn ProcessObserver,
) -> Result<(Vec<GraphSample>, ProcessReport), Error> {
    warn!(
        "Using a pre-processed version of the {} dataset; use the encode strategy to process the raw data instead.",
        definition.name
    );
    let loaded = cache::read_prebuilt(raw_dir.join(&definition.prebuilt_file))?;
    observer.on_start(Some(loaded.len()));

    let mut report = ProcessReport::default();
    let mut samples = Vec::with_capacity(loaded.len());
    for (i, sample) in loaded.into_iter().enumerate() {
        observer.on_record(i);
        report.records += 1;
        if let Some(sample) = keep_sample(sample, i, config, &mut report, observer) {
            samples.push(sample);
        }
    }

    observer.on_finish(&report);
    Ok((samples, report))
}
