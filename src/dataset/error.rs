//! Error types for dataset preparation and access.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while opening, building or reading a dataset.
///
/// Lower-layer failures are wrapped through `#[from]`, so `?` works across the
/// reader, encoder and cache layers.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading raw inputs, downloading or touching the cache failed.
    #[error(transparent)]
    Io(#[from] crate::io::Error),

    /// A molecule could not be encoded with the dataset's vocabularies.
    #[error("molecule {index} could not be encoded: {source}")]
    Featurize {
        /// Zero-based source position of the molecule in the SDF file.
        index: usize,
        #[source]
        source: crate::featurize::Error,
    },

    /// A dataset definition could not be parsed or is inconsistent.
    #[error("invalid dataset definition: {0}")]
    SpecParse(String),

    #[error("unknown dataset '{name}'; available: {}", .choices.join(", "))]
    UnknownDataset { name: String, choices: Vec<String> },

    #[error("unknown variant '{variant}' for dataset '{dataset}'; available: {}", .choices.join(", "))]
    UnknownVariant {
        dataset: String,
        variant: String,
        choices: Vec<String>,
    },

    /// The dataset needs an explicit label and none was given.
    #[error("dataset '{dataset}' requires a label; choose one of: {}", .choices.join(", "))]
    MissingLabel {
        dataset: String,
        choices: Vec<String>,
    },

    #[error("unknown label '{label}'; choose one of: {}", .choices.join(", "))]
    UnknownLabel { label: String, choices: Vec<String> },

    /// A raw input is absent and could not be downloaded.
    #[error("raw file '{}' is missing", .0.display())]
    MissingRawFile(PathBuf),

    /// The SDF file holds more molecules than the CSV has target rows.
    #[error("SDF has {records} records but the target table only has {rows} rows")]
    TargetMismatch { records: usize, rows: usize },

    #[error("sample index {index} is out of range for {len} samples")]
    IndexOutOfRange { index: usize, len: usize },

    /// A requested target column is not carried by the samples.
    #[error("target column {column} is out of range for {width} target columns")]
    ColumnOutOfRange { column: usize, width: usize },
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::SpecParse(e.to_string())
    }
}
