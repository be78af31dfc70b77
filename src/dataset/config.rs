//! Configuration for opening a dataset.

use super::labels::TargetChoice;
use crate::chem::Perception;
use crate::model::graph::GraphSample;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Keeps a sample when it returns `true`.
pub type SampleFilter = Box<dyn Fn(&GraphSample) -> bool>;

pub type SampleTransform = Box<dyn Fn(GraphSample) -> GraphSample>;

/// Where processed samples come from when no usable cache exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessingStrategy {
    /// Read the SDF and CSV raw files and encode every molecule.
    #[default]
    Encode,
    /// Load a list of already encoded samples shipped as a raw file.
    Prebuilt,
}

impl fmt::Display for ProcessingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessingStrategy::Encode => write!(f, "encode"),
            ProcessingStrategy::Prebuilt => write!(f, "prebuilt"),
        }
    }
}

impl FromStr for ProcessingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "encode" => Ok(ProcessingStrategy::Encode),
            "prebuilt" => Ok(ProcessingStrategy::Prebuilt),
            _ => Err(format!("unknown processing strategy '{s}'")),
        }
    }
}

/// Settings for [`MoleculeDataset::open`](super::MoleculeDataset::open).
///
/// Raw files live under `root/raw`, the cache under `root/processed`.
///
/// ```
/// use molgraph::{DatasetConfig, TargetChoice};
///
/// let config = DatasetConfig {
///     root: "data/sider".into(),
///     targets: TargetChoice::Label("Cardiac disorders".to_string()),
///     download: false,
///     ..Default::default()
/// };
/// assert!(config.variant.is_none());
/// ```
pub struct DatasetConfig {
    pub root: PathBuf,

    /// Raw data variant; the definition's default when `None`.
    pub variant: Option<String>,

    pub strategy: ProcessingStrategy,

    /// Rebuild the cache even when a valid one exists.
    pub force_reload: bool,

    /// Allow fetching missing raw files from the variant URL.
    pub download: bool,

    pub perception: Perception,

    pub targets: TargetChoice,

    /// Dataset catalog in TOML format.
    ///
    /// If `None`, uses the embedded `datasets.toml`.
    pub definitions: Option<String>,

    /// Applied to every encoded sample before caching.
    pub pre_filter: Option<SampleFilter>,

    /// Applied to every kept sample before caching.
    pub pre_transform: Option<SampleTransform>,

    /// Applied on every access, before target selection.
    pub transform: Option<SampleTransform>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("data"),
            variant: None,
            strategy: ProcessingStrategy::default(),
            force_reload: false,
            download: true,
            perception: Perception::default(),
            targets: TargetChoice::default(),
            definitions: None,
            pre_filter: None,
            pre_transform: None,
            transform: None,
        }
    }
}

impl fmt::Debug for DatasetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasetConfig")
            .field("root", &self.root)
            .field("variant", &self.variant)
            .field("strategy", &self.strategy)
            .field("force_reload", &self.force_reload)
            .field("download", &self.download)
            .field("perception", &self.perception)
            .field("targets", &self.targets)
            .field("definitions", &self.definitions.as_ref().map(|_| ".."))
            .field("pre_filter", &self.pre_filter.is_some())
            .field("pre_transform", &self.pre_transform.is_some())
            .field("transform", &self.transform.is_some())
            .finish()
    }
}
