//! Cached molecular graph datasets.
//!
//! [`MoleculeDataset::open`] loads the processed cache when it is valid for
//! the current configuration and otherwise fetches raw files, runs the
//! [`pipeline`] and writes a fresh cache. Access goes through [`get`], which
//! applies the caller's transform and then the target selection.
//!
//! [`get`]: MoleculeDataset::get

mod config;
pub mod definition;
mod error;
pub mod labels;
pub mod pipeline;
pub mod stats;

pub use config::{DatasetConfig, ProcessingStrategy, SampleFilter, SampleTransform};
pub use definition::{Catalog, DatasetDefinition};
pub use error::Error;
pub use labels::{TargetChoice, TargetSelector};
pub use pipeline::{NoopObserver, ProcessObserver, ProcessReport, SkipReason};

use crate::io::{self, cache, download};
use crate::model::graph::{Collection, GraphSample};
use log::{info, warn};
use std::path::{Path, PathBuf};

pub struct MoleculeDataset {
    definition: DatasetDefinition,
    variant: String,
    collection: Collection,
    selector: TargetSelector,
    transform: Option<SampleTransform>,
    processed_path: PathBuf,
    report: Option<ProcessReport>,
}

impl std::fmt::Debug for MoleculeDataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoleculeDataset")
            .field("name", &self.definition.name)
            .field("variant", &self.variant)
            .field("len", &self.collection.len())
            .field("selector", &self.selector)
            .field("processed_path", &self.processed_path)
            .finish_non_exhaustive()
    }
}

fn first_missing(paths: &[PathBuf]) -> Option<&PathBuf> {
    paths.iter().find(|p| !p.exists())
}

impl MoleculeDataset {
    /// Opens a dataset by catalog name.
    pub fn open(name: &str, config: DatasetConfig) -> Result<Self, Error> {
        Self::open_observed(name, config, &mut NoopObserver)
    }

    pub fn open_observed(
        name: &str,
        config: DatasetConfig,
        observer: &mut dyn ProcessObserver,
    ) -> Result<Self, Error> {
        let custom;
        let catalog = match config.definitions.as_deref() {
            Some(text) => {
                custom = Catalog::from_toml(text)?;
                &custom
            }
            None => Catalog::builtin(),
        };
        let definition = catalog.get(name)?.clone();
        Self::open_with(definition, config, observer)
    }

    pub fn open_with(
        definition: DatasetDefinition,
        mut config: DatasetConfig,
        observer: &mut dyn ProcessObserver,
    ) -> Result<Self, Error> {
        let variant = config
            .variant
            .clone()
            .unwrap_or_else(|| definition.default_variant.clone());
        let url = definition.variant_url(&variant)?.to_string();
        let vocab = definition.vocabulary()?;
        let selector = labels::resolve(&definition, &config.targets)?;

        let raw_dir = config.root.join("raw");
        let processed_path = config
            .root
            .join("processed")
            .join(definition.processed_file_name(&variant));
        let fingerprint = pipeline::fingerprint(&definition, &vocab, &variant, &config);

        let mut collection = None;
        if processed_path.exists() && !config.force_reload {
            match cache::load(&processed_path, &fingerprint) {
                Ok(loaded) => {
                    info!("Loaded {} samples from {}", loaded.len(), processed_path.display());
                    collection = Some(loaded);
                }
                Err(e @ (io::Error::StaleCache { .. } | io::Error::Cache(_))) => {
                    warn!("Reprocessing {}: {e}", processed_path.display());
                }
                Err(e) => return Err(e.into()),
            }
        }

        let mut report = None;
        let collection = match collection {
            Some(c) => c,
            None => {
                ensure_raw_files(&definition, &config, &url, &raw_dir)?;
                let (samples, processed) = match config.strategy {
                    ProcessingStrategy::Encode => {
                        pipeline::encode(&definition, &vocab, &raw_dir, &config, observer)?
                    }
                    ProcessingStrategy::Prebuilt => {
                        pipeline::prebuilt(&definition, &raw_dir, &config, observer)?
                    }
                };
                let built = Collection::new(samples);
                cache::write(&processed_path, &fingerprint, &built)?;
                info!("Wrote {} samples to {}", built.len(), processed_path.display());
                report = Some(processed);
                built
            }
        };

        if let Some(first) = collection.get(0) {
            selector.validate(first.y.len())?;
        } else if let Some(count) = definition.targets.count {
            selector.validate(count)?;
        }

        Ok(Self {
            definition,
            variant,
            collection,
            selector,
            transform: config.transform.take(),
            processed_path,
            report,
        })
    }

    pub fn definition(&self) -> &DatasetDefinition {
        &self.definition
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn variant(&self) -> &str {
        &self.variant
    }

    pub fn processed_path(&self) -> &Path {
        &self.processed_path
    }

    pub fn selector(&self) -> &TargetSelector {
        &self.selector
    }

    /// Counts from the processing run, `None` when the cache was reused.
    pub fn report(&self) -> Option<&ProcessReport> {
        self.report.as_ref()
    }

    /// The cached samples as stored, without transform or target selection.
    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn len(&self) -> usize {
        self.collection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collection.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<GraphSample, Error> {
        let sample = self
            .collection
            .get(index)
            .ok_or(Error::IndexOutOfRange {
                index,
                len: self.collection.len(),
            })?
            .clone();
        let sample = match &self.transform {
            Some(t) => t(sample),
            None => sample,
        };
        self.selector.apply(sample)
    }

    pub fn iter(&self) -> impl Iterator<Item = Result<GraphSample, Error>> + '_ {
        (0..self.len()).map(|i| self.get(i))
    }

    fn target_values(&self, target: usize) -> Result<Vec<f64>, Error> {
        self.iter()
            .map(|sample| {
                let sample = sample?;
                sample
                    .y
                    .get(target)
                    .map(|&v| f64::from(v))
                    .ok_or(Error::ColumnOutOfRange {
                        column: target,
                        width: sample.y.len(),
                    })
            })
            .collect()
    }

    /// Mean of target `target` (an index into the accessed `y`) over all samples.
    pub fn mean(&self, target: usize) -> Result<f64, Error> {
        Ok(stats::mean(&self.target_values(target)?))
    }

    /// Unbiased standard deviation of target `target` over all samples.
    pub fn std(&self, target: usize) -> Result<f64, Error> {
        Ok(stats::std(&self.target_values(target)?))
    }

    /// Atom reference vector for a source target column, if the dataset has one.
    pub fn atomref(&self, target: usize) -> Option<Vec<f64>> {
        stats::atomref(self.definition.atomref.as_ref()?, target)
    }

    /// Atom reference vector for the single selected target, sized to `max_z`.
    pub fn atomref_for_selection(&self, max_z: usize) -> Option<Vec<f64>> {
        let [target] = self.selector.columns()? else {
            return None;
        };
        let mut values = self.atomref(*target)?;
        values.resize(max_z, 0.0);
        Some(values)
    }
}

fn ensure_raw_files(
    definition: &DatasetDefinition,
    config: &DatasetConfig,
    url: &str,
    raw_dir: &Path,
) -> Result<(), Error> {
    let paths = pipeline::raw_paths(definition, config.strategy, raw_dir);
    let Some(missing) = first_missing(&paths) else {
        return Ok(());
    };
    if !config.download {
        return Err(Error::MissingRawFile(missing.clone()));
    }

    download::fetch(url, definition.archive, raw_dir)?;
    match first_missing(&paths) {
        Some(missing) => Err(Error::MissingRawFile(missing.clone())),
        None => Ok(()),
    }
}
