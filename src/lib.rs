//! A pure Rust library for preparing molecular graph datasets. It reads
//! multi-record SDF conformers with CSV targets, encodes each molecule as a
//! typed graph and caches the resulting collection for graph-learning models.
//!
//! # Features
//!
//! - **SDF supplier** — V2000 CTfile records with charges, data items and
//!   per-record error recovery
//! - **Graph encoding** — One-hot atom types, atomic number, aromaticity,
//!   hybridization and hydrogen counts per node; one-hot bond types per edge
//! - **Degeneracy filtering** — Conformers with coinciding atoms are dropped
//! - **Caching** — Versioned bincode cache keyed on everything that shapes
//!   the encoding
//! - **Built-in datasets** — Lipophilicity (four conformer variants) and SIDER
//!   (27 side-effect labels), defined in TOML
//!
//! # Quick Start
//!
//! Records can be encoded directly, without going through a dataset:
//!
//! ```
//! use molgraph::io::sdf::SdfReader;
//! use molgraph::{Catalog, featurize};
//!
//! let sdf = "\
//! methanol
//!   example
//!
//!   3  2  0  0  0  0  0  0  0  0999 V2000
//!     0.0000    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
//!     1.4000    0.0000    0.0000 O   0  0  0  0  0  0  0  0  0  0  0  0
//!     1.8000    0.9000    0.0000 H   0  0  0  0  0  0  0  0  0  0  0  0
//!   1  2  1  0
//!   2  3  1  0
//! M  END
//! $$$$
//! ";
//!
//! let record = SdfReader::new(sdf.as_bytes()).next().unwrap()?;
//! let vocab = Catalog::builtin().get("lipophilicity")?.vocabulary()?;
//! let sample = featurize(&record, &vocab, &[1.25], 0)?;
//!
//! // 13 atom types plus six scalar features per node
//! assert_eq!(sample.x.len(), 3);
//! assert_eq!(sample.node_feature_dim(), 19);
//!
//! // Two directed edges per bond, sorted by source then destination
//! assert_eq!(sample.edge_index, vec![[0, 1], [1, 0], [1, 2], [2, 1]]);
//! assert_eq!(sample.smiles, "[H]OC");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Whole datasets are opened by name. Raw files are downloaded into
//! `root/raw` when missing and the cache is written to `root/processed`:
//!
//! ```no_run
//! use molgraph::{DatasetConfig, MoleculeDataset, TargetChoice};
//!
//! let sider = MoleculeDataset::open(
//!     "sider",
//!     DatasetConfig {
//!         root: "data/sider".into(),
//!         targets: TargetChoice::Label("Cardiac disorders".to_string()),
//!         ..Default::default()
//!     },
//! )?;
//! println!("{} molecules, mean {:.3}", sider.len(), sider.mean(0)?);
//! # Ok::<(), molgraph::DatasetError>(())
//! ```
//!
//! # Module Organization
//!
//! - [`io`] — SDF supplier, CSV target tables, cache files and downloads
//! - [`chem`] — Aromaticity/hybridization perception and canonical SMILES
//! - [`featurize`] — Graph encoding and the degeneracy filter
//! - [`MoleculeDataset`] — Cached dataset with transforms and target selection
//!
//! # Data Types
//!
//! - [`MoleculeRecord`] — One molecule as read from an SDF file
//! - [`Atom`], [`Bond`], [`Element`], [`BondOrder`], [`Hybridization`]
//! - [`GraphSample`] — An encoded molecule
//! - [`Collection`] — Encoded molecules with node and edge offsets

mod dataset;
mod model;

pub mod chem;
pub mod featurize;
pub mod io;

pub use model::atom::Atom;
pub use model::graph::{Collection, GraphSample, Slices};
pub use model::molecule::{Bond, MoleculeRecord};
pub use model::types::{
    BondOrder, Element, Hybridization, ParseBondOrderError, ParseElementError,
    ParseHybridizationError,
};

pub use dataset::{
    Catalog, DatasetConfig, DatasetDefinition, MoleculeDataset, NoopObserver, ProcessObserver,
    ProcessReport, ProcessingStrategy, SampleFilter, SampleTransform, SkipReason, TargetChoice,
    TargetSelector,
};
pub use dataset::definition::{AtomrefEntry, AtomrefTable};
pub use dataset::stats;

pub use dataset::Error as DatasetError;
pub use featurize::{DegeneracyPolicy, Vocabulary, featurize};
