//! Dataset definitions loaded from TOML.
//!
//! The built-in catalog is embedded from `resources/datasets.toml` and parsed
//! once on first use. Callers may supply their own catalog text in the same
//! format, e.g. to point at a mirror or to add a dataset with its own
//! vocabularies.

use super::error::Error;
use crate::featurize::{DegeneracyPolicy, Vocabulary};
use crate::io::download::ArchiveKind;
use crate::io::targets::TargetLayout;
use crate::model::types::{BondOrder, Element};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

const BUILTIN_TOML: &str = include_str!("../../resources/datasets.toml");

static BUILTIN: OnceLock<Catalog> = OnceLock::new();

/// Per-atomic-number reference values for some targets.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AtomrefTable {
    /// Atomic numbers the values of every entry apply to, in order.
    pub atomic_numbers: Vec<u8>,
    #[serde(default)]
    pub entries: Vec<AtomrefEntry>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AtomrefEntry {
    pub target: usize,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DatasetDefinition {
    /// Catalog key; filled in when the catalog is loaded.
    #[serde(skip)]
    pub name: String,
    pub sdf_file: String,
    pub csv_file: String,
    pub prebuilt_file: String,
    /// Processed file name; `{variant}` is replaced by the variant name.
    pub processed_file: String,
    pub archive: ArchiveKind,
    pub default_variant: String,
    /// Variant name to archive URL.
    pub variants: BTreeMap<String, String>,
    pub atom_types: Vec<String>,
    pub bond_types: Vec<String>,
    #[serde(default)]
    pub degeneracy: DegeneracyPolicy,
    #[serde(default)]
    pub targets: TargetLayout,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub label_required: bool,
    #[serde(default)]
    pub default_columns: Vec<usize>,
    #[serde(default)]
    pub atomref: Option<AtomrefTable>,
}

impl DatasetDefinition {
    pub fn vocabulary(&self) -> Result<Vocabulary, Error> {
        let atoms = self
            .atom_types
            .iter()
            .map(|s| {
                s.parse::<Element>().map_err(|_| {
                    Error::SpecParse(format!("{}: unknown atom type '{s}'", self.name))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let bonds = self
            .bond_types
            .iter()
            .map(|s| {
                s.parse::<BondOrder>().map_err(|_| {
                    Error::SpecParse(format!("{}: unknown bond type '{s}'", self.name))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Vocabulary::new(atoms, bonds))
    }

    pub fn variant_url(&self, variant: &str) -> Result<&str, Error> {
        self.variants
            .get(variant)
            .map(String::as_str)
            .ok_or_else(|| Error::UnknownVariant {
                dataset: self.name.clone(),
                variant: variant.to_string(),
                choices: self.variants.keys().cloned().collect(),
            })
    }

    pub fn processed_file_name(&self, variant: &str) -> String {
        self.processed_file.replace("{variant}", variant)
    }

    /// Index of a label name; exact match first, then case-insensitive.
    pub fn label_index(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label).or_else(|| {
            self.labels
                .iter()
                .position(|l| l.eq_ignore_ascii_case(label))
        })
    }

    fn validate(&self) -> Result<(), Error> {
        self.vocabulary()?;
        self.variant_url(&self.default_variant)?;

        if let Some(count) = self.targets.count {
            if !self.labels.is_empty() && self.labels.len() != count {
                return Err(Error::SpecParse(format!(
                    "{}: {} labels given for {count} target columns",
                    self.name,
                    self.labels.len()
                )));
            }
            if let Some(&col) = self.default_columns.iter().find(|&&c| c >= count) {
                return Err(Error::SpecParse(format!(
                    "{}: default column {col} exceeds {count} target columns",
                    self.name
                )));
            }
        }

        if let Some(table) = &self.atomref {
            let width = table.atomic_numbers.len();
            if let Some(entry) = table.entries.iter().find(|e| e.values.len() != width) {
                return Err(Error::SpecParse(format!(
                    "{}: atomref for target {} has {} values, expected {width}",
                    self.name,
                    entry.target,
                    entry.values.len()
                )));
            }
        }
        Ok(())
    }
}

/// A named set of dataset definitions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    datasets: BTreeMap<String, DatasetDefinition>,
}

impl Catalog {
    pub fn from_toml(text: &str) -> Result<Self, Error> {
        let mut datasets: BTreeMap<String, DatasetDefinition> = toml::from_str(text)?;
        for (name, definition) in datasets.iter_mut() {
            definition.name = name.clone();
            definition.validate()?;
        }
        Ok(Self { datasets })
    }

    pub fn builtin() -> &'static Catalog {
        BUILTIN.get_or_init(|| {
            Catalog::from_toml(BUILTIN_TOML)
                .expect("Failed to parse embedded dataset definitions. This is a library bug.")
        })
    }

    /// Looks up a dataset by name, ignoring ASCII case.
    pub fn get(&self, name: &str) -> Result<&DatasetDefinition, Error> {
        self.datasets
            .get(name)
            .or_else(|| {
                self.datasets
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(name))
                    .map(|(_, d)| d)
            })
            .ok_or_else(|| Error::UnknownDataset {
                name: name.to_string(),
                choices: self.datasets.keys().cloned().collect(),
            })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.datasets.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::targets::ValueKind;

    #[test]
    fn builtin_catalog_has_both_datasets() {
        let catalog = Catalog::builtin();
        let names: Vec<_> = catalog.names().collect();
        assert_eq!(names, ["lipophilicity", "sider"]);
    }

    #[test]
    fn lipophilicity_definition_matches_its_data() {
        let lipo = Catalog::builtin().get("Lipophilicity").unwrap();
        assert_eq!(lipo.name, "lipophilicity");
        assert_eq!(lipo.default_variant, "rdkit3d");
        assert_eq!(lipo.variants.len(), 4);
        assert_eq!(lipo.archive, ArchiveKind::Tar);
        assert_eq!(lipo.processed_file_name("rdkit2d"), "lipophilicity_rdkit2d_v3.bin");
        assert_eq!(lipo.targets.kind, ValueKind::Float);
        assert_eq!(lipo.default_columns, vec![0]);
        assert!(!lipo.label_required);

        let vocab = lipo.vocabulary().unwrap();
        assert_eq!(vocab.atoms.len(), 13);
        assert_eq!(vocab.atoms.index_of(Element::Se), Some(12));
        assert_eq!(vocab.bonds.len(), 4);
    }

    #[test]
    fn sider_definition_matches_its_data() {
        let sider = Catalog::builtin().get("sider").unwrap();
        assert_eq!(sider.archive, ArchiveKind::Zip);
        assert_eq!(sider.labels.len(), 27);
        assert_eq!(sider.targets.first, 1);
        assert_eq!(sider.targets.count, Some(27));
        assert_eq!(sider.targets.kind, ValueKind::Integer);
        assert!(sider.label_required);
        assert_eq!(sider.label_index("Cardiac disorders"), Some(24));
        assert_eq!(sider.label_index("cardiac DISORDERS"), Some(24));
        assert_eq!(sider.label_index("Headache"), None);

        let vocab = sider.vocabulary().unwrap();
        assert_eq!(vocab.atoms.len(), 40);
        assert_eq!(vocab.atoms.index_of(Element::Y), Some(39));
        assert_eq!(vocab.bonds.index_of(BondOrder::Dative), Some(4));

        let atomref = sider.atomref.as_ref().unwrap();
        assert_eq!(atomref.atomic_numbers, vec![1, 6, 7, 8, 9]);
        assert_eq!(atomref.entries.len(), 6);
    }

    #[test]
    fn unknown_names_list_choices() {
        match Catalog::builtin().get("tox21") {
            Err(Error::UnknownDataset { choices, .. }) => {
                assert_eq!(choices, ["lipophilicity", "sider"]);
            }
            other => panic!("expected unknown dataset, got {other:?}"),
        }
        let lipo = Catalog::builtin().get("lipophilicity").unwrap();
        assert!(matches!(
            lipo.variant_url("rdkit4d"),
            Err(Error::UnknownVariant { .. })
        ));
    }

    #[test]
    fn custom_catalog_is_validated() {
        let text = r#"
[tiny]
sdf_file = "t.sdf"
csv_file = "t.csv"
prebuilt_file = "t.bin"
processed_file = "tiny.bin"
archive = "tar"
default_variant = "main"
atom_types = ["C", "Xx"]
bond_types = ["single"]

[tiny.variants]
main = "http://localhost/t.tar"
"#;
        assert!(matches!(Catalog::from_toml(text), Err(Error::SpecParse(_))));

        let fixed = text.replace("\"Xx\"", "\"O\"");
        let catalog = Catalog::from_toml(&fixed).unwrap();
        let tiny = catalog.get("tiny").unwrap();
        assert_eq!(tiny.degeneracy, DegeneracyPolicy::PairwiseDistance);
        assert_eq!(tiny.targets, TargetLayout::default());
    }

    #[test]
    fn missing_default_variant_is_rejected() {
        let text = r#"
[tiny]
sdf_file = "t.sdf"
csv_file = "t.csv"
prebuilt_file = "t.bin"
processed_file = "tiny.bin"
archive = "zip"
default_variant = "other"
atom_types = ["C"]
bond_types = ["single"]
variants = { main = "http://localhost/t.zip" }
"#;
        assert!(matches!(
            Catalog::from_toml(text),
            Err(Error::UnknownVariant { .. })
        ));
    }
}
