use std::path::Path;

use anyhow::Result;
use molgraph::Catalog;

use super::prepare::read_definitions;
use crate::display::print_labels;

pub fn run_labels(dataset: &str, definitions: Option<&Path>) -> Result<()> {
    let custom = read_definitions(definitions)?
        .map(|text| Catalog::from_toml(&text))
        .transpose()?;
    let catalog = match &custom {
        Some(catalog) => catalog,
        None => Catalog::builtin(),
    };

    print_labels(catalog.get(dataset)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use molgraph::DatasetError;

    const CUSTOM: &str = r#"
[toy]
sdf_file = "toy.sdf"
csv_file = "toy.csv"
prebuilt_file = "toy.bin"
processed_file = "toy.bin"
archive = "zip"
default_variant = "local"
atom_types = ["C"]
bond_types = ["single"]
labels = ["activity"]

[toy.variants]
local = "http://localhost/toy.zip"
"#;

    #[test]
    fn lists_builtin_dataset() {
        run_labels("sider", None).unwrap();
        run_labels("Lipophilicity", None).unwrap();
    }

    #[test]
    fn unknown_builtin_dataset_is_an_error() {
        let err = run_labels("qm9", None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DatasetError>(),
            Some(DatasetError::UnknownDataset { .. })
        ));
    }

    #[test]
    fn lists_dataset_from_definitions_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("datasets.toml");
        std::fs::write(&path, CUSTOM).unwrap();

        run_labels("toy", Some(&path)).unwrap();
        // custom catalog replaces the built-in one
        assert!(run_labels("sider", Some(&path)).is_err());
    }
}
