use std::fs;
use std::path::Path;

use molgraph::chem::Perception;
use molgraph::io::cache;
use molgraph::{
    DatasetConfig, DatasetError, GraphSample, MoleculeDataset, ProcessingStrategy, TargetChoice,
    TargetSelector,
};
use tempfile::TempDir;

struct Mol<'a> {
    name: &'a str,
    atoms: &'a [(&'a str, [f64; 3])],
    bonds: &'a [(usize, usize, u8)],
}

const METHANOL: Mol<'static> = Mol {
    name: "methanol",
    atoms: &[("C", [0.0, 0.0, 0.0]), ("O", [1.43, 0.0, 0.0])],
    bonds: &[(1, 2, 1)],
};

const OVERLAPPING: Mol<'static> = Mol {
    name: "collapsed",
    atoms: &[("C", [0.5, 0.5, 0.5]), ("C", [0.5, 0.5, 0.5])],
    bonds: &[(1, 2, 1)],
};

const FORMALDEHYDE: Mol<'static> = Mol {
    name: "formaldehyde",
    atoms: &[("C", [0.0, 0.0, 0.0]), ("O", [1.21, 0.0, 0.0])],
    bonds: &[(1, 2, 2)],
};

fn sdf_text(mols: &[Mol]) -> String {
    let mut out = String::new();
    for mol in mols {
        out.push_str(mol.name);
        out.push_str("\n  test\n\n");
        out.push_str(&format!(
            "{:>3}{:>3}  0  0  0  0  0  0  0  0999 V2000\n",
            mol.atoms.len(),
            mol.bonds.len()
        ));
        for (symbol, [x, y, z]) in mol.atoms {
            out.push_str(&format!(
                "{x:>10.4}{y:>10.4}{z:>10.4} {symbol:<3} 0  0  0  0  0  0  0  0  0  0  0  0\n"
            ));
        }
        for (a, b, order) in mol.bonds {
            out.push_str(&format!("{a:>3}{b:>3}{order:>3}  0\n"));
        }
        out.push_str("M  END\n$$$$\n");
    }
    out
}

fn write_raw(root: &Path, sdf_name: &str, sdf: &str, csv_name: &str, csv: &str) {
    let raw = root.join("raw");
    fs::create_dir_all(&raw).unwrap();
    fs::write(raw.join(sdf_name), sdf).unwrap();
    fs::write(raw.join(csv_name), csv).unwrap();
}

fn lipophilicity_root() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_raw(
        dir.path(),
        "Lipophilicity.sdf",
        &sdf_text(&[METHANOL, OVERLAPPING, FORMALDEHYDE]),
        "Lipophilicity.sdf.csv",
        "exp\n1.5\n2.5\n3.5\n",
    );
    dir
}

fn offline(root: &Path) -> DatasetConfig {
    DatasetConfig {
        root: root.to_path_buf(),
        download: false,
        ..Default::default()
    }
}

const TOY_DEFINITIONS: &str = r#"
[toy]
sdf_file = "toy.sdf"
csv_file = "toy.csv"
prebuilt_file = "toy.bin"
processed_file = "toy_{variant}.bin"
archive = "zip"
default_variant = "local"
atom_types = ["C", "O"]
bond_types = ["single", "double"]
labels = ["solubility", "toxicity"]

[toy.targets]
first = 1
count = 2

[toy.variants]
local = "http://localhost/toy.zip"
"#;

fn toy_root() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_raw(
        dir.path(),
        "toy.sdf",
        &sdf_text(&[METHANOL, FORMALDEHYDE]),
        "toy.csv",
        "smiles,solubility,toxicity\nCO,0.5,1\nC=O,-0.5,3\n",
    );
    dir
}

#[test]
fn overlapping_molecule_is_dropped_and_targets_stay_aligned() {
    let root = lipophilicity_root();
    let dataset = MoleculeDataset::open("lipophilicity", offline(root.path())).unwrap();

    assert_eq!(dataset.len(), 2);
    let samples: Vec<GraphSample> = dataset.iter().collect::<Result<_, _>>().unwrap();
    assert_eq!(samples[0].idx, 0);
    assert_eq!(samples[0].y, vec![1.5]);
    assert_eq!(samples[1].idx, 2);
    assert_eq!(samples[1].y, vec![3.5]);
    assert_eq!(samples[1].smiles, "C=O");
    assert_eq!(samples[0].node_feature_dim(), 19);

    let report = dataset.report().unwrap();
    assert_eq!(report.records, 3);
    assert_eq!(report.kept, 2);
    assert_eq!(report.degenerate, 1);
    assert!(dataset.processed_path().exists());
    assert!(
        dataset
            .processed_path()
            .ends_with("processed/lipophilicity_rdkit3d_v3.bin")
    );
}

#[test]
fn second_open_reuses_the_cache() {
    let root = lipophilicity_root();
    let first = MoleculeDataset::open("lipophilicity", offline(root.path())).unwrap();

    fs::remove_dir_all(root.path().join("raw")).unwrap();
    let second = MoleculeDataset::open("lipophilicity", offline(root.path())).unwrap();

    assert!(second.report().is_none());
    assert_eq!(first.collection(), second.collection());
}

#[test]
fn force_reload_reprocesses_raw_files() {
    let root = lipophilicity_root();
    MoleculeDataset::open("lipophilicity", offline(root.path())).unwrap();

    let config = DatasetConfig {
        force_reload: true,
        ..offline(root.path())
    };
    let dataset = MoleculeDataset::open("lipophilicity", config).unwrap();
    assert!(dataset.report().is_some());
    assert_eq!(dataset.len(), 2);
}

#[test]
fn changed_perception_invalidates_the_cache() {
    let root = lipophilicity_root();
    MoleculeDataset::open("lipophilicity", offline(root.path())).unwrap();

    let config = DatasetConfig {
        perception: Perception::Minimal,
        ..offline(root.path())
    };
    let dataset = MoleculeDataset::open("lipophilicity", config).unwrap();
    assert!(dataset.report().is_some());
}

#[test]
fn missing_raw_files_fail_when_offline() {
    let root = TempDir::new().unwrap();
    let err = MoleculeDataset::open("lipophilicity", offline(root.path())).unwrap_err();
    match err {
        DatasetError::MissingRawFile(path) => assert!(path.ends_with("Lipophilicity.sdf")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn more_records_than_target_rows_is_an_error() {
    let root = TempDir::new().unwrap();
    write_raw(
        root.path(),
        "Lipophilicity.sdf",
        &sdf_text(&[METHANOL, FORMALDEHYDE]),
        "Lipophilicity.sdf.csv",
        "exp\n1.5\n",
    );
    let err = MoleculeDataset::open("lipophilicity", offline(root.path())).unwrap_err();
    assert!(matches!(
        err,
        DatasetError::TargetMismatch {
            records: 2,
            rows: 1
        }
    ));
}

#[test]
fn sider_without_label_lists_choices() {
    let root = TempDir::new().unwrap();
    let err = MoleculeDataset::open("sider", offline(root.path())).unwrap_err();
    match err {
        DatasetError::MissingLabel { dataset, choices } => {
            assert_eq!(dataset, "sider");
            assert_eq!(choices.len(), 27);
            assert!(choices.iter().any(|c| c == "Eye disorders"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn prebuilt_strategy_applies_pre_filter() {
    let source = lipophilicity_root();
    let encoded = MoleculeDataset::open("lipophilicity", offline(source.path())).unwrap();

    let root = TempDir::new().unwrap();
    let raw = root.path().join("raw");
    fs::create_dir_all(&raw).unwrap();
    cache::write_prebuilt(
        raw.join("Lipophilicity.bin"),
        encoded.collection().samples(),
    )
    .unwrap();

    let config = DatasetConfig {
        strategy: ProcessingStrategy::Prebuilt,
        pre_filter: Some(Box::new(|s: &GraphSample| s.idx != 0)),
        ..offline(root.path())
    };
    let dataset = MoleculeDataset::open("lipophilicity", config).unwrap();

    assert_eq!(dataset.len(), 1);
    assert_eq!(dataset.get(0).unwrap().idx, 2);
    assert_eq!(dataset.report().unwrap().filtered, 1);
}

#[test]
fn custom_definitions_select_a_label_after_transform() {
    let root = toy_root();
    let config = DatasetConfig {
        definitions: Some(TOY_DEFINITIONS.to_string()),
        targets: TargetChoice::Label("Toxicity".to_string()),
        transform: Some(Box::new(|mut s: GraphSample| {
            s.y.iter_mut().for_each(|v| *v *= 2.0);
            s
        })),
        ..offline(root.path())
    };
    let dataset = MoleculeDataset::open("toy", config).unwrap();

    assert_eq!(dataset.selector(), &TargetSelector::Columns(vec![1]));
    let first = dataset.get(0).unwrap();
    assert_eq!(first.y, vec![2.0]);
    assert_eq!(first.y_columns, vec![1]);

    // stored samples keep both target columns
    assert_eq!(dataset.collection().get(0).unwrap().y, vec![0.5, 1.0]);

    assert!((dataset.mean(0).unwrap() - 4.0).abs() < 1e-9);
    assert!((dataset.std(0).unwrap() - 8.0_f64.sqrt()).abs() < 1e-9);
    assert!(matches!(
        dataset.get(5),
        Err(DatasetError::IndexOutOfRange { index: 5, len: 2 })
    ));
}

#[test]
fn out_of_range_columns_are_rejected() {
    let root = toy_root();
    let config = DatasetConfig {
        definitions: Some(TOY_DEFINITIONS.to_string()),
        targets: TargetChoice::Columns(vec![0, 2]),
        ..offline(root.path())
    };
    let err = MoleculeDataset::open("toy", config).unwrap_err();
    assert!(matches!(
        err,
        DatasetError::ColumnOutOfRange {
            column: 2,
            width: 2
        }
    ));
}
