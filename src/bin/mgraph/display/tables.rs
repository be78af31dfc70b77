use std::io::{self, Write};

use molgraph::{DatasetDefinition, MoleculeDataset};

use crate::util::text::{format_values, truncate};

const INDENT: &str = "      ";

const BOX_INNER_WIDTH: usize = 62;
const SAFE_TABLE_WIDTH: usize = BOX_INNER_WIDTH - INDENT.len();

/// Target statistics are listed for at most this many selected columns.
const MAX_TARGET_ROWS: usize = 8;

pub fn print_summary(dataset: &MoleculeDataset, interactive: bool) {
    let mut rows: Vec<(String, String)> = vec![
        ("Dataset".into(), dataset.name().to_string()),
        ("Variant".into(), dataset.variant().to_string()),
        ("Samples".into(), dataset.len().to_string()),
        ("Total Atoms".into(), dataset.collection().total_nodes().to_string()),
        ("Total Edges".into(), dataset.collection().total_edges().to_string()),
    ];

    if let Some(first) = dataset.collection().get(0) {
        rows.push(("Node Features".into(), first.node_feature_dim().to_string()));
        rows.push(("Edge Features".into(), first.edge_feature_dim().to_string()));
    }

    match dataset.report() {
        Some(report) => {
            rows.push(("Source Records".into(), report.records.to_string()));
            rows.push(("Malformed".into(), report.malformed.to_string()));
            rows.push(("Overlapping".into(), report.degenerate.to_string()));
            rows.push(("Filtered".into(), report.filtered.to_string()));
        }
        None => rows.push(("Source".into(), "processed cache".into())),
    }

    rows.push((
        "Cache".into(),
        dataset.processed_path().display().to_string(),
    ));

    if !dataset.is_empty() {
        for (i, name) in target_names(dataset).into_iter().enumerate().take(MAX_TARGET_ROWS) {
            let (Ok(mean), Ok(std)) = (dataset.mean(i), dataset.std(i)) else {
                continue;
            };
            rows.push((name, format!("{mean:.3} ± {std:.3}")));
        }
    }

    if interactive {
        let stderr = io::stderr();
        let mut out = stderr.lock();
        print_kv_table(&mut out, "Dataset Summary", &rows);
        let _ = writeln!(out);
    } else {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        for (key, val) in &rows {
            let _ = writeln!(out, "{key}\t{val}");
        }
    }
}

/// Display names of the targets in the accessed `y`, in order.
fn target_names(dataset: &MoleculeDataset) -> Vec<String> {
    let labels = &dataset.definition().labels;
    let name_of = |col: usize| match labels.get(col) {
        Some(label) => label.clone(),
        None => format!("Target {col}"),
    };

    match dataset.selector().columns() {
        Some(cols) => cols.iter().map(|&c| name_of(c)).collect(),
        None => {
            let width = dataset.collection().get(0).map_or(0, |s| s.y.len());
            (0..width).map(name_of).collect()
        }
    }
}

pub fn print_samples(dataset: &MoleculeDataset, count: usize) {
    if count == 0 || dataset.is_empty() {
        return;
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let idx_w = 6usize;
    let smiles_w = 24usize;
    let num_w = 5usize;
    let sep_overhead = 13;
    let y_w = SAFE_TABLE_WIDTH.saturating_sub(idx_w + smiles_w + 2 * num_w + sep_overhead);

    let rule = |l: &str, m: &str, r: &str| {
        format!(
            "{INDENT}{l}{}{m}{}{m}{}{m}{}{m}{}{r}",
            "─".repeat(idx_w + 2),
            "─".repeat(smiles_w + 2),
            "─".repeat(num_w + 2),
            "─".repeat(num_w + 2),
            "─".repeat(y_w + 2),
        )
    };

    let _ = writeln!(out, "{}", rule("┌", "┬", "┐"));
    let _ = writeln!(
        out,
        "{INDENT}│ {:>idx_w$} │ {:<smiles_w$} │ {:>num_w$} │ {:>num_w$} │ {:<y_w$} │",
        "Idx", "SMILES", "Atoms", "Edges", "Targets",
    );
    let _ = writeln!(out, "{}", rule("├", "┼", "┤"));

    for sample in dataset.iter().take(count) {
        let Ok(sample) = sample else {
            continue;
        };
        let _ = writeln!(
            out,
            "{INDENT}│ {:>idx_w$} │ {:<smiles_w$} │ {:>num_w$} │ {:>num_w$} │ {:<y_w$} │",
            sample.idx,
            truncate(&sample.smiles, smiles_w),
            sample.num_nodes(),
            sample.num_edges(),
            truncate(&format_values(&sample.y, 4), y_w),
        );
    }

    let _ = writeln!(out, "{}", rule("└", "┴", "┘"));
    if dataset.len() > count {
        let _ = writeln!(out, "{INDENT}… and {} more", dataset.len() - count);
    }
}

pub fn print_labels(definition: &DatasetDefinition) {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let variants: Vec<&str> = definition.variants.keys().map(String::as_str).collect();
    let _ = writeln!(out, "Dataset:  {}", definition.name);
    let _ = writeln!(
        out,
        "Variants: {} (default: {})",
        variants.join(", "),
        definition.default_variant
    );

    if definition.labels.is_empty() {
        let cols = if definition.default_columns.is_empty() {
            "all".to_string()
        } else {
            format!("{:?}", definition.default_columns)
        };
        let _ = writeln!(out, "Targets:  unnamed (default columns: {cols})");
        return;
    }

    let required = if definition.label_required {
        " (one must be selected)"
    } else {
        ""
    };
    let _ = writeln!(out, "Labels{required}:");
    for (i, label) in definition.labels.iter().enumerate() {
        let _ = writeln!(out, "  {i:>3}  {label}");
    }
}

fn print_kv_table(out: &mut impl Write, title: &str, rows: &[(String, String)]) {
    let key_w = 16usize;
    let sep_overhead = 6;
    let val_w = SAFE_TABLE_WIDTH.saturating_sub(key_w + sep_overhead);

    let _ = writeln!(
        out,
        "{}┌─ {} ─┐",
        INDENT,
        truncate(title, SAFE_TABLE_WIDTH - 6)
    );
    let _ = writeln!(
        out,
        "{}┌{k_line}┬{v_line}┐",
        INDENT,
        k_line = "─".repeat(key_w + 2),
        v_line = "─".repeat(val_w + 2)
    );

    for (key, val) in rows {
        let _ = writeln!(
            out,
            "{}│ {:<key_w$} │ {:>val_w$} │",
            INDENT,
            truncate(key, key_w),
            truncate(val, val_w),
            key_w = key_w,
            val_w = val_w
        );
    }

    let _ = writeln!(
        out,
        "{}└{k_line}┴{v_line}┘",
        INDENT,
        k_line = "─".repeat(key_w + 2),
        v_line = "─".repeat(val_w + 2)
    );
}
