use super::definition::AtomrefTable;

/// Length of an atom reference vector, indexed by atomic number.
pub const ATOMREF_LEN: usize = 100;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (`n - 1` denominator); NaN below two values.
pub fn std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// The reference vector for `target`, zero except at the table's atomic numbers.
pub fn atomref(table: &AtomrefTable, target: usize) -> Option<Vec<f64>> {
    let entry = table.entries.iter().find(|e| e.target == target)?;
    let mut out = vec![0.0; ATOMREF_LEN];
    for (&z, &value) in table.atomic_numbers.iter().zip(&entry.values) {
        if let Some(slot) = out.get_mut(usize::from(z)) {
            *slot = value;
        }
    }
    Some(out)
}
