use crate::chem::{Perception, perceive};
use crate::io::{Format, error::Error, util};
use crate::model::{
    atom::Atom,
    molecule::{Bond, MoleculeRecord},
    types::BondOrder,
};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

type Block = Vec<(usize, String)>;

pub struct SdfReader<R> {
    lines: Lines<R>,
    line_no: usize,
    perception: Perception,
    done: bool,
}

impl<R: BufRead> SdfReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            perception: Perception::default(),
            done: false,
        }
    }

    pub fn with_perception(mut self, perception: Perception) -> Self {
        self.perception = perception;
        self
    }

    fn next_block(&mut self) -> Result<Option<Block>, Error> {
        let mut block = Vec::new();
        for line in self.lines.by_ref() {
            let content = line.map_err(|e| Error::Io { source: e })?;
            self.line_no += 1;
            let content = content.trim_end_matches('\r').to_string();
            if content.trim() == "$$$$" {
                return Ok(Some(block));
            }
            block.push((self.line_no, content));
        }

        if block.iter().all(|(_, l)| l.trim().is_empty()) {
            Ok(None)
        } else {
            Ok(Some(block))
        }
    }
}

impl SdfReader<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> Iterator for SdfReader<R> {
    type Item = Result<MoleculeRecord, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_block() {
            Ok(Some(block)) => Some(parse_record(&block, self.perception)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Counts the records in an SDF file without parsing them.
pub fn count_records(path: impl AsRef<Path>) -> Result<usize, Error> {
    let reader = BufReader::new(File::open(path)?);
    let mut count = 0;
    let mut pending = false;
    for line in reader.lines() {
        let line = line?;
        if line.trim() == "$$$$" {
            count += 1;
            pending = false;
        } else if !line.trim().is_empty() {
            pending = true;
        }
    }
    Ok(count + usize::from(pending))
}

fn parse_record(block: &[(usize, String)], perception: Perception) -> Result<MoleculeRecord, Error> {
    let first_line = block.first().map_or(0, |(ln, _)| *ln);
    if block.len() < 4 {
        return Err(Error::parse(
            Format::Sdf,
            first_line,
            "record must contain a header and counts line",
        ));
    }

    let name = block[0].1.trim().to_string();
    let (counts_line_no, counts_line) = (&block[3].0, &block[3].1);
    if counts_line.contains("V3000") {
        return Err(Error::parse(
            Format::Sdf,
            *counts_line_no,
            "V3000 is not supported",
        ));
    }

    let (atom_count, bond_count) = parse_counts(counts_line, *counts_line_no)?;
    let atom_start = 4;
    let bond_start = atom_start + atom_count;
    let props_start = bond_start + bond_count;

    if block.len() < props_start {
        return Err(Error::parse(
            Format::Sdf,
            block.last().map_or(*counts_line_no, |(ln, _)| *ln),
            "record ended before atoms/bonds were fully specified",
        ));
    }

    let mut atoms = parse_atoms(&block[atom_start..bond_start])?;
    let bonds = parse_bonds(&block[bond_start..props_start], atom_count)?;
    let data = parse_properties(&block[props_start..], &mut atoms)?;

    perceive(&mut atoms, &bonds, perception);
    Ok(MoleculeRecord::new(name, atoms, bonds, data))
}

fn parse_counts(line: &str, line_no: usize) -> Result<(usize, usize), Error> {
    let fixed = util::column(line, 0..3)
        .and_then(|a| a.parse::<usize>().ok())
        .zip(util::column(line, 3..6).and_then(|b| b.parse::<usize>().ok()));
    if let Some(counts) = fixed {
        return Ok(counts);
    }

    let tokens: Vec<_> = line.split_whitespace().collect();
    if tokens.len() < 2 {
        return Err(Error::parse(
            Format::Sdf,
            line_no,
            "counts line must contain atom and bond counts",
        ));
    }
    let atoms = tokens[0]
        .parse::<usize>()
        .map_err(|_| Error::parse(Format::Sdf, line_no, "invalid atom count"))?;
    let bonds = tokens[1]
        .parse::<usize>()
        .map_err(|_| Error::parse(Format::Sdf, line_no, "invalid bond count"))?;
    Ok((atoms, bonds))
}

fn charge_from_code(code: i32) -> i8 {
    match code {
        1 => 3,
        2 => 2,
        3 => 1,
        5 => -1,
        6 => -2,
        7 => -3,
        _ => 0,
    }
}

fn parse_atoms(lines: &[(usize, String)]) -> Result<Vec<Atom>, Error> {
    let mut atoms = Vec::with_capacity(lines.len());
    for (ln, raw) in lines {
        let (position, symbol, charge_code) = match fixed_atom_fields(raw) {
            Some((position, symbol)) => {
                let code = util::column(raw, 36..39)
                    .and_then(|c| c.parse::<i32>().ok())
                    .unwrap_or(0);
                (position, symbol, code)
            }
            None => {
                let tokens: Vec<_> = raw.split_whitespace().collect();
                if tokens.len() < 4 {
                    return Err(Error::parse(Format::Sdf, *ln, "invalid atom line"));
                }
                let mut position = [0.0; 3];
                for (axis, token) in tokens[..3].iter().enumerate() {
                    position[axis] = token.parse::<f64>().map_err(|_| {
                        Error::parse(Format::Sdf, *ln, "invalid coordinate in atom line")
                    })?;
                }
                let code = tokens
                    .get(5)
                    .and_then(|c| c.parse::<i32>().ok())
                    .unwrap_or(0);
                (position, tokens[3], code)
            }
        };

        let element = util::element_from_symbol(symbol).ok_or_else(|| {
            Error::parse(
                Format::Sdf,
                *ln,
                format!("unsupported element symbol '{symbol}'"),
            )
        })?;
        atoms.push(Atom::new(element, position).with_charge(charge_from_code(charge_code)));
    }
    Ok(atoms)
}

fn fixed_atom_fields(raw: &str) -> Option<([f64; 3], &str)> {
    let x = util::column(raw, 0..10)?.parse::<f64>().ok()?;
    let y = util::column(raw, 10..20)?.parse::<f64>().ok()?;
    let z = util::column(raw, 20..30)?.parse::<f64>().ok()?;
    let symbol = util::column(raw, 31..34)?;
    Some(([x, y, z], symbol))
}

fn fixed_bond_fields(raw: &str) -> Option<(usize, usize, i32)> {
    let a1 = util::column(raw, 0..3)?.parse::<usize>().ok()?;
    let a2 = util::column(raw, 3..6)?.parse::<usize>().ok()?;
    let order = util::column(raw, 6..9)?.parse::<i32>().ok()?;
    Some((a1, a2, order))
}

fn parse_bonds(lines: &[(usize, String)], atom_count: usize) -> Result<Vec<Bond>, Error> {
    let mut bonds = Vec::with_capacity(lines.len());
    for (ln, raw) in lines {
        let (a1, a2, order_val) = match fixed_bond_fields(raw) {
            Some(values) => values,
            None => {
                let tokens: Vec<_> = raw.split_whitespace().collect();
                if tokens.len() < 3 {
                    return Err(Error::parse(Format::Sdf, *ln, "invalid bond line"));
                }
                let a1 = tokens[0]
                    .parse::<usize>()
                    .map_err(|_| Error::parse(Format::Sdf, *ln, "invalid first atom index"))?;
                let a2 = tokens[1]
                    .parse::<usize>()
                    .map_err(|_| Error::parse(Format::Sdf, *ln, "invalid second atom index"))?;
                let order = tokens[2]
                    .parse::<i32>()
                    .map_err(|_| Error::parse(Format::Sdf, *ln, "invalid bond order value"))?;
                (a1, a2, order)
            }
        };

        let order = BondOrder::from_ctfile(order_val).ok_or_else(|| {
            Error::parse(
                Format::Sdf,
                *ln,
                format!("unsupported bond order {order_val} in bond line"),
            )
        })?;

        if a1 == 0 || a2 == 0 || a1 > atom_count || a2 > atom_count {
            return Err(Error::parse(
                Format::Sdf,
                *ln,
                "bond references atom outside declared range",
            ));
        }

        bonds.push(Bond::new(a1 - 1, a2 - 1, order));
    }
    Ok(bonds)
}

/// Applies `M  CHG` properties and collects `> <KEY>` data items.
fn parse_properties(
    lines: &[(usize, String)],
    atoms: &mut [Atom],
) -> Result<BTreeMap<String, String>, Error> {
    let mut data = BTreeMap::new();
    let mut charges_reset = false;
    let mut i = 0;

    while i < lines.len() {
        let (ln, raw) = (&lines[i].0, &lines[i].1);
        i += 1;

        if let Some(rest) = raw.strip_prefix("M  CHG") {
            if !charges_reset {
                atoms.iter_mut().for_each(|a| a.formal_charge = 0);
                charges_reset = true;
            }
            apply_charge_property(rest, *ln, atoms)?;
        } else if raw.starts_with('>') {
            let Some(key) = data_key(raw) else {
                continue;
            };
            let mut value = Vec::new();
            while i < lines.len() && !lines[i].1.trim().is_empty() {
                value.push(lines[i].1.trim_end());
                i += 1;
            }
            data.insert(key.to_string(), value.join("\n"));
        }
    }
    Ok(data)
}

fn apply_charge_property(rest: &str, line_no: usize, atoms: &mut [Atom]) -> Result<(), Error> {
    let tokens: Vec<i64> = rest
        .split_whitespace()
        .map(|t| {
            t.parse::<i64>()
                .map_err(|_| Error::parse(Format::Sdf, line_no, "invalid value in M  CHG line"))
        })
        .collect::<Result<_, _>>()?;

    let Some((&count, pairs)) = tokens.split_first() else {
        return Err(Error::parse(Format::Sdf, line_no, "empty M  CHG line"));
    };
    if count < 0 || pairs.len() < 2 * count as usize {
        return Err(Error::parse(
            Format::Sdf,
            line_no,
            "M  CHG entry count does not match its values",
        ));
    }

    for pair in pairs.chunks_exact(2).take(count as usize) {
        let (index, charge) = (pair[0], pair[1]);
        let atom = usize::try_from(index)
            .ok()
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| atoms.get_mut(i))
            .ok_or_else(|| {
                Error::parse(Format::Sdf, line_no, "M  CHG references unknown atom")
            })?;
        atom.formal_charge = i8::try_from(charge)
            .map_err(|_| Error::parse(Format::Sdf, line_no, "formal charge out of range"))?;
    }
    Ok(())
}

fn data_key(line: &str) -> Option<&str> {
    let start = line.find('<')? + 1;
    let end = start + line[start..].find('>')?;
    Some(line[start..end].trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::{Element, Hybridization};
    use std::io::Cursor;

    const TWO_RECORDS: &str = "\
ethanol
  generated

  3  2  0  0  0  0  0  0  0  0999 V2000
    0.0000    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
    1.5000    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
    2.0000    1.2000    0.0000 O   0  0  0  0  0  0  0  0  0  0  0  0
  1  2  1  0
  2  3  1  0
M  END
> <ID>
mol-1

$$$$
acetate
  generated

  4  3  0  0  0  0  0  0  0  0999 V2000
    0.0000    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
    1.5000    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
    2.1000    1.1000    0.0000 O   0  0  0  0  0  0  0  0  0  0  0  0
    2.1000   -1.1000    0.0000 O   0  0  0  0  0  0  0  0  0  0  0  0
  1  2  1  0
  2  3  2  0
  2  4  1  0
M  CHG  1   4  -1
M  END
$$$$
";

    fn read_all(text: &str) -> Vec<Result<MoleculeRecord, Error>> {
        SdfReader::new(Cursor::new(text.as_bytes())).collect()
    }

    #[test]
    fn reads_every_record_in_order() {
        let records: Vec<_> = read_all(TWO_RECORDS)
            .into_iter()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name(), "ethanol");
        assert_eq!(records[0].atom_count(), 3);
        assert_eq!(records[0].bond_count(), 2);
        assert_eq!(records[0].data().get("ID").map(String::as_str), Some("mol-1"));
        assert_eq!(records[0].smiles(), "CCO");
        assert_eq!(records[1].name(), "acetate");
        assert_eq!(records[1].bonds()[1].order, BondOrder::Double);
    }

    #[test]
    fn charge_property_overrides_atom_block() {
        let records = read_all(TWO_RECORDS);
        let acetate = records[1].as_ref().unwrap();
        assert_eq!(acetate.atoms()[3].formal_charge, -1);
        assert_eq!(acetate.atoms()[2].formal_charge, 0);
    }

    #[test]
    fn perception_runs_on_read() {
        let records = read_all(TWO_RECORDS);
        let acetate = records[1].as_ref().unwrap();
        assert_eq!(acetate.atoms()[0].hybridization, Hybridization::Sp3);
        assert_eq!(acetate.atoms()[1].hybridization, Hybridization::Sp2);

        let minimal: Vec<_> = SdfReader::new(Cursor::new(TWO_RECORDS.as_bytes()))
            .with_perception(Perception::Minimal)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(minimal[1].atoms()[1].hybridization, Hybridization::Unspecified);
    }

    #[test]
    fn malformed_record_does_not_stop_the_supplier() {
        let broken = "\
bad
  generated

  2  1  0  0  0  0  0  0  0  0999 V2000
    0.0000    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
  1  2  1  0
M  END
$$$$
";
        let text = format!("{broken}{TWO_RECORDS}");
        let records = read_all(&text);
        assert_eq!(records.len(), 3);
        assert!(matches!(records[0], Err(Error::Parse { format: Format::Sdf, .. })));
        assert_eq!(records[1].as_ref().unwrap().name(), "ethanol");
        assert_eq!(records[2].as_ref().unwrap().name(), "acetate");
    }

    #[test]
    fn rejects_v3000_records() {
        let text = "v3\n\n\n  0  0  0     0  0            999 V3000\nM  END\n$$$$\n";
        let records = read_all(text);
        assert_eq!(records.len(), 1);
        match &records[0] {
            Err(Error::Parse { details, line, .. }) => {
                assert!(details.contains("V3000"));
                assert_eq!(*line, 4);
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_bond_to_missing_atom() {
        let text = "\
x
  generated

  1  1  0  0  0  0  0  0  0  0999 V2000
    0.0000    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
  1  2  1  0
M  END
$$$$
";
        let records = read_all(text);
        assert!(matches!(records[0], Err(Error::Parse { .. })));
    }

    #[test]
    fn whitespace_fallback_reads_loose_lines() {
        let text = "\
loose
  handwritten

 2 1
0.0 0.0 0.0 N 0 0
1.1 0.0 0.0 N 0 0
1 2 3
M  END
";
        let records = read_all(text);
        assert_eq!(records.len(), 1);
        let record = records[0].as_ref().unwrap();
        assert_eq!(record.atoms()[0].element, Element::N);
        assert_eq!(record.bonds()[0].order, BondOrder::Triple);
        assert_eq!(record.smiles(), "N#N");
    }

    #[test]
    fn trailing_blank_lines_are_not_a_record() {
        let text = format!("{TWO_RECORDS}\n\n");
        assert_eq!(read_all(&text).len(), 2);
    }

    #[test]
    fn counts_records_in_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mols.sdf");
        std::fs::write(&path, TWO_RECORDS).unwrap();
        assert_eq!(count_records(&path).unwrap(), 2);
    }
}
