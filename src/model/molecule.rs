use std::collections::BTreeMap;

use super::atom::Atom;
use super::types::BondOrder;
use crate::chem::smiles;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Bond {
    pub begin: usize,
    pub end: usize,
    pub order: BondOrder,
}

impl Bond {
    pub fn new(begin: usize, end: usize, order: BondOrder) -> Self {
        Self { begin, end, order }
    }

    /// Returns the atom on the other side of the bond, if `atom` is one of its ends.
    #[inline]
    pub fn partner(&self, atom: usize) -> Option<usize> {
        if self.begin == atom {
            Some(self.end)
        } else if self.end == atom {
            Some(self.begin)
        } else {
            None
        }
    }
}

/// One molecule as read from a structure file.
///
/// Records are immutable: the canonical SMILES is derived once from the atoms
/// and bonds at construction time, so callers that need a different perception
/// must build a new record.
#[derive(Debug, Clone, PartialEq)]
pub struct MoleculeRecord {
    name: String,
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
    data: BTreeMap<String, String>,
    smiles: String,
}

impl MoleculeRecord {
    pub fn new(
        name: impl Into<String>,
        atoms: Vec<Atom>,
        bonds: Vec<Bond>,
        data: BTreeMap<String, String>,
    ) -> Self {
        let smiles = smiles::write(&atoms, &bonds);
        Self {
            name: name.into(),
            atoms,
            bonds,
            data,
            smiles,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    /// SDF data items (`> <KEY>` blocks) attached to the record.
    pub fn data(&self) -> &BTreeMap<String, String> {
        &self.data
    }

    pub fn smiles(&self) -> &str {
        &self.smiles
    }

    #[inline]
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    #[inline]
    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    /// Atom positions narrowed to single precision, the layout stored in graph samples.
    pub fn positions_f32(&self) -> Vec<[f32; 3]> {
        self.atoms
            .iter()
            .map(|a| {
                [
                    a.position[0] as f32,
                    a.position[1] as f32,
                    a.position[2] as f32,
                ]
            })
            .collect()
    }
}
