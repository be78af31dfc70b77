//! Encoding of molecule records as typed graphs.
//!
//! [`featurize`] is a pure function of a [`MoleculeRecord`], a [`Vocabulary`]
//! and the record's target row. Node rows are the one-hot atom type followed
//! by [`SCALAR_FEATURES`] scalars: atomic number, aromatic flag, sp, sp2, sp3
//! indicators and the number of hydrogen neighbours. Every bond yields two
//! directed edges, sorted by `src * num_nodes + dst`.

pub mod degeneracy;
mod error;
pub mod vocab;

pub use degeneracy::{DegeneracyPolicy, find_overlap};
pub use error::Error;
pub use vocab::{AtomVocabulary, BondVocabulary, Vocabulary};

use crate::model::graph::GraphSample;
use crate::model::molecule::MoleculeRecord;
use crate::model::types::Hybridization;

pub const SCALAR_FEATURES: usize = 6;

fn one_hot(index: usize, width: usize) -> Vec<f32> {
    let mut row = vec![0.0; width];
    row[index] = 1.0;
    row
}

pub fn featurize(
    record: &MoleculeRecord,
    vocab: &Vocabulary,
    targets: &[f32],
    idx: usize,
) -> Result<GraphSample, Error> {
    let atoms = record.atoms();
    let n = atoms.len();

    let mut type_idx = Vec::with_capacity(n);
    let mut z = Vec::with_capacity(n);
    let mut scalars = Vec::with_capacity(n);
    for (i, atom) in atoms.iter().enumerate() {
        let t = vocab
            .atoms
            .index_of(atom.element)
            .ok_or_else(|| Error::UnknownAtomType {
                symbol: atom.element.symbol().to_string(),
                atom: i,
            })?;
        type_idx.push(t);
        z.push(atom.atomic_number());
        let flag = |h: Hybridization| if atom.hybridization == h { 1.0 } else { 0.0 };
        scalars.push([
            f32::from(atom.atomic_number()),
            if atom.aromatic { 1.0 } else { 0.0 },
            flag(Hybridization::Sp),
            flag(Hybridization::Sp2),
            flag(Hybridization::Sp3),
        ]);
    }

    let mut edges = Vec::with_capacity(2 * record.bond_count());
    for (b, bond) in record.bonds().iter().enumerate() {
        if let Some(atom) = [bond.begin, bond.end].into_iter().find(|&a| a >= n) {
            return Err(Error::BondOutOfRange {
                bond: b,
                atom,
                atom_count: n,
            });
        }
        let t = vocab
            .bonds
            .index_of(bond.order)
            .ok_or(Error::UnknownBondType {
                order: bond.order,
                bond: b,
            })?;
        edges.push((bond.begin, bond.end, t));
        edges.push((bond.end, bond.begin, t));
    }
    edges.sort_by_key(|&(src, dst, _)| src * n + dst);

    let mut num_hs = vec![0.0f32; n];
    for &(src, dst, _) in &edges {
        if z[src] == 1 {
            num_hs[dst] += 1.0;
        }
    }

    let x = type_idx
        .iter()
        .zip(&scalars)
        .zip(&num_hs)
        .map(|((&t, s), &hs)| {
            let mut row = one_hot(t, vocab.atoms.len());
            row.extend_from_slice(s);
            row.push(hs);
            row
        })
        .collect();

    let bond_width = vocab.bonds.len();
    Ok(GraphSample {
        x,
        z,
        pos: record.positions_f32(),
        edge_index: edges.iter().map(|&(s, d, _)| [s, d]).collect(),
        edge_type: edges.iter().map(|&(_, _, t)| t).collect(),
        edge_attr: edges.iter().map(|&(_, _, t)| one_hot(t, bond_width)).collect(),
        y: targets.to_vec(),
        y_columns: (0..targets.len()).collect(),
        name: record.name().to_string(),
        smiles: record.smiles().to_string(),
        idx,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chem::{Perception, perceive};
    use crate::model::{
        atom::Atom,
        molecule::Bond,
        types::{BondOrder, Element},
    };
    use std::collections::BTreeMap;

    fn lipo_vocab() -> Vocabulary {
        use Element::*;
        Vocabulary::new(
            vec![C, N, Cl, H, O, S, F, B, Br, P, I, Si, Se],
            vec![
                BondOrder::Single,
                BondOrder::Double,
                BondOrder::Triple,
                BondOrder::Aromatic,
            ],
        )
    }

    fn record(atoms: Vec<Atom>, bonds: Vec<Bond>) -> MoleculeRecord {
        let mut atoms = atoms;
        perceive(&mut atoms, &bonds, Perception::Topological);
        MoleculeRecord::new("test", atoms, bonds, BTreeMap::new())
    }

    fn methanol() -> MoleculeRecord {
        // O-H listed before C-O to exercise edge sorting.
        record(
            vec![
                Atom::new(Element::C, [0.0, 0.0, 0.0]),
                Atom::new(Element::O, [1.4, 0.0, 0.0]),
                Atom::new(Element::H, [1.8, 0.9, 0.0]),
            ],
            vec![
                Bond::new(1, 2, BondOrder::Single),
                Bond::new(0, 1, BondOrder::Single),
            ],
        )
    }

    #[test]
    fn three_atoms_two_single_bonds_give_four_sorted_edges() {
        let sample = featurize(&methanol(), &lipo_vocab(), &[0.7], 5).unwrap();
        assert_eq!(sample.edge_index, vec![[0, 1], [1, 0], [1, 2], [2, 1]]);
        assert_eq!(sample.edge_type, vec![0, 0, 0, 0]);
        assert_eq!(sample.edge_attr[0], vec![1.0, 0.0, 0.0, 0.0]);
        assert_eq!(sample.idx, 5);
        assert_eq!(sample.y, vec![0.7]);
        assert_eq!(sample.y_columns, vec![0]);
    }

    #[test]
    fn edge_count_is_twice_bond_count() {
        let rec = methanol();
        let sample = featurize(&rec, &lipo_vocab(), &[], 0).unwrap();
        assert_eq!(sample.num_edges(), 2 * rec.bond_count());
    }

    #[test]
    fn edge_order_does_not_depend_on_bond_order_in_file() {
        let forward = featurize(&methanol(), &lipo_vocab(), &[], 0).unwrap();
        let reversed = record(
            methanol().atoms().to_vec(),
            methanol().bonds().iter().rev().cloned().collect(),
        );
        let backward = featurize(&reversed, &lipo_vocab(), &[], 0).unwrap();
        assert_eq!(forward.edge_index, backward.edge_index);
        assert_eq!(forward.edge_type, backward.edge_type);
        assert_eq!(forward.edge_attr, backward.edge_attr);
    }

    #[test]
    fn mixed_bond_features_follow_the_edge_permutation() {
        let atoms = vec![
            Atom::new(Element::C, [0.0, 0.0, 0.0]),
            Atom::new(Element::O, [1.2, 0.0, 0.0]),
            Atom::new(Element::N, [-1.4, 0.0, 0.0]),
        ];
        let bonds = vec![
            Bond::new(0, 1, BondOrder::Double),
            Bond::new(2, 0, BondOrder::Single),
        ];
        let forward = featurize(&record(atoms.clone(), bonds.clone()), &lipo_vocab(), &[], 0).unwrap();
        let backward = featurize(
            &record(atoms, bonds.into_iter().rev().collect()),
            &lipo_vocab(),
            &[],
            0,
        )
        .unwrap();

        assert_eq!(forward.edge_index, vec![[0, 1], [0, 2], [1, 0], [2, 0]]);
        assert_eq!(forward.edge_type, vec![1, 0, 1, 0]);
        assert_eq!(forward.edge_attr[0], vec![0.0, 1.0, 0.0, 0.0]);
        assert_eq!(forward.edge_attr[1], vec![1.0, 0.0, 0.0, 0.0]);
        assert_eq!(forward.edge_index, backward.edge_index);
        assert_eq!(forward.edge_attr, backward.edge_attr);
    }

    #[test]
    fn node_rows_have_one_hot_and_scalars() {
        let vocab = lipo_vocab();
        let sample = featurize(&methanol(), &vocab, &[], 0).unwrap();
        assert_eq!(sample.x.len(), 3);
        assert_eq!(sample.node_feature_dim(), vocab.node_feature_dim());
        for row in &sample.x {
            let hot: f32 = row[..vocab.atoms.len()].iter().sum();
            assert_eq!(hot, 1.0);
        }

        let oxygen = &sample.x[1];
        assert_eq!(oxygen[4], 1.0);
        let scalars = &oxygen[vocab.atoms.len()..];
        // atomic number, aromatic, sp, sp2, sp3, num_hs
        assert_eq!(scalars, [8.0, 0.0, 0.0, 0.0, 1.0, 1.0]);
        assert_eq!(sample.x[0][vocab.atoms.len() + 5], 0.0);
        assert_eq!(sample.z, vec![6, 8, 1]);
    }

    #[test]
    fn aromatic_ring_sets_aromatic_and_sp2() {
        let atoms: Vec<_> = (0..6)
            .map(|i| Atom::new(Element::C, [i as f64, 0.0, 0.0]))
            .collect();
        let bonds: Vec<_> = (0..6)
            .map(|i| Bond::new(i, (i + 1) % 6, BondOrder::Aromatic))
            .collect();
        let vocab = lipo_vocab();
        let sample = featurize(&record(atoms, bonds), &vocab, &[], 0).unwrap();
        let t = vocab.atoms.len();
        for row in &sample.x {
            assert_eq!(&row[t + 1..t + 5], [1.0, 0.0, 1.0, 0.0]);
        }
        assert!(sample.edge_type.iter().all(|&e| e == 3));
        assert_eq!(sample.smiles, "c1ccccc1");
    }

    #[test]
    fn unknown_atom_type_is_an_error() {
        let rec = record(
            vec![
                Atom::new(Element::C, [0.0; 3]),
                Atom::new(Element::Na, [2.0, 0.0, 0.0]),
            ],
            vec![],
        );
        match featurize(&rec, &lipo_vocab(), &[], 0) {
            Err(Error::UnknownAtomType { symbol, atom }) => {
                assert_eq!(symbol, "Na");
                assert_eq!(atom, 1);
            }
            other => panic!("expected unknown atom type, got {other:?}"),
        }
    }

    #[test]
    fn dative_bond_needs_vocabulary_entry() {
        let rec = record(
            vec![
                Atom::new(Element::N, [0.0; 3]),
                Atom::new(Element::B, [1.6, 0.0, 0.0]),
            ],
            vec![Bond::new(0, 1, BondOrder::Dative)],
        );
        assert!(matches!(
            featurize(&rec, &lipo_vocab(), &[], 0),
            Err(Error::UnknownBondType {
                order: BondOrder::Dative,
                bond: 0
            })
        ));
    }

    #[test]
    fn bond_past_the_last_atom_is_an_error() {
        let rec = MoleculeRecord::new(
            "dangling",
            vec![Atom::new(Element::C, [0.0; 3])],
            vec![Bond::new(0, 3, BondOrder::Single)],
            BTreeMap::new(),
        );
        assert!(matches!(
            featurize(&rec, &lipo_vocab(), &[], 0),
            Err(Error::BondOutOfRange {
                bond: 0,
                atom: 3,
                atom_count: 1
            })
        ));
    }
}
