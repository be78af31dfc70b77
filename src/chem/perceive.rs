use std::fmt;
use std::str::FromStr;

use crate::model::atom::Atom;
use crate::model::molecule::Bond;
use crate::model::types::{BondOrder, Element, Hybridization};

/// How much chemistry is inferred for atoms read from a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Perception {
    /// Aromatic flags from aromatic bonds only; hybridization stays unspecified.
    Minimal,
    /// Aromatic flags plus hybridization derived from bond orders and degree.
    #[default]
    Topological,
}

impl fmt::Display for Perception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Perception::Minimal => write!(f, "minimal"),
            Perception::Topological => write!(f, "topological"),
        }
    }
}

impl FromStr for Perception {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "minimal" => Ok(Perception::Minimal),
            "topological" => Ok(Perception::Topological),
            _ => Err(format!("unknown perception mode '{s}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct BondTally {
    degree: usize,
    double: usize,
    triple: usize,
    aromatic: usize,
}

pub fn perceive(atoms: &mut [Atom], bonds: &[Bond], mode: Perception) {
    let mut tallies = vec![BondTally::default(); atoms.len()];

    for bond in bonds {
        for idx in [bond.begin, bond.end] {
            let Some(tally) = tallies.get_mut(idx) else {
                continue;
            };
            tally.degree += 1;
            match bond.order {
                BondOrder::Double => tally.double += 1,
                BondOrder::Triple => tally.triple += 1,
                BondOrder::Aromatic => tally.aromatic += 1,
                BondOrder::Single | BondOrder::Dative => {}
            }
        }
    }

    for (atom, tally) in atoms.iter_mut().zip(&tallies) {
        atom.aromatic = tally.aromatic > 0;
        atom.hybridization = match mode {
            Perception::Minimal => Hybridization::Unspecified,
            Perception::Topological => hybridization_of(atom.element, tally),
        };
    }
}

fn hybridization_of(element: Element, tally: &BondTally) -> Hybridization {
    if matches!(element, Element::H | Element::He) {
        return Hybridization::S;
    }
    if tally.degree == 0 {
        return Hybridization::Unspecified;
    }
    if tally.triple > 0 || tally.double >= 2 {
        return Hybridization::Sp;
    }
    if tally.double == 1 || tally.aromatic > 0 {
        return Hybridization::Sp2;
    }
    match tally.degree {
        0..=4 => Hybridization::Sp3,
        5 => Hybridization::Sp3d,
        _ => Hybridization::Sp3d2,
    }
}
