//! Canonical SMILES generation.
//!
//! Atoms are ranked by iterative refinement of local invariants (element, degree,
//! charge, aromaticity, hydrogen neighbours, bond-order sum) over neighbour ranks.
//! Remaining ties are broken by promoting the lowest-indexed member of the
//! lowest tied class and refining again until every atom has a unique rank.
//! The string is then written by a depth-first walk that always visits the
//! lowest-ranked neighbour first. Stereochemistry is not encoded.

use std::collections::BTreeSet;

use crate::model::atom::Atom;
use crate::model::molecule::Bond;
use crate::model::types::{BondOrder, Element};

pub fn write(atoms: &[Atom], bonds: &[Bond]) -> String {
    if atoms.is_empty() {
        return String::new();
    }

    let graph = Adjacency::new(atoms.len(), bonds);
    let ranks = canonical_ranks(atoms, bonds, &graph);
    Writer::new(atoms, bonds, &graph, &ranks).write()
}

struct Adjacency {
    /// `(neighbour, bond index)` pairs per atom.
    neighbours: Vec<Vec<(usize, usize)>>,
}

impl Adjacency {
    fn new(atom_count: usize, bonds: &[Bond]) -> Self {
        let mut neighbours = vec![Vec::new(); atom_count];
        for (b, bond) in bonds.iter().enumerate() {
            if bond.begin == bond.end || bond.begin >= atom_count || bond.end >= atom_count {
                continue;
            }
            neighbours[bond.begin].push((bond.end, b));
            neighbours[bond.end].push((bond.begin, b));
        }
        Self { neighbours }
    }
}

fn bond_code(order: BondOrder) -> u8 {
    match order {
        BondOrder::Single => 1,
        BondOrder::Double => 2,
        BondOrder::Triple => 3,
        BondOrder::Aromatic => 4,
        BondOrder::Dative => 5,
    }
}

fn dense_ranks<K: Ord>(keys: &[K]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..keys.len()).collect();
    order.sort_by(|&a, &b| keys[a].cmp(&keys[b]));

    let mut ranks = vec![0; keys.len()];
    let mut rank = 0;
    for w in 0..order.len() {
        if w > 0 && keys[order[w]] != keys[order[w - 1]] {
            rank += 1;
        }
        ranks[order[w]] = rank;
    }
    ranks
}

fn class_count(ranks: &[usize]) -> usize {
    ranks.iter().max().map_or(0, |&r| r + 1)
}

fn refine(mut ranks: Vec<usize>, bonds: &[Bond], graph: &Adjacency) -> Vec<usize> {
    loop {
        let keys: Vec<(usize, Vec<(usize, u8)>)> = graph
            .neighbours
            .iter()
            .enumerate()
            .map(|(i, nbrs)| {
                let mut env: Vec<(usize, u8)> = nbrs
                    .iter()
                    .map(|&(j, b)| (ranks[j], bond_code(bonds[b].order)))
                    .collect();
                env.sort_unstable();
                (ranks[i], env)
            })
            .collect();

        let next = dense_ranks(&keys);
        if class_count(&next) == class_count(&ranks) {
            return next;
        }
        ranks = next;
    }
}

fn canonical_ranks(atoms: &[Atom], bonds: &[Bond], graph: &Adjacency) -> Vec<usize> {
    let invariants: Vec<_> = atoms
        .iter()
        .zip(&graph.neighbours)
        .map(|(atom, nbrs)| {
            let h_neighbours = nbrs.iter().filter(|&&(j, _)| atoms[j].is_hydrogen()).count();
            let order_sum: u32 = nbrs
                .iter()
                .map(|&(_, b)| (bonds[b].order.value() * 2.0) as u32)
                .sum();
            (
                atom.atomic_number(),
                nbrs.len(),
                atom.formal_charge,
                atom.aromatic,
                h_neighbours,
                order_sum,
            )
        })
        .collect();

    let n = atoms.len();
    let mut ranks = refine(dense_ranks(&invariants), bonds, graph);

    while class_count(&ranks) < n {
        let mut sizes = vec![0usize; n];
        for &r in &ranks {
            sizes[r] += 1;
        }
        let Some(tied) = sizes.iter().position(|&s| s > 1) else {
            break;
        };
        let Some(chosen) = ranks.iter().position(|&r| r == tied) else {
            break;
        };

        let keys: Vec<(usize, bool)> = ranks
            .iter()
            .enumerate()
            .map(|(i, &r)| (r, i != chosen))
            .collect();
        ranks = refine(dense_ranks(&keys), bonds, graph);
    }

    ranks
}

struct Writer<'a> {
    atoms: &'a [Atom],
    bonds: &'a [Bond],
    graph: &'a Adjacency,
    ranks: &'a [usize],
    visited: Vec<bool>,
    bond_used: Vec<bool>,
    children: Vec<Vec<(usize, usize)>>,
    ring_opens: Vec<Vec<(usize, usize)>>,
    ring_closes: Vec<Vec<(usize, usize)>>,
    open_digits: Vec<Option<usize>>,
    digits_in_use: BTreeSet<usize>,
}

impl<'a> Writer<'a> {
    fn new(
        atoms: &'a [Atom],
        bonds: &'a [Bond],
        graph: &'a Adjacency,
        ranks: &'a [usize],
    ) -> Self {
        let n = atoms.len();
        Self {
            atoms,
            bonds,
            graph,
            ranks,
            visited: vec![false; n],
            bond_used: vec![false; bonds.len()],
            children: vec![Vec::new(); n],
            ring_opens: vec![Vec::new(); n],
            ring_closes: vec![Vec::new(); n],
            open_digits: vec![None; bonds.len()],
            digits_in_use: BTreeSet::new(),
        }
    }

    fn write(mut self) -> String {
        let mut by_rank: Vec<usize> = (0..self.atoms.len()).collect();
        by_rank.sort_by_key(|&i| self.ranks[i]);

        let mut fragments = Vec::new();
        for start in by_rank {
            if self.visited[start] {
                continue;
            }
            self.traverse(start);
            let mut out = String::new();
            self.emit(start, &mut out);
            fragments.push(out);
        }
        fragments.join(".")
    }

    fn sorted_neighbours(&self, atom: usize) -> Vec<(usize, usize)> {
        let mut nbrs = self.graph.neighbours[atom].clone();
        nbrs.sort_by_key(|&(j, _)| self.ranks[j]);
        nbrs
    }

    fn traverse(&mut self, atom: usize) {
        self.visited[atom] = true;
        for (nbr, b) in self.sorted_neighbours(atom) {
            if self.bond_used[b] {
                continue;
            }
            self.bond_used[b] = true;
            if self.visited[nbr] {
                self.ring_opens[nbr].push((atom, b));
                self.ring_closes[atom].push((nbr, b));
            } else {
                self.children[atom].push((nbr, b));
                self.traverse(nbr);
            }
        }
    }

    fn emit(&mut self, atom: usize, out: &mut String) {
        out.push_str(&atom_token(&self.atoms[atom]));

        for (_, b) in self.ring_closes[atom].clone() {
            if let Some(digit) = self.open_digits[b].take() {
                self.digits_in_use.remove(&digit);
                push_digit(out, digit);
            }
        }

        for (partner, b) in self.ring_opens[atom].clone() {
            let digit = self.next_digit();
            self.open_digits[b] = Some(digit);
            out.push_str(self.bond_symbol(b, atom, partner));
            push_digit(out, digit);
        }

        let children = self.children[atom].clone();
        let last = children.len().saturating_sub(1);
        for (k, (child, b)) in children.into_iter().enumerate() {
            let branch = k < last;
            if branch {
                out.push('(');
            }
            out.push_str(self.bond_symbol(b, atom, child));
            self.emit(child, out);
            if branch {
                out.push(')');
            }
        }
    }

    fn next_digit(&mut self) -> usize {
        let mut digit = 1;
        while self.digits_in_use.contains(&digit) {
            digit += 1;
        }
        self.digits_in_use.insert(digit);
        digit
    }

    fn bond_symbol(&self, b: usize, from: usize, to: usize) -> &'static str {
        let both_aromatic = self.atoms[from].aromatic && self.atoms[to].aromatic;
        let bond = &self.bonds[b];
        match bond.order {
            BondOrder::Single if both_aromatic => "-",
            BondOrder::Single => "",
            BondOrder::Double => "=",
            BondOrder::Triple => "#",
            BondOrder::Aromatic if both_aromatic => "",
            BondOrder::Aromatic => ":",
            BondOrder::Dative if bond.begin == from => "->",
            BondOrder::Dative => "<-",
        }
    }
}

fn push_digit(out: &mut String, digit: usize) {
    if digit < 10 {
        out.push_str(&digit.to_string());
    } else {
        out.push('%');
        out.push_str(&digit.to_string());
    }
}

fn atom_token(atom: &Atom) -> String {
    let element = atom.element;
    let aromatic_symbol = atom.aromatic
        && matches!(
            element,
            Element::B
                | Element::C
                | Element::N
                | Element::O
                | Element::P
                | Element::S
                | Element::As
                | Element::Se
        );
    let symbol = if aromatic_symbol {
        element.symbol().to_lowercase()
    } else {
        element.symbol().to_string()
    };

    if atom.formal_charge == 0 && element.is_organic_subset() {
        return symbol;
    }

    let charge = match atom.formal_charge {
        0 => String::new(),
        1 => "+".to_string(),
        -1 => "-".to_string(),
        c if c > 0 => format!("+{c}"),
        c => format!("-{}", -i16::from(c)),
    };
    format!("[{symbol}{charge}]")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom(el: Element) -> Atom {
        Atom::new(el, [0.0; 3])
    }

    fn aromatic(el: Element) -> Atom {
        let mut a = Atom::new(el, [0.0; 3]);
        a.aromatic = true;
        a
    }

    #[test]
    fn writes_simple_chain() {
        let atoms = vec![atom(Element::C), atom(Element::C), atom(Element::O)];
        let bonds = vec![
            Bond::new(0, 1, BondOrder::Single),
            Bond::new(1, 2, BondOrder::Single),
        ];
        assert_eq!(write(&atoms, &bonds), "CCO");
    }

    #[test]
    fn output_is_independent_of_atom_order() {
        let atoms = vec![atom(Element::O), atom(Element::C), atom(Element::C)];
        let bonds = vec![
            Bond::new(2, 1, BondOrder::Single),
            Bond::new(0, 1, BondOrder::Single),
        ];
        assert_eq!(write(&atoms, &bonds), "CCO");
    }

    #[test]
    fn writes_aromatic_ring_with_closure() {
        let atoms: Vec<_> = (0..6).map(|_| aromatic(Element::C)).collect();
        let bonds: Vec<_> = (0..6)
            .map(|i| Bond::new(i, (i + 1) % 6, BondOrder::Aromatic))
            .collect();
        assert_eq!(write(&atoms, &bonds), "c1ccccc1");
    }

    #[test]
    fn writes_branches_in_parentheses() {
        // isobutane skeleton: central carbon with three methyls
        let atoms = vec![
            atom(Element::C),
            atom(Element::C),
            atom(Element::C),
            atom(Element::C),
        ];
        let bonds = vec![
            Bond::new(0, 1, BondOrder::Single),
            Bond::new(0, 2, BondOrder::Single),
            Bond::new(0, 3, BondOrder::Single),
        ];
        assert_eq!(write(&atoms, &bonds), "CC(C)C");
    }

    #[test]
    fn brackets_charged_and_inorganic_atoms() {
        let atoms = vec![atom(Element::C), atom(Element::O).with_charge(-1)];
        let bonds = vec![Bond::new(0, 1, BondOrder::Single)];
        assert_eq!(write(&atoms, &bonds), "C[O-]");

        let salt = vec![atom(Element::Na).with_charge(1), atom(Element::Cl).with_charge(-1)];
        assert_eq!(write(&salt, &[]), "[Na+].[Cl-]");

        let multi = vec![atom(Element::Fe).with_charge(3)];
        assert_eq!(write(&multi, &[]), "[Fe+3]");
    }

    #[test]
    fn explicit_hydrogens_are_bracketed() {
        let atoms = vec![atom(Element::O), atom(Element::H), atom(Element::H)];
        let bonds = vec![
            Bond::new(0, 1, BondOrder::Single),
            Bond::new(0, 2, BondOrder::Single),
        ];
        assert_eq!(write(&atoms, &bonds), "[H]O[H]");
    }

    #[test]
    fn writes_multiple_bond_symbols() {
        let atoms = vec![atom(Element::N), atom(Element::C), atom(Element::C)];
        let bonds = vec![
            Bond::new(0, 1, BondOrder::Triple),
            Bond::new(1, 2, BondOrder::Single),
        ];
        assert_eq!(write(&atoms, &bonds), "CC#N");
    }

    #[test]
    fn ring_digits_above_nine_use_percent_form() {
        let mut out = String::new();
        push_digit(&mut out, 3);
        push_digit(&mut out, 12);
        assert_eq!(out, "3%12");
    }

    #[test]
    fn empty_molecule_gives_empty_string() {
        assert_eq!(write(&[], &[]), "");
    }
}
