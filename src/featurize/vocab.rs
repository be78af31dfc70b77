use crate::model::types::{BondOrder, Element};
use std::collections::HashMap;
use std::fmt;

/// Ordered atom types; the position of an element is its one-hot index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomVocabulary {
    elements: Vec<Element>,
    index: HashMap<Element, usize>,
}

impl AtomVocabulary {
    /// Builds the vocabulary; a repeated element keeps its first position.
    pub fn new(elements: Vec<Element>) -> Self {
        let mut index = HashMap::with_capacity(elements.len());
        for (i, &element) in elements.iter().enumerate() {
            index.entry(element).or_insert(i);
        }
        Self { elements, index }
    }

    #[inline]
    pub fn index_of(&self, element: Element) -> Option<usize> {
        self.index.get(&element).copied()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }
}

/// Ordered bond types; the position of an order is its `edge_type` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BondVocabulary {
    orders: Vec<BondOrder>,
}

impl BondVocabulary {
    pub fn new(orders: Vec<BondOrder>) -> Self {
        Self { orders }
    }

    #[inline]
    pub fn index_of(&self, order: BondOrder) -> Option<usize> {
        self.orders.iter().position(|&o| o == order)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn orders(&self) -> &[BondOrder] {
        &self.orders
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    pub atoms: AtomVocabulary,
    pub bonds: BondVocabulary,
}

impl Vocabulary {
    pub fn new(atoms: Vec<Element>, bonds: Vec<BondOrder>) -> Self {
        Self {
            atoms: AtomVocabulary::new(atoms),
            bonds: BondVocabulary::new(bonds),
        }
    }

    /// Width of a node feature row: one-hot atom type plus six scalar features.
    pub fn node_feature_dim(&self) -> usize {
        self.atoms.len() + super::SCALAR_FEATURES
    }
}

impl fmt::Display for Vocabulary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let atoms: Vec<_> = self.atoms.elements.iter().map(Element::symbol).collect();
        let bonds: Vec<_> = self.bonds.orders.iter().map(ToString::to_string).collect();
        write!(f, "{}|{}", atoms.join(","), bonds.join(","))
    }
}
