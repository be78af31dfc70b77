use super::types::{Element, Hybridization};

#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub element: Element,
    pub position: [f64; 3],
    pub formal_charge: i8,
    pub aromatic: bool,
    pub hybridization: Hybridization,
}

impl Atom {
    pub fn new(element: Element, position: [f64; 3]) -> Self {
        Self {
            element,
            position,
            formal_charge: 0,
            aromatic: false,
            hybridization: Hybridization::Unspecified,
        }
    }

    pub fn with_charge(mut self, formal_charge: i8) -> Self {
        self.formal_charge = formal_charge;
        self
    }

    #[inline]
    pub fn atomic_number(&self) -> u8 {
        self.element.atomic_number()
    }

    #[inline]
    pub fn is_hydrogen(&self) -> bool {
        self.element == Element::H
    }
}
