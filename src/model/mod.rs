//! Core data structures flowing through `molgraph`.
//!
//! - [`types`] – Periodic table elements, bond orders and hybridization states.
//! - [`atom`] – Atom with element, Cartesian coordinates and perceived annotations.
//! - [`molecule`] – Immutable molecule records as read from structure files.
//! - [`graph`] – Encoded graph samples and the collection that gets cached.
//!
//! Raw chemistry ([`MoleculeRecord`]) and encoded graphs ([`GraphSample`]) are kept
//! apart so the [`crate::featurize`] stage can turn one into the other.
//!
//! [`MoleculeRecord`]: molecule::MoleculeRecord
//! [`GraphSample`]: graph::GraphSample

pub mod atom;
pub mod graph;
pub mod molecule;
pub mod types;
