//! Chemistry perception applied to freshly parsed molecules.
//!
//! - [`perceive`] – Aromaticity flags and hybridization states from bonding topology.
//! - [`smiles`] – Canonical SMILES generation.

pub mod perceive;
pub mod smiles;

pub use perceive::{Perception, perceive};
