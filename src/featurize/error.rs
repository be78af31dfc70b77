//! Error types for graph encoding.

use crate::model::types::BondOrder;
use thiserror::Error;

/// Errors that can occur while encoding a molecule record as a graph.
///
/// The vocabulary variants mean the dataset definition does not cover the
/// chemistry in its own raw files, so they are not recovered from.
#[derive(Debug, Error)]
pub enum Error {
    /// An atom's element is not part of the atom-type vocabulary.
    #[error("atom {atom} has element '{symbol}', which is not in the atom-type vocabulary")]
    UnknownAtomType {
        /// Element symbol as found in the record.
        symbol: String,
        /// Zero-based atom index within the record.
        atom: usize,
    },

    /// A bond's order is not part of the bond-type vocabulary.
    #[error("bond {bond} has order '{order}', which is not in the bond-type vocabulary")]
    UnknownBondType {
        /// The offending bond order.
        order: BondOrder,
        /// Zero-based bond index within the record.
        bond: usize,
    },

    /// A bond refers to an atom index past the end of the atom list.
    #[error("bond {bond} refers to atom {atom}, but the record has {atom_count} atoms")]
    BondOutOfRange {
        bond: usize,
        atom: usize,
        atom_count: usize,
    },
}
