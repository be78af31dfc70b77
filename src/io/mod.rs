//! Reading raw inputs and persisting processed collections.
//!
//! - [`sdf`] – Multi-record SDF (V2000 CTfile) supplier.
//! - [`targets`] – CSV target tables aligned with SDF records by position.
//! - [`cache`] – Versioned bincode cache of encoded collections.
//! - [`download`] – Archive download and extraction into the raw directory.

use std::fmt;

pub mod cache;
pub mod download;
pub mod error;
pub mod sdf;
pub mod targets;
pub mod util;

pub use error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Sdf,
    Csv,
    Cache,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Sdf => write!(f, "SDF"),
            Format::Csv => write!(f, "CSV"),
            Format::Cache => write!(f, "cache"),
        }
    }
}
