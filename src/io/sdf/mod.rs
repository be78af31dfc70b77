//! Multi-record SDF (V2000 CTfile) supplier.
//!
//! Records are yielded in file order. A malformed record produces an `Err` for
//! that position and the supplier moves on to the next `$$$$` terminator, so
//! callers can keep source positions aligned with other per-record inputs.

mod reader;

pub use reader::{SdfReader, count_records};
