//! # fo_structure
//!
//! Secondary structure notation, pair tables, pseudoknot removal and the
//! decomposition of nested structures into structural elements.

pub mod brackets;

mod error;
mod dotbracket;
mod pair_table;
mod pseudoknots;
mod unmatched;
mod elements;

pub use error::*;
pub use dotbracket::*;
pub use pair_table::*;
pub use pseudoknots::*;
pub use unmatched::*;
pub use elements::*;

