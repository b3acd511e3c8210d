//! # forna
//!
//! RNA secondary structures as node/link graphs for force directed layouts.
//!
//! This crate re-exports the main functionality from its submodules.

pub mod input_parsers;
pub mod graph_parsers;

pub mod structure {
    pub use ::fo_structure::*;
}

pub mod graph {
    pub use ::fo_graph::*;
}
