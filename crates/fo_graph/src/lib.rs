//! # fo_graph
//!
//! The node/link graph of one or more RNA molecules, as handed to a force
//! layout. `RnaContainer` keeps the molecules and rebuilds the graph when
//! structures change.

mod error;
mod model;
mod builder;
mod container;

pub use error::*;
pub use model::*;
pub use builder::*;
pub use container::*;
