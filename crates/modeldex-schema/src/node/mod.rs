//! Typed schema descriptors.
//!
//! Raw records become nodes during the decode phase of a load. Nodes are
//! immutable afterwards; every lookup structure they carry (reverse indexes,
//! option tables, the state arena) is built once, here.

mod config;
mod enum_table;
mod field;
mod model;
mod state_chart;

pub use config::*;
pub use enum_table::*;
pub use field::*;
pub use model::*;
pub use state_chart::*;
