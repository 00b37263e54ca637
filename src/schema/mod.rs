//! Schema module - Configuration and persisted record types for colony simulations.

mod config;
mod records;

pub use config::*;
pub use records::*;
