//! Error types for the appwire protocol layer.

mod registry;

pub use registry::*;
