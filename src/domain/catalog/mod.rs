//! Catalog aggregate
//!
//! Named groups of rates and the rate assignments they own.

pub mod model;

pub use model::{AssignmentChange, Catalog, CatalogRateAssignment};
