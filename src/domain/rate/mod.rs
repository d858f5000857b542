//! Rate aggregate
//!
//! Reusable pricing rules keyed by operator, service and weight band.

pub mod model;

pub use model::{NewRate, Rate};
