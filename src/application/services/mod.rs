//! Application services
//!
//! Registries own the upstream tiers; every mutation runs its reactive
//! propagation on the same transaction.

pub mod catalog_registry;
pub mod propagation;
pub mod rate_registry;
pub mod resolver;

pub use catalog_registry::{AssignmentOutcome, CatalogRegistry};
pub use propagation::PropagationEngine;
pub use rate_registry::RateRegistry;
pub use resolver::TariffResolver;
