//! Use cases over the ratebook: registries, propagation and resolution.

pub mod services;

pub use services::{
    AssignmentOutcome, CatalogRegistry, PropagationEngine, RateRegistry, TariffResolver,
};
