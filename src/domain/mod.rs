//! Domain layer: rates, catalogs, ratebook entries and resolved tariffs.

pub mod catalog;
pub mod pricing;
pub mod rate;
pub mod ratebook;

pub use catalog::{AssignmentChange, Catalog, CatalogRateAssignment};
pub use pricing::{Pricing, PricingPatch};
pub use rate::{NewRate, Rate};
pub use ratebook::{
    EntryLink, FallbackReason, FallbackTariff, NewRatebookEntry, RateSource, RatebookEntry,
    RatebookLookup, Resolution, ResolutionOutcome, Tariff, TariffQuery, FALLBACK_TARIFF_ID,
};

pub use crate::shared::errors::DomainError;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
