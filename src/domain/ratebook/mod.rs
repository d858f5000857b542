//! Ratebook aggregate
//!
//! Per-(client, warehouse) tariffs, the dependent/independent link they
//! carry, and the read port the tariff resolver queries.

pub mod model;
pub mod repository;
pub mod tariff;

pub use model::{EntryLink, NewRatebookEntry, RateSource, RatebookEntry};
pub use repository::RatebookLookup;
pub use tariff::{
    FallbackReason, FallbackTariff, Resolution, ResolutionOutcome, Tariff, TariffQuery,
    FALLBACK_TARIFF_ID,
};
