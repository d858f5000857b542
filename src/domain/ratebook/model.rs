//! Ratebook entry domain entity

use chrono::{DateTime, Utc};

use crate::domain::{Pricing, PricingPatch};

/// The catalog/rate pair a dependent entry mirrors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RateSource {
    pub catalog_id: i32,
    pub rate_id: i32,
}

/// How an entry relates to the upstream rate tier.
///
/// `Dependent` entries are owned by propagation and always mirror their
/// rate. `Independent` entries were created or edited directly and are never
/// touched by propagation again; `origin` is kept only as history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryLink {
    Dependent(RateSource),
    Independent { origin: Option<RateSource> },
}

impl EntryLink {
    pub fn is_dependent(&self) -> bool {
        matches!(self, EntryLink::Dependent(_))
    }

    /// The live propagation source, if any.
    pub fn source(&self) -> Option<RateSource> {
        match self {
            EntryLink::Dependent(src) => Some(*src),
            EntryLink::Independent { .. } => None,
        }
    }

    /// Detach from propagation. Idempotent and one-way.
    pub fn detached(self) -> Self {
        match self {
            EntryLink::Dependent(src) => EntryLink::Independent { origin: Some(src) },
            independent => independent,
        }
    }
}

/// A resolvable tariff scoped to one client and warehouse
#[derive(Debug, Clone, PartialEq)]
pub struct RatebookEntry {
    pub id: i32,
    pub client_id: String,
    pub warehouse_id: String,
    pub pricing: Pricing,
    pub link: EntryLink,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl RatebookEntry {
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }

    /// Apply a client-facing edit: merge the fields and detach from
    /// propagation, even when the patch changes nothing.
    pub fn edit(&mut self, patch: PricingPatch) {
        self.pricing.apply(patch);
        self.link = self.link.detached();
    }
}

/// Input for a caller-owned entry; always independent
#[derive(Debug, Clone)]
pub struct NewRatebookEntry {
    pub client_id: String,
    pub warehouse_id: String,
    pub pricing: Pricing,
}
