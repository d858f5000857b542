//! Resolved tariffs and the rules for picking one

use serde::Deserialize;

use super::model::RatebookEntry;
use crate::domain::Pricing;

/// Sentinel id of the computed default tariff
pub const FALLBACK_TARIFF_ID: i32 = 0;

/// Lookup key for tariff resolution
#[derive(Debug, Clone, PartialEq)]
pub struct TariffQuery {
    pub client_id: String,
    pub warehouse_id: String,
    pub operator_id: String,
    pub service_id: String,
    pub weight: f64,
}

/// Values of the synthesized tariff returned when nothing matches.
///
/// Deserializable so it can live in the `[resolver]` config section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FallbackTariff {
    pub name: String,
    pub weight_min: f64,
    pub weight_max: f64,
    pub fixed_fee: f64,
    pub percentage: bool,
}

impl Default for FallbackTariff {
    fn default() -> Self {
        Self {
            name: "default tariff".to_string(),
            weight_min: 0.0,
            weight_max: 500.0,
            fixed_fee: 30.0,
            percentage: true,
        }
    }
}

impl FallbackTariff {
    fn pricing_for(&self, query: &TariffQuery) -> Pricing {
        Pricing {
            operator_id: query.operator_id.clone(),
            service_id: query.service_id.clone(),
            name: self.name.clone(),
            weight_min: self.weight_min,
            weight_max: self.weight_max,
            fixed_fee: self.fixed_fee,
            percentage: self.percentage,
        }
    }
}

/// The tariff a quote is priced with
#[derive(Debug, Clone, PartialEq)]
pub enum Tariff {
    Configured(RatebookEntry),
    /// Computed, never persisted
    Fallback(Pricing),
}

impl Tariff {
    pub fn id(&self) -> i32 {
        match self {
            Tariff::Configured(entry) => entry.id,
            Tariff::Fallback(_) => FALLBACK_TARIFF_ID,
        }
    }

    pub fn pricing(&self) -> &Pricing {
        match self {
            Tariff::Configured(entry) => &entry.pricing,
            Tariff::Fallback(pricing) => pricing,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Tariff::Fallback(_))
    }
}

/// Why the fallback was used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// The client/warehouse pair has no active entries at all.
    Unconfigured,
    /// The pair has entries, none covering this operator/service/weight.
    NoBandMatch,
}

impl FallbackReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unconfigured => "unconfigured",
            Self::NoBandMatch => "no_band_match",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionOutcome {
    Matched,
    /// Several entries matched; the most recently updated one won.
    Ambiguous { candidates: usize },
    Fallback(FallbackReason),
}

impl ResolutionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Matched => "matched",
            Self::Ambiguous { .. } => "ambiguous",
            Self::Fallback(_) => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub tariff: Tariff,
    pub outcome: ResolutionOutcome,
}

impl Resolution {
    /// Pick among entries returned for `query`.
    ///
    /// Candidates that are inactive or whose band does not cover the weight
    /// are discarded. Several survivors resolve to the one updated last,
    /// then the highest id.
    pub fn from_candidates(
        query: &TariffQuery,
        candidates: Vec<RatebookEntry>,
    ) -> Option<Resolution> {
        let mut matching: Vec<RatebookEntry> = candidates
            .into_iter()
            .filter(|e| {
                e.is_active()
                    && e.client_id == query.client_id
                    && e.warehouse_id == query.warehouse_id
                    && e.pricing.operator_id == query.operator_id
                    && e.pricing.service_id == query.service_id
                    && e.pricing.covers(query.weight)
            })
            .collect();

        let count = matching.len();
        matching.sort_by(|a, b| (b.updated_at, b.id).cmp(&(a.updated_at, a.id)));
        let winner = matching.into_iter().next()?;

        let outcome = if count > 1 {
            ResolutionOutcome::Ambiguous { candidates: count }
        } else {
            ResolutionOutcome::Matched
        };
        Some(Resolution {
            tariff: Tariff::Configured(winner),
            outcome,
        })
    }

    pub fn fallback(query: &TariffQuery, values: &FallbackTariff, reason: FallbackReason) -> Self {
        Resolution {
            tariff: Tariff::Fallback(values.pricing_for(query)),
            outcome: ResolutionOutcome::Fallback(reason),
        }
    }
}
