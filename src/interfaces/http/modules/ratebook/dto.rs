//! Ratebook DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::{
    EntryLink, NewRatebookEntry, RatebookEntry, Resolution, ResolutionOutcome, Tariff, TariffQuery,
    FALLBACK_TARIFF_ID,
};
use crate::interfaces::http::modules::rates::PricingDto;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EntryResponse {
    pub id: i32,
    pub client_id: String,
    pub warehouse_id: String,
    #[serde(flatten)]
    pub pricing: PricingDto,
    /// Maintained by propagation; false once edited directly
    pub dependent: bool,
    /// Catalog/rate the entry mirrors, or was detached from
    pub catalog_id: Option<i32>,
    pub rate_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RatebookEntry> for EntryResponse {
    fn from(e: RatebookEntry) -> Self {
        let source = match e.link {
            EntryLink::Dependent(src) => Some(src),
            EntryLink::Independent { origin } => origin,
        };
        Self {
            id: e.id,
            client_id: e.client_id,
            warehouse_id: e.warehouse_id,
            pricing: e.pricing.into(),
            dependent: e.link.is_dependent(),
            catalog_id: source.map(|s| s.catalog_id),
            rate_id: source.map(|s| s.rate_id),
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEntryRequest {
    #[validate(length(min = 1, max = 64, message = "client_id is required"))]
    pub client_id: String,
    #[validate(length(min = 1, max = 64, message = "warehouse_id is required"))]
    pub warehouse_id: String,
    #[serde(flatten)]
    #[validate(nested)]
    pub pricing: PricingDto,
}

impl From<CreateEntryRequest> for NewRatebookEntry {
    fn from(r: CreateEntryRequest) -> Self {
        Self {
            client_id: r.client_id,
            warehouse_id: r.warehouse_id,
            pricing: r.pricing.into(),
        }
    }
}

/// Link a client/warehouse pair to a catalog
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubscribeRequest {
    #[validate(length(min = 1, max = 64))]
    pub client_id: String,
    #[validate(length(min = 1, max = 64))]
    pub warehouse_id: String,
    pub catalog_id: i32,
}

/// Tariff lookup key
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MatchParams {
    pub client_id: String,
    pub warehouse_id: String,
    pub operator_id: String,
    pub service_id: String,
    /// Shipment weight; must fall in `[weight_min, weight_max)`
    pub weight: f64,
}

impl From<MatchParams> for TariffQuery {
    fn from(p: MatchParams) -> Self {
        Self {
            client_id: p.client_id,
            warehouse_id: p.warehouse_id,
            operator_id: p.operator_id,
            service_id: p.service_id,
            weight: p.weight,
        }
    }
}

/// Computed default tariff; never stored, so only id 0 and pricing
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DefaultTariffResponse {
    pub id: i32,
    #[serde(flatten)]
    pub pricing: PricingDto,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum TariffBody {
    Entry(EntryResponse),
    Default(DefaultTariffResponse),
}

/// The tariff a shipment is priced with
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TariffResponse {
    /// The matching ratebook entry as stored, or the default tariff (id 0)
    #[serde(flatten)]
    pub tariff: TariffBody,
    /// `matched`, `ambiguous` or `fallback`
    pub outcome: String,
    /// Set for fallbacks: `unconfigured` or `no_band_match`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Competing entries when the outcome is `ambiguous`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidates: Option<usize>,
}

impl From<Tariff> for TariffBody {
    fn from(t: Tariff) -> Self {
        match t {
            Tariff::Configured(entry) => TariffBody::Entry(entry.into()),
            Tariff::Fallback(pricing) => TariffBody::Default(DefaultTariffResponse {
                id: FALLBACK_TARIFF_ID,
                pricing: pricing.into(),
            }),
        }
    }
}

impl From<Resolution> for TariffResponse {
    fn from(r: Resolution) -> Self {
        let (reason, candidates) = match r.outcome {
            ResolutionOutcome::Fallback(reason) => (Some(reason.as_str().to_string()), None),
            ResolutionOutcome::Ambiguous { candidates } => (None, Some(candidates)),
            ResolutionOutcome::Matched => (None, None),
        };
        Self {
            tariff: r.tariff.into(),
            outcome: r.outcome.as_str().to_string(),
            reason,
            candidates,
        }
    }
}
