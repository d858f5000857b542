//! Rate DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::{Pricing, PricingPatch, Rate};

/// Pricing fields shared by rates, ratebook entries and resolved tariffs
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct PricingDto {
    #[validate(length(min = 1, max = 64, message = "operator_id is required"))]
    pub operator_id: String,
    #[validate(length(min = 1, max = 64, message = "service_id is required"))]
    pub service_id: String,
    #[validate(length(min = 1, max = 255, message = "name is required"))]
    pub name: String,
    /// Inclusive lower bound of the weight band
    pub weight_min: f64,
    /// Exclusive upper bound of the weight band
    pub weight_max: f64,
    pub fixed_fee: f64,
    /// `fixed_fee` is a percentage instead of a flat amount
    #[serde(default)]
    pub percentage: bool,
}

impl From<Pricing> for PricingDto {
    fn from(p: Pricing) -> Self {
        Self {
            operator_id: p.operator_id,
            service_id: p.service_id,
            name: p.name,
            weight_min: p.weight_min,
            weight_max: p.weight_max,
            fixed_fee: p.fixed_fee,
            percentage: p.percentage,
        }
    }
}

impl From<PricingDto> for Pricing {
    fn from(d: PricingDto) -> Self {
        Self {
            operator_id: d.operator_id,
            service_id: d.service_id,
            name: d.name,
            weight_min: d.weight_min,
            weight_max: d.weight_max,
            fixed_fee: d.fixed_fee,
            percentage: d.percentage,
        }
    }
}

/// Partial pricing update; omitted fields keep their value
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct PricingPatchDto {
    #[validate(length(min = 1, max = 64))]
    pub operator_id: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub service_id: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub weight_min: Option<f64>,
    pub weight_max: Option<f64>,
    pub fixed_fee: Option<f64>,
    pub percentage: Option<bool>,
}

impl From<PricingPatchDto> for PricingPatch {
    fn from(d: PricingPatchDto) -> Self {
        Self {
            operator_id: d.operator_id,
            service_id: d.service_id,
            name: d.name,
            weight_min: d.weight_min,
            weight_max: d.weight_max,
            fixed_fee: d.fixed_fee,
            percentage: d.percentage,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RateResponse {
    pub id: i32,
    #[serde(flatten)]
    pub pricing: PricingDto,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Rate> for RateResponse {
    fn from(r: Rate) -> Self {
        Self {
            id: r.id,
            pricing: r.pricing.into(),
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

pub type CreateRateRequest = PricingDto;
pub type UpdateRateRequest = PricingPatchDto;
