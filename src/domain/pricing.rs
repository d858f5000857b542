//! Pricing fields shared by rates, ratebook entries and resolved tariffs.

use crate::domain::DomainResult;
use crate::shared::errors::DomainError;

/// The fields a dependent ratebook entry mirrors from its rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Pricing {
    pub operator_id: String,
    pub service_id: String,
    pub name: String,
    /// Inclusive lower bound of the weight band
    pub weight_min: f64,
    /// Exclusive upper bound of the weight band
    pub weight_max: f64,
    /// Flat amount, or a percentage when `percentage` is set
    pub fixed_fee: f64,
    pub percentage: bool,
}

impl Pricing {
    /// Check the band and fee invariants.
    pub fn validate(&self) -> DomainResult<()> {
        if !self.weight_min.is_finite() || !self.weight_max.is_finite() {
            return Err(DomainError::Validation(
                "weight bounds must be finite numbers".to_string(),
            ));
        }
        if self.weight_min >= self.weight_max {
            return Err(DomainError::InvalidRange {
                min: self.weight_min,
                max: self.weight_max,
            });
        }
        if !self.fixed_fee.is_finite() || self.fixed_fee < 0.0 {
            return Err(DomainError::Validation(format!(
                "fixed_fee must be a non-negative number, got {}",
                self.fixed_fee
            )));
        }
        Ok(())
    }

    /// Whether `weight` falls inside `[weight_min, weight_max)`.
    pub fn covers(&self, weight: f64) -> bool {
        self.weight_min <= weight && weight < self.weight_max
    }

    /// Merge a partial update over these fields.
    pub fn apply(&mut self, patch: PricingPatch) {
        if let Some(v) = patch.operator_id {
            self.operator_id = v;
        }
        if let Some(v) = patch.service_id {
            self.service_id = v;
        }
        if let Some(v) = patch.name {
            self.name = v;
        }
        if let Some(v) = patch.weight_min {
            self.weight_min = v;
        }
        if let Some(v) = patch.weight_max {
            self.weight_max = v;
        }
        if let Some(v) = patch.fixed_fee {
            self.fixed_fee = v;
        }
        if let Some(v) = patch.percentage {
            self.percentage = v;
        }
    }
}

/// Partial update of [`Pricing`]; `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct PricingPatch {
    pub operator_id: Option<String>,
    pub service_id: Option<String>,
    pub name: Option<String>,
    pub weight_min: Option<f64>,
    pub weight_max: Option<f64>,
    pub fixed_fee: Option<f64>,
    pub percentage: Option<bool>,
}

impl PricingPatch {
    pub fn is_empty(&self) -> bool {
        self.operator_id.is_none()
            && self.service_id.is_none()
            && self.name.is_none()
            && self.weight_min.is_none()
            && self.weight_max.is_none()
            && self.fixed_fee.is_none()
            && self.percentage.is_none()
    }
}

#[cfg(test)]
pub(crate) fn sample_pricing() -> Pricing {
    Pricing {
        operator_id: "OP01".into(),
        service_id: "SVC01".into(),
        name: "Standard parcel".into(),
        weight_min: 0.0,
        weight_max: 100.0,
        fixed_fee: 20.0,
        percentage: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_pricing_passes() {
        assert!(sample_pricing().validate().is_ok());
    }

    #[test]
    fn inverted_band_is_invalid_range() {
        let mut p = sample_pricing();
        p.weight_min = 100.0;
        p.weight_max = 100.0;
        assert!(matches!(
            p.validate(),
            Err(DomainError::InvalidRange { min, max }) if min == 100.0 && max == 100.0
        ));
    }

    #[test]
    fn negative_fee_is_rejected() {
        let mut p = sample_pricing();
        p.fixed_fee = -0.01;
        assert!(matches!(p.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn band_is_half_open() {
        let p = sample_pricing();
        assert!(p.covers(0.0));
        assert!(p.covers(99.999));
        assert!(!p.covers(100.0));
        assert!(!p.covers(-1.0));
    }

    #[test]
    fn apply_merges_only_present_fields() {
        let mut p = sample_pricing();
        p.apply(PricingPatch {
            fixed_fee: Some(99.9),
            name: Some("Heavy".into()),
            ..Default::default()
        });
        assert_eq!(p.fixed_fee, 99.9);
        assert_eq!(p.name, "Heavy");
        assert_eq!(p.operator_id, "OP01");
        assert_eq!(p.weight_max, 100.0);
    }

    #[test]
    fn empty_patch_detected() {
        assert!(PricingPatch::default().is_empty());
        assert!(!PricingPatch {
            percentage: Some(true),
            ..Default::default()
        }
        .is_empty());
    }
}
