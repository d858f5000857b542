//! Rate registry: lifecycle of canonical rates

use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::info;

use crate::domain::{DomainError, DomainResult, NewRate, PricingPatch, Rate};
use crate::infrastructure::database::repositories::{assignment_repository, rate_repository};
use crate::shared::pagination::{ListPage, ListQuery};

use super::propagation;

pub struct RateRegistry {
    db: DatabaseConnection,
}

impl RateRegistry {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, new: NewRate) -> DomainResult<Rate> {
        new.pricing.validate()?;
        rate_repository::insert(&self.db, &new.pricing).await
    }

    pub async fn get(&self, id: i32) -> DomainResult<Rate> {
        rate_repository::find_active(&self.db, id).await
    }

    pub async fn list(&self, query: &ListQuery) -> DomainResult<ListPage<Rate>> {
        rate_repository::list(&self.db, query).await
    }

    /// Merge `patch` into the rate and push the result to every dependent
    /// ratebook entry, atomically.
    pub async fn update(&self, id: i32, patch: PricingPatch) -> DomainResult<Rate> {
        if patch.is_empty() {
            return Err(DomainError::Validation("no fields to update".to_string()));
        }

        let txn = self.db.begin().await?;
        let mut pricing = rate_repository::find_active(&txn, id).await?.pricing;
        pricing.apply(patch);
        pricing.validate()?;

        let rate = rate_repository::save_pricing(&txn, id, &pricing).await?;
        let updated = propagation::fan_out_rate_update(&txn, &rate).await?;
        txn.commit().await?;

        info!("Rate {} updated ({} dependent entries)", id, updated);
        Ok(rate)
    }

    /// Tombstone the rate, its dependent entries and its assignments.
    pub async fn soft_delete(&self, id: i32) -> DomainResult<Rate> {
        let txn = self.db.begin().await?;
        let rate = rate_repository::mark_deleted(&txn, id).await?;
        let removed = propagation::fan_out_rate_delete(&txn, id).await?;
        let unassigned = assignment_repository::deactivate_for_rate(&txn, id).await?;
        txn.commit().await?;

        info!(
            "Rate {} deleted ({} dependent entries, {} assignments)",
            id, removed, unassigned
        );
        Ok(rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pricing::sample_pricing;
    use crate::infrastructure::database::setup_db;

    #[tokio::test]
    async fn create_rejects_inverted_band() {
        let registry = RateRegistry::new(setup_db().await);
        let mut pricing = sample_pricing();
        pricing.weight_min = 10.0;
        pricing.weight_max = 5.0;

        let err = registry.create(NewRate { pricing }).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidRange { .. }));
    }

    #[tokio::test]
    async fn create_rejects_negative_fee() {
        let registry = RateRegistry::new(setup_db().await);
        let pricing = crate::domain::Pricing {
            fixed_fee: -1.0,
            ..sample_pricing()
        };
        assert!(matches!(
            registry.create(NewRate { pricing }).await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn update_validates_merged_values() {
        let registry = RateRegistry::new(setup_db().await);
        let rate = registry
            .create(NewRate {
                pricing: sample_pricing(),
            })
            .await
            .unwrap();

        // weight_min 150 against the stored weight_max 100
        let err = registry
            .update(
                rate.id,
                PricingPatch {
                    weight_min: Some(150.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidRange { min, max } if min == 150.0 && max == 100.0
        ));

        let unchanged = registry.get(rate.id).await.unwrap();
        assert_eq!(unchanged.pricing, sample_pricing());
    }

    #[tokio::test]
    async fn update_unknown_rate_is_not_found() {
        let registry = RateRegistry::new(setup_db().await);
        let err = registry
            .update(
                42,
                PricingPatch {
                    fixed_fee: Some(1.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "Rate", .. }));
    }

    #[tokio::test]
    async fn deleted_rate_cannot_be_updated() {
        let registry = RateRegistry::new(setup_db().await);
        let rate = registry
            .create(NewRate {
                pricing: sample_pricing(),
            })
            .await
            .unwrap();
        registry.soft_delete(rate.id).await.unwrap();

        assert!(matches!(
            registry.get(rate.id).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(
            registry.soft_delete(rate.id).await,
            Err(DomainError::NotFound { .. })
        ));
    }
}
