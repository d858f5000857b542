//! Catalog registry: catalogs and their rate assignments

use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::info;

use crate::domain::{AssignmentChange, Catalog, DomainError, DomainResult, Rate, RateSource};
use crate::infrastructure::database::repositories::{
    assignment_repository, catalog_repository, rate_repository,
};
use crate::shared::pagination::{ListPage, ListQuery};

use super::propagation;

/// Result of [`CatalogRegistry::assign_rate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentOutcome {
    pub change: AssignmentChange,
    /// Dependent entries created by expansion
    pub expanded: u64,
}

pub struct CatalogRegistry {
    db: DatabaseConnection,
}

fn require_name(name: &str) -> DomainResult<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::Validation("catalog name must not be blank".to_string()));
    }
    Ok(name)
}

impl CatalogRegistry {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, name: &str) -> DomainResult<Catalog> {
        catalog_repository::insert(&self.db, require_name(name)?).await
    }

    pub async fn get(&self, id: i32) -> DomainResult<Catalog> {
        catalog_repository::find_active(&self.db, id).await
    }

    pub async fn list(&self, query: &ListQuery) -> DomainResult<ListPage<Catalog>> {
        catalog_repository::list(&self.db, query).await
    }

    pub async fn update(&self, id: i32, name: &str) -> DomainResult<Catalog> {
        catalog_repository::rename(&self.db, id, require_name(name)?).await
    }

    /// Tombstone the catalog, its assignments and every dependent entry
    /// expanded from it. Independent entries are left alone.
    pub async fn soft_delete(&self, id: i32) -> DomainResult<Catalog> {
        let txn = self.db.begin().await?;
        let catalog = catalog_repository::mark_deleted(&txn, id).await?;
        let unassigned = assignment_repository::deactivate_for_catalog(&txn, id).await?;
        let removed = propagation::cascade_catalog_delete(&txn, id).await?;
        txn.commit().await?;

        info!(
            "Catalog {} deleted ({} assignments, {} dependent entries)",
            id, unassigned, removed
        );
        Ok(catalog)
    }

    /// Activate the assignment and expand the rate to every pair already
    /// linked to the catalog. Safe to repeat.
    pub async fn assign_rate(
        &self,
        catalog_id: i32,
        rate_id: i32,
    ) -> DomainResult<AssignmentOutcome> {
        let txn = self.db.begin().await?;
        catalog_repository::find_active(&txn, catalog_id).await?;
        let rate = rate_repository::find_active(&txn, rate_id).await?;

        let change = assignment_repository::upsert_active(&txn, catalog_id, rate_id).await?;
        let expanded = propagation::expand_on_assign(&txn, catalog_id, &rate).await?;
        txn.commit().await?;

        info!(
            "Rate {} assigned to catalog {}: {} ({} entries expanded)",
            rate_id, catalog_id, change, expanded
        );
        Ok(AssignmentOutcome { change, expanded })
    }

    /// Deactivate the assignment and drop the entries it produced.
    /// Returns how many dependent entries were removed.
    pub async fn unassign_rate(&self, catalog_id: i32, rate_id: i32) -> DomainResult<u64> {
        let txn = self.db.begin().await?;
        catalog_repository::find_active(&txn, catalog_id).await?;
        assignment_repository::deactivate(&txn, catalog_id, rate_id).await?;
        let removed =
            propagation::contract_on_unassign(&txn, RateSource { catalog_id, rate_id }).await?;
        txn.commit().await?;

        info!(
            "Rate {} unassigned from catalog {} ({} entries removed)",
            rate_id, catalog_id, removed
        );
        Ok(removed)
    }

    /// Active rates currently assigned to the catalog
    pub async fn rates(&self, catalog_id: i32) -> DomainResult<Vec<Rate>> {
        catalog_repository::find_active(&self.db, catalog_id).await?;
        assignment_repository::active_rates(&self.db, catalog_id).await
    }
}
