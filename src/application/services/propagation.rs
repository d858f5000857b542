//! Propagation engine
//!
//! Keeps the dependent tier of the ratebook in step with rates and catalog
//! assignments. The reactive rules are free functions over a connection so
//! the registries can run them on the same transaction as the upstream
//! write; the [`PropagationEngine`] itself owns the client-facing entry
//! operations.

use metrics::counter;
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use tracing::{debug, info};

use crate::domain::{
    DomainError, DomainResult, EntryLink, NewRatebookEntry, PricingPatch, Rate, RateSource,
    RatebookEntry,
};
use crate::infrastructure::database::repositories::{
    assignment_repository, catalog_repository, ratebook_repository,
};
use crate::shared::pagination::{ListPage, ListQuery};

fn record(rule: &'static str, rows: u64) {
    if rows > 0 {
        counter!("ratebook_propagated_rows_total", "rule" => rule).increment(rows);
    }
}

fn require_scope(client_id: &str, warehouse_id: &str) -> DomainResult<()> {
    if client_id.trim().is_empty() || warehouse_id.trim().is_empty() {
        return Err(DomainError::Validation(
            "client_id and warehouse_id must not be blank".to_string(),
        ));
    }
    Ok(())
}

// ── Reactive rules ──────────────────────────────────────────────

/// Rule 1: give every pair already expanded from `catalog_id` a dependent
/// copy of the newly assigned rate. Pairs that already hold one are skipped,
/// so running it twice inserts nothing.
pub async fn expand_on_assign<C: ConnectionTrait>(
    conn: &C,
    catalog_id: i32,
    rate: &Rate,
) -> DomainResult<u64> {
    let source = RateSource {
        catalog_id,
        rate_id: rate.id,
    };
    let mut inserted = 0;
    for (client_id, warehouse_id) in ratebook_repository::linked_pairs(conn, catalog_id).await? {
        if ratebook_repository::has_dependent(conn, source, &client_id, &warehouse_id).await? {
            continue;
        }
        ratebook_repository::insert(
            conn,
            &client_id,
            &warehouse_id,
            &rate.pricing,
            EntryLink::Dependent(source),
        )
        .await?;
        inserted += 1;
    }
    debug!(catalog_id, rate_id = rate.id, inserted, "expand-on-assign");
    record("expand", inserted);
    Ok(inserted)
}

/// Rule 2: drop the dependent entries of one catalog/rate pair.
pub async fn contract_on_unassign<C: ConnectionTrait>(
    conn: &C,
    source: RateSource,
) -> DomainResult<u64> {
    let removed = ratebook_repository::delete_dependents_of_source(conn, source).await?;
    debug!(
        catalog_id = source.catalog_id,
        rate_id = source.rate_id,
        removed,
        "contract-on-unassign"
    );
    record("contract", removed);
    Ok(removed)
}

/// Rule 3: copy the rate's pricing onto every dependent entry mirroring it.
pub async fn fan_out_rate_update<C: ConnectionTrait>(conn: &C, rate: &Rate) -> DomainResult<u64> {
    let updated =
        ratebook_repository::overwrite_dependents_of_rate(conn, rate.id, &rate.pricing).await?;
    debug!(rate_id = rate.id, updated, "fan-out-on-rate-update");
    record("rate_update", updated);
    Ok(updated)
}

/// Rule 4: drop every dependent entry mirroring a deleted rate.
pub async fn fan_out_rate_delete<C: ConnectionTrait>(conn: &C, rate_id: i32) -> DomainResult<u64> {
    let removed = ratebook_repository::delete_dependents_of_rate(conn, rate_id).await?;
    debug!(rate_id, removed, "fan-out-on-rate-delete");
    record("rate_delete", removed);
    Ok(removed)
}

/// Drop every dependent entry expanded from a deleted catalog.
pub async fn cascade_catalog_delete<C: ConnectionTrait>(
    conn: &C,
    catalog_id: i32,
) -> DomainResult<u64> {
    let removed = ratebook_repository::delete_dependents_of_catalog(conn, catalog_id).await?;
    debug!(catalog_id, removed, "catalog cascade");
    record("catalog_delete", removed);
    Ok(removed)
}

// ── Client-facing entry operations ──────────────────────────────

pub struct PropagationEngine {
    db: DatabaseConnection,
}

impl PropagationEngine {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Link a client/warehouse pair to a catalog by creating a dependent
    /// entry for each rate currently assigned to it. Returns the entries
    /// created; rates the pair already mirrors are skipped.
    pub async fn subscribe_catalog(
        &self,
        client_id: &str,
        warehouse_id: &str,
        catalog_id: i32,
    ) -> DomainResult<Vec<RatebookEntry>> {
        require_scope(client_id, warehouse_id)?;

        let txn = self.db.begin().await?;
        catalog_repository::find_active(&txn, catalog_id).await?;

        let mut created = Vec::new();
        for rate in assignment_repository::active_rates(&txn, catalog_id).await? {
            let source = RateSource {
                catalog_id,
                rate_id: rate.id,
            };
            if ratebook_repository::has_dependent(&txn, source, client_id, warehouse_id).await? {
                continue;
            }
            let entry = ratebook_repository::insert(
                &txn,
                client_id,
                warehouse_id,
                &rate.pricing,
                EntryLink::Dependent(source),
            )
            .await?;
            created.push(entry);
        }
        txn.commit().await?;

        info!(
            "Pair {}/{} subscribed to catalog {} ({} entries created)",
            client_id,
            warehouse_id,
            catalog_id,
            created.len()
        );
        record("subscribe", created.len() as u64);
        Ok(created)
    }

    /// Create a caller-owned entry; never touched by propagation.
    pub async fn create_entry(&self, new: NewRatebookEntry) -> DomainResult<RatebookEntry> {
        require_scope(&new.client_id, &new.warehouse_id)?;
        new.pricing.validate()?;

        let entry = ratebook_repository::insert(
            &self.db,
            &new.client_id,
            &new.warehouse_id,
            &new.pricing,
            EntryLink::Independent { origin: None },
        )
        .await?;
        info!("Ratebook entry created: {} ({}/{})", entry.id, entry.client_id, entry.warehouse_id);
        Ok(entry)
    }

    /// Rule 5: a direct edit merges the patch and detaches the entry.
    pub async fn edit_entry(&self, id: i32, patch: PricingPatch) -> DomainResult<RatebookEntry> {
        let txn = self.db.begin().await?;
        let mut entry = ratebook_repository::find_active(&txn, id).await?;
        let was_dependent = entry.link.is_dependent();

        entry.edit(patch);
        entry.pricing.validate()?;
        let saved = ratebook_repository::save(&txn, &entry).await?;
        txn.commit().await?;

        if was_dependent {
            info!("Ratebook entry {} detached from propagation", id);
        }
        Ok(saved)
    }

    /// Explicit soft delete, allowed for either kind of entry.
    pub async fn delete_entry(&self, id: i32) -> DomainResult<RatebookEntry> {
        let entry = ratebook_repository::mark_deleted(&self.db, id).await?;
        info!("Ratebook entry deleted: {}", id);
        Ok(entry)
    }

    pub async fn get_entry(&self, id: i32) -> DomainResult<RatebookEntry> {
        ratebook_repository::find_active(&self.db, id).await
    }

    pub async fn list_entries(&self, query: &ListQuery) -> DomainResult<ListPage<RatebookEntry>> {
        ratebook_repository::list(&self.db, query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::{CatalogRegistry, RateRegistry};
    use crate::domain::pricing::sample_pricing;
    use crate::domain::{AssignmentChange, Catalog, NewRate, Pricing};
    use crate::infrastructure::database::setup_db;

    struct Fixture {
        db: DatabaseConnection,
        rates: RateRegistry,
        catalogs: CatalogRegistry,
        engine: PropagationEngine,
    }

    impl Fixture {
        async fn new() -> Self {
            let db = setup_db().await;
            Self {
                rates: RateRegistry::new(db.clone()),
                catalogs: CatalogRegistry::new(db.clone()),
                engine: PropagationEngine::new(db.clone()),
                db,
            }
        }

        async fn rate(&self, name: &str, fee: f64) -> Rate {
            self.rates
                .create(NewRate {
                    pricing: Pricing {
                        name: name.into(),
                        fixed_fee: fee,
                        ..sample_pricing()
                    },
                })
                .await
                .unwrap()
        }

        /// Catalog with `rate` assigned and pair 1/1 subscribed to it
        async fn linked_catalog(&self, rate: &Rate) -> Catalog {
            let catalog = self.catalogs.create("Retail").await.unwrap();
            self.catalogs.assign_rate(catalog.id, rate.id).await.unwrap();
            self.engine
                .subscribe_catalog("1", "1", catalog.id)
                .await
                .unwrap();
            catalog
        }

        async fn active_entries(&self) -> Vec<RatebookEntry> {
            self.engine
                .list_entries(&ListQuery {
                    length: Some(100),
                    ..Default::default()
                })
                .await
                .unwrap()
                .rows
        }

        async fn independent(&self, client: &str, fee: f64) -> RatebookEntry {
            self.engine
                .create_entry(NewRatebookEntry {
                    client_id: client.into(),
                    warehouse_id: "1".into(),
                    pricing: Pricing {
                        fixed_fee: fee,
                        ..sample_pricing()
                    },
                })
                .await
                .unwrap()
        }
    }

    #[tokio::test]
    async fn subscribe_mirrors_assigned_rates_once() {
        let fx = Fixture::new().await;
        let rate = fx.rate("Standard", 20.0).await;
        let catalog = fx.linked_catalog(&rate).await;

        let entries = fx.active_entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].pricing, rate.pricing);
        assert_eq!(
            entries[0].link,
            EntryLink::Dependent(RateSource {
                catalog_id: catalog.id,
                rate_id: rate.id
            })
        );

        let again = fx.engine.subscribe_catalog("1", "1", catalog.id).await.unwrap();
        assert!(again.is_empty());
        assert_eq!(fx.active_entries().await.len(), 1);
    }

    #[tokio::test]
    async fn subscribe_unknown_catalog_is_not_found() {
        let fx = Fixture::new().await;
        assert!(matches!(
            fx.engine.subscribe_catalog("1", "1", 404).await,
            Err(DomainError::NotFound { entity: "Catalog", .. })
        ));
    }

    #[tokio::test]
    async fn assign_expands_to_each_linked_pair() {
        let fx = Fixture::new().await;
        let first = fx.rate("Standard", 20.0).await;
        let catalog = fx.linked_catalog(&first).await;
        fx.engine
            .subscribe_catalog("2", "1", catalog.id)
            .await
            .unwrap();
        // Unrelated independent row for a third pair must not be expanded
        fx.independent("3", 5.0).await;

        let second = fx.rate("Express", 45.0).await;
        let outcome = fx.catalogs.assign_rate(catalog.id, second.id).await.unwrap();
        assert_eq!(outcome.change, AssignmentChange::Created);
        assert_eq!(outcome.expanded, 2);

        let mirrored: Vec<_> = fx
            .active_entries()
            .await
            .into_iter()
            .filter(|e| e.link.source().map(|s| s.rate_id) == Some(second.id))
            .collect();
        assert_eq!(mirrored.len(), 2);
        let mut clients: Vec<_> = mirrored.iter().map(|e| e.client_id.as_str()).collect();
        clients.sort();
        assert_eq!(clients, vec!["1", "2"]);

        // Second assign is a no-op for the ratebook
        let repeat = fx.catalogs.assign_rate(catalog.id, second.id).await.unwrap();
        assert_eq!(repeat.change, AssignmentChange::AlreadyActive);
        assert_eq!(repeat.expanded, 0);
        assert_eq!(fx.active_entries().await.len(), 5);
    }

    #[tokio::test]
    async fn unassign_contracts_only_that_pair() {
        let fx = Fixture::new().await;
        let first = fx.rate("Standard", 20.0).await;
        let second = fx.rate("Express", 45.0).await;
        let catalog = fx.linked_catalog(&first).await;
        fx.catalogs.assign_rate(catalog.id, second.id).await.unwrap();
        assert_eq!(fx.active_entries().await.len(), 2);

        let removed = fx.catalogs.unassign_rate(catalog.id, second.id).await.unwrap();
        assert_eq!(removed, 1);

        let remaining = fx.active_entries().await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].link.source().unwrap().rate_id, first.id);
    }

    #[tokio::test]
    async fn rate_update_reaches_dependents_only() {
        let fx = Fixture::new().await;
        let rate = fx.rate("Standard", 20.0).await;
        fx.linked_catalog(&rate).await;
        let own = fx.independent("1", 20.0).await;

        fx.rates
            .update(
                rate.id,
                PricingPatch {
                    fixed_fee: Some(25.0),
                    name: Some("Standard 2025".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        for entry in fx.active_entries().await {
            if entry.id == own.id {
                assert_eq!(entry.pricing, own.pricing);
            } else {
                assert!(entry.link.is_dependent());
                assert_eq!(entry.pricing.fixed_fee, 25.0);
                assert_eq!(entry.pricing.name, "Standard 2025");
            }
        }
    }

    #[tokio::test]
    async fn edited_entry_is_skipped_by_later_updates() {
        let fx = Fixture::new().await;
        let rate = fx.rate("Standard", 20.0).await;
        fx.linked_catalog(&rate).await;
        let dependent = fx.active_entries().await.remove(0);

        let edited = fx
            .engine
            .edit_entry(
                dependent.id,
                PricingPatch {
                    fixed_fee: Some(15.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(!edited.link.is_dependent());

        fx.rates
            .update(
                rate.id,
                PricingPatch {
                    fixed_fee: Some(99.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(fx.engine.get_entry(dependent.id).await.unwrap().pricing.fixed_fee, 15.0);

        // Nor does deleting the rate remove it
        fx.rates.soft_delete(rate.id).await.unwrap();
        assert!(fx.engine.get_entry(dependent.id).await.is_ok());
    }

    #[tokio::test]
    async fn rate_delete_removes_dependents() {
        let fx = Fixture::new().await;
        let rate = fx.rate("Standard", 20.0).await;
        fx.linked_catalog(&rate).await;
        let own = fx.independent("1", 20.0).await;

        fx.rates.soft_delete(rate.id).await.unwrap();
        let remaining = fx.active_entries().await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, own.id);
    }

    #[tokio::test]
    async fn catalog_delete_cascades_to_dependents_only() {
        let fx = Fixture::new().await;
        let rate = fx.rate("Standard", 20.0).await;
        let catalog = fx.linked_catalog(&rate).await;

        // Detached row sharing the catalog back-reference
        let detached = fx.active_entries().await.remove(0);
        fx.engine
            .edit_entry(detached.id, PricingPatch::default())
            .await
            .unwrap();
        fx.engine
            .subscribe_catalog("2", "1", catalog.id)
            .await
            .unwrap();

        fx.catalogs.soft_delete(catalog.id).await.unwrap();

        let remaining = fx.active_entries().await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, detached.id);
        assert_eq!(
            assignment_repository::count_active(&fx.db, catalog.id, rate.id)
                .await
                .unwrap(),
            0
        );
        assert!(matches!(
            fx.catalogs.get(catalog.id).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn failed_edit_leaves_entry_untouched() {
        let fx = Fixture::new().await;
        let rate = fx.rate("Standard", 20.0).await;
        fx.linked_catalog(&rate).await;
        let dependent = fx.active_entries().await.remove(0);

        let err = fx
            .engine
            .edit_entry(
                dependent.id,
                PricingPatch {
                    weight_max: Some(-5.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidRange { .. }));

        let reloaded = fx.engine.get_entry(dependent.id).await.unwrap();
        assert!(reloaded.link.is_dependent());
        assert_eq!(reloaded.pricing, dependent.pricing);
    }

    /// Make every write to an existing ratebook row fail inside the store.
    async fn block_entry_updates(db: &DatabaseConnection) {
        db.execute_unprepared(
            "CREATE TRIGGER block_entry_updates BEFORE UPDATE ON ratebook_entries \
             BEGIN SELECT RAISE(ABORT, 'ratebook_entries is read-only'); END;",
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn rate_update_rolls_back_when_fan_out_fails() {
        let fx = Fixture::new().await;
        let rate = fx.rate("Standard", 20.0).await;
        fx.linked_catalog(&rate).await;
        block_entry_updates(&fx.db).await;

        let err = fx
            .rates
            .update(
                rate.id,
                PricingPatch {
                    fixed_fee: Some(99.9),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Storage(_)));

        assert_eq!(fx.rates.get(rate.id).await.unwrap().pricing.fixed_fee, 20.0);
        let entries = fx.active_entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].pricing.fixed_fee, 20.0);
    }

    #[tokio::test]
    async fn rate_delete_rolls_back_when_fan_out_fails() {
        let fx = Fixture::new().await;
        let rate = fx.rate("Standard", 20.0).await;
        let catalog = fx.linked_catalog(&rate).await;
        block_entry_updates(&fx.db).await;

        assert!(fx.rates.soft_delete(rate.id).await.is_err());

        assert!(fx.rates.get(rate.id).await.is_ok());
        let assigned = fx.catalogs.rates(catalog.id).await.unwrap();
        assert_eq!(assigned.len(), 1);
        assert_eq!(fx.active_entries().await.len(), 1);
    }

    #[tokio::test]
    async fn catalog_delete_rolls_back_when_cascade_fails() {
        let fx = Fixture::new().await;
        let rate = fx.rate("Standard", 20.0).await;
        let catalog = fx.linked_catalog(&rate).await;
        block_entry_updates(&fx.db).await;

        let err = fx.catalogs.soft_delete(catalog.id).await.unwrap_err();
        assert!(matches!(err, DomainError::Storage(_)));

        let kept = fx.catalogs.get(catalog.id).await.unwrap();
        assert_eq!(kept.name, "Retail");
        let assigned = fx.catalogs.rates(catalog.id).await.unwrap();
        assert_eq!(assigned.len(), 1);
        assert_eq!(assigned[0].id, rate.id);
        assert_eq!(fx.active_entries().await.len(), 1);
    }

    #[tokio::test]
    async fn explicit_delete_works_for_both_kinds() {
        let fx = Fixture::new().await;
        let rate = fx.rate("Standard", 20.0).await;
        fx.linked_catalog(&rate).await;
        let dependent = fx.active_entries().await.remove(0);
        let own = fx.independent("1", 10.0).await;

        fx.engine.delete_entry(dependent.id).await.unwrap();
        fx.engine.delete_entry(own.id).await.unwrap();
        assert!(fx.active_entries().await.is_empty());
        assert!(matches!(
            fx.engine.delete_entry(own.id).await,
            Err(DomainError::NotFound { .. })
        ));
    }
}
