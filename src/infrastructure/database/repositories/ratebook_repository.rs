//! SeaORM persistence for ratebook entries
//!
//! Besides plain CRUD this holds the set-based statements the propagation
//! rules are built from. All of them only ever touch rows with
//! `dependent = true` and no tombstone.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QuerySelect, Set,
};

use crate::domain::{
    DomainError, DomainResult, EntryLink, Pricing, RateSource, RatebookEntry, RatebookLookup,
    TariffQuery,
};
use crate::infrastructure::database::entities::ratebook_entry;
use crate::infrastructure::database::listing::{fetch_page, ColumnDescriptor};
use crate::shared::pagination::{ListPage, ListQuery};

pub const COLUMNS: &[ColumnDescriptor<ratebook_entry::Column>] = &[
    ColumnDescriptor::sortable("id", ratebook_entry::Column::Id),
    ColumnDescriptor::searchable("client_id", ratebook_entry::Column::ClientId),
    ColumnDescriptor::searchable("warehouse_id", ratebook_entry::Column::WarehouseId),
    ColumnDescriptor::searchable("operator_id", ratebook_entry::Column::OperatorId),
    ColumnDescriptor::searchable("service_id", ratebook_entry::Column::ServiceId),
    ColumnDescriptor::searchable("name", ratebook_entry::Column::Name),
    ColumnDescriptor::sortable("weight_min", ratebook_entry::Column::WeightMin),
    ColumnDescriptor::sortable("weight_max", ratebook_entry::Column::WeightMax),
    ColumnDescriptor::sortable("fixed_fee", ratebook_entry::Column::FixedFee),
    ColumnDescriptor::sortable("dependent", ratebook_entry::Column::Dependent),
    ColumnDescriptor::sortable("updated_at", ratebook_entry::Column::UpdatedAt),
];

// ── Conversion helpers ──────────────────────────────────────────

fn link_from_columns(dependent: bool, catalog_id: Option<i32>, rate_id: Option<i32>) -> EntryLink {
    let source = catalog_id
        .zip(rate_id)
        .map(|(catalog_id, rate_id)| RateSource {
            catalog_id,
            rate_id,
        });
    match (dependent, source) {
        (true, Some(src)) => EntryLink::Dependent(src),
        (_, origin) => EntryLink::Independent { origin },
    }
}

fn entity_to_domain(m: ratebook_entry::Model) -> RatebookEntry {
    RatebookEntry {
        id: m.id,
        link: link_from_columns(m.dependent, m.catalog_id, m.rate_id),
        client_id: m.client_id,
        warehouse_id: m.warehouse_id,
        pricing: Pricing {
            operator_id: m.operator_id,
            service_id: m.service_id,
            name: m.name,
            weight_min: m.weight_min,
            weight_max: m.weight_max,
            fixed_fee: m.fixed_fee,
            percentage: m.percentage,
        },
        created_at: m.created_at,
        updated_at: m.updated_at,
        deleted_at: m.deleted_at,
    }
}

fn set_pricing(am: &mut ratebook_entry::ActiveModel, p: &Pricing) {
    am.operator_id = Set(p.operator_id.clone());
    am.service_id = Set(p.service_id.clone());
    am.name = Set(p.name.clone());
    am.weight_min = Set(p.weight_min);
    am.weight_max = Set(p.weight_max);
    am.fixed_fee = Set(p.fixed_fee);
    am.percentage = Set(p.percentage);
}

fn set_link(am: &mut ratebook_entry::ActiveModel, link: EntryLink) {
    let (dependent, source) = match link {
        EntryLink::Dependent(src) => (true, Some(src)),
        EntryLink::Independent { origin } => (false, origin),
    };
    am.dependent = Set(dependent);
    am.catalog_id = Set(source.map(|s| s.catalog_id));
    am.rate_id = Set(source.map(|s| s.rate_id));
}

fn active_dependents() -> sea_orm::Select<ratebook_entry::Entity> {
    ratebook_entry::Entity::find()
        .filter(ratebook_entry::Column::Dependent.eq(true))
        .filter(ratebook_entry::Column::DeletedAt.is_null())
}

// ── CRUD ────────────────────────────────────────────────────────

pub async fn insert<C: ConnectionTrait>(
    conn: &C,
    client_id: &str,
    warehouse_id: &str,
    pricing: &Pricing,
    link: EntryLink,
) -> DomainResult<RatebookEntry> {
    let now = Utc::now();
    let mut am = ratebook_entry::ActiveModel {
        client_id: Set(client_id.to_string()),
        warehouse_id: Set(warehouse_id.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
        ..Default::default()
    };
    set_pricing(&mut am, pricing);
    set_link(&mut am, link);
    Ok(entity_to_domain(am.insert(conn).await?))
}

async fn find_active_model<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> DomainResult<ratebook_entry::Model> {
    ratebook_entry::Entity::find_by_id(id)
        .filter(ratebook_entry::Column::DeletedAt.is_null())
        .one(conn)
        .await?
        .ok_or_else(|| DomainError::not_found("RatebookEntry", id))
}

pub async fn find_active<C: ConnectionTrait>(conn: &C, id: i32) -> DomainResult<RatebookEntry> {
    find_active_model(conn, id).await.map(entity_to_domain)
}

/// Persist pricing and link of an already loaded entry
pub async fn save<C: ConnectionTrait>(
    conn: &C,
    entry: &RatebookEntry,
) -> DomainResult<RatebookEntry> {
    let mut am = find_active_model(conn, entry.id).await?.into_active_model();
    set_pricing(&mut am, &entry.pricing);
    set_link(&mut am, entry.link);
    am.updated_at = Set(Utc::now());
    Ok(entity_to_domain(am.update(conn).await?))
}

pub async fn mark_deleted<C: ConnectionTrait>(conn: &C, id: i32) -> DomainResult<RatebookEntry> {
    let now = Utc::now();
    let mut am = find_active_model(conn, id).await?.into_active_model();
    am.deleted_at = Set(Some(now));
    am.updated_at = Set(now);
    Ok(entity_to_domain(am.update(conn).await?))
}

pub async fn list<C: ConnectionTrait>(
    conn: &C,
    query: &ListQuery,
) -> DomainResult<ListPage<RatebookEntry>> {
    let base = ratebook_entry::Entity::find().filter(ratebook_entry::Column::DeletedAt.is_null());
    let page = fetch_page(conn, base, COLUMNS, ratebook_entry::Column::Id, query).await?;
    Ok(page.map(entity_to_domain))
}

// ── Propagation statements ──────────────────────────────────────

/// Distinct (client, warehouse) pairs holding an active dependent entry
/// expanded from the catalog
pub async fn linked_pairs<C: ConnectionTrait>(
    conn: &C,
    catalog_id: i32,
) -> DomainResult<Vec<(String, String)>> {
    let pairs = active_dependents()
        .select_only()
        .column(ratebook_entry::Column::ClientId)
        .column(ratebook_entry::Column::WarehouseId)
        .distinct()
        .filter(ratebook_entry::Column::CatalogId.eq(catalog_id))
        .into_tuple::<(String, String)>()
        .all(conn)
        .await?;
    Ok(pairs)
}

/// Whether the pair already mirrors `source`
pub async fn has_dependent<C: ConnectionTrait>(
    conn: &C,
    source: RateSource,
    client_id: &str,
    warehouse_id: &str,
) -> DomainResult<bool> {
    let count = active_dependents()
        .filter(ratebook_entry::Column::CatalogId.eq(source.catalog_id))
        .filter(ratebook_entry::Column::RateId.eq(source.rate_id))
        .filter(ratebook_entry::Column::ClientId.eq(client_id))
        .filter(ratebook_entry::Column::WarehouseId.eq(warehouse_id))
        .count(conn)
        .await?;
    Ok(count > 0)
}

/// Overwrite the pricing of every active dependent entry mirroring the rate
pub async fn overwrite_dependents_of_rate<C: ConnectionTrait>(
    conn: &C,
    rate_id: i32,
    p: &Pricing,
) -> DomainResult<u64> {
    let result = ratebook_entry::Entity::update_many()
        .col_expr(ratebook_entry::Column::OperatorId, Expr::value(p.operator_id.clone()))
        .col_expr(ratebook_entry::Column::ServiceId, Expr::value(p.service_id.clone()))
        .col_expr(ratebook_entry::Column::Name, Expr::value(p.name.clone()))
        .col_expr(ratebook_entry::Column::WeightMin, Expr::value(p.weight_min))
        .col_expr(ratebook_entry::Column::WeightMax, Expr::value(p.weight_max))
        .col_expr(ratebook_entry::Column::FixedFee, Expr::value(p.fixed_fee))
        .col_expr(ratebook_entry::Column::Percentage, Expr::value(p.percentage))
        .col_expr(ratebook_entry::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(ratebook_entry::Column::RateId.eq(rate_id))
        .filter(ratebook_entry::Column::Dependent.eq(true))
        .filter(ratebook_entry::Column::DeletedAt.is_null())
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

/// Soft-delete active dependent entries mirroring the rate
pub async fn delete_dependents_of_rate<C: ConnectionTrait>(
    conn: &C,
    rate_id: i32,
) -> DomainResult<u64> {
    delete_dependents_where(conn, ratebook_entry::Column::RateId.eq(rate_id)).await
}

/// Soft-delete active dependent entries expanded from the catalog
pub async fn delete_dependents_of_catalog<C: ConnectionTrait>(
    conn: &C,
    catalog_id: i32,
) -> DomainResult<u64> {
    delete_dependents_where(conn, ratebook_entry::Column::CatalogId.eq(catalog_id)).await
}

/// Soft-delete active dependent entries for exactly one catalog/rate pair
pub async fn delete_dependents_of_source<C: ConnectionTrait>(
    conn: &C,
    source: RateSource,
) -> DomainResult<u64> {
    delete_dependents_where(
        conn,
        ratebook_entry::Column::CatalogId
            .eq(source.catalog_id)
            .and(ratebook_entry::Column::RateId.eq(source.rate_id)),
    )
    .await
}

async fn delete_dependents_where<C: ConnectionTrait>(
    conn: &C,
    scope: SimpleExpr,
) -> DomainResult<u64> {
    let now = Utc::now();
    let result = ratebook_entry::Entity::update_many()
        .col_expr(ratebook_entry::Column::DeletedAt, Expr::value(Some(now)))
        .col_expr(ratebook_entry::Column::UpdatedAt, Expr::value(now))
        .filter(scope)
        .filter(ratebook_entry::Column::Dependent.eq(true))
        .filter(ratebook_entry::Column::DeletedAt.is_null())
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

// ── Resolver lookup ─────────────────────────────────────────────

/// Read-only ratebook access for the tariff resolver
pub struct SeaOrmRatebookLookup {
    db: DatabaseConnection,
}

impl SeaOrmRatebookLookup {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RatebookLookup for SeaOrmRatebookLookup {
    async fn find_matching(&self, query: &TariffQuery) -> DomainResult<Vec<RatebookEntry>> {
        let models = ratebook_entry::Entity::find()
            .filter(ratebook_entry::Column::ClientId.eq(query.client_id.as_str()))
            .filter(ratebook_entry::Column::WarehouseId.eq(query.warehouse_id.as_str()))
            .filter(ratebook_entry::Column::OperatorId.eq(query.operator_id.as_str()))
            .filter(ratebook_entry::Column::ServiceId.eq(query.service_id.as_str()))
            .filter(ratebook_entry::Column::WeightMin.lte(query.weight))
            .filter(ratebook_entry::Column::WeightMax.gt(query.weight))
            .filter(ratebook_entry::Column::DeletedAt.is_null())
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(entity_to_domain).collect())
    }

    async fn count_active_for_pair(
        &self,
        client_id: &str,
        warehouse_id: &str,
    ) -> DomainResult<u64> {
        Ok(ratebook_entry::Entity::find()
            .filter(ratebook_entry::Column::ClientId.eq(client_id))
            .filter(ratebook_entry::Column::WarehouseId.eq(warehouse_id))
            .filter(ratebook_entry::Column::DeletedAt.is_null())
            .count(&self.db)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pricing::sample_pricing;
    use crate::infrastructure::database::setup_db;

    const SRC: RateSource = RateSource {
        catalog_id: 1,
        rate_id: 2,
    };

    #[test]
    fn link_columns_map_to_variants() {
        assert_eq!(link_from_columns(true, Some(1), Some(2)), EntryLink::Dependent(SRC));
        assert_eq!(
            link_from_columns(false, Some(1), Some(2)),
            EntryLink::Independent { origin: Some(SRC) }
        );
        assert_eq!(
            link_from_columns(false, None, None),
            EntryLink::Independent { origin: None }
        );
        // A dependent flag without a source cannot propagate anything
        assert_eq!(
            link_from_columns(true, None, Some(2)),
            EntryLink::Independent { origin: None }
        );
    }

    #[tokio::test]
    async fn detached_entry_keeps_origin_columns() {
        let db = setup_db().await;
        let mut entry = insert(&db, "1", "1", &sample_pricing(), EntryLink::Dependent(SRC))
            .await
            .unwrap();
        entry.link = entry.link.detached();
        let saved = save(&db, &entry).await.unwrap();
        assert_eq!(saved.link, EntryLink::Independent { origin: Some(SRC) });

        // No longer reachable by propagation
        assert!(!has_dependent(&db, SRC, "1", "1").await.unwrap());
        assert_eq!(delete_dependents_of_source(&db, SRC).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn lookup_filters_on_band_and_tombstone() {
        let db = setup_db().await;
        let independent = || EntryLink::Independent { origin: None };
        let kept = insert(&db, "1", "1", &sample_pricing(), independent())
            .await
            .unwrap();
        let dropped = insert(&db, "1", "1", &sample_pricing(), independent())
            .await
            .unwrap();
        mark_deleted(&db, dropped.id).await.unwrap();

        let lookup = SeaOrmRatebookLookup::new(db);
        let query = TariffQuery {
            client_id: "1".into(),
            warehouse_id: "1".into(),
            operator_id: "OP01".into(),
            service_id: "SVC01".into(),
            weight: 50.0,
        };
        let found = lookup.find_matching(&query).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, kept.id);

        let edge = TariffQuery {
            weight: 100.0,
            ..query
        };
        assert!(lookup.find_matching(&edge).await.unwrap().is_empty());
        assert_eq!(lookup.count_active_for_pair("1", "1").await.unwrap(), 1);
        assert_eq!(lookup.count_active_for_pair("2", "1").await.unwrap(), 0);
    }
}
