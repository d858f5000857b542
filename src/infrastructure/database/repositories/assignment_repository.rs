//! SeaORM persistence for catalog ↔ rate assignments

use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict, SimpleExpr};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, JoinType, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set, SqlErr,
};

use crate::domain::{AssignmentChange, CatalogRateAssignment, DomainError, DomainResult, Rate};
use crate::infrastructure::database::entities::{catalog_rate, rate};

use super::rate_repository;

fn entity_to_domain(m: catalog_rate::Model) -> CatalogRateAssignment {
    CatalogRateAssignment {
        catalog_id: m.catalog_id,
        rate_id: m.rate_id,
        created_at: m.created_at,
        updated_at: m.updated_at,
        deleted_at: m.deleted_at,
    }
}

fn map_upsert_err(err: DbErr, catalog_id: i32, rate_id: i32) -> DomainError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => DomainError::DuplicateAssignment {
            catalog_id,
            rate_id,
        },
        _ => DomainError::Storage(err),
    }
}

/// The assignment row for a pair, active or not
pub async fn find<C: ConnectionTrait>(
    conn: &C,
    catalog_id: i32,
    rate_id: i32,
) -> DomainResult<Option<CatalogRateAssignment>> {
    let model = catalog_rate::Entity::find_by_id((catalog_id, rate_id))
        .one(conn)
        .await?;
    Ok(model.map(entity_to_domain))
}

/// Make the pair's assignment active in a single statement.
///
/// Inserts a new row, or clears the tombstone on the existing one. The
/// returned change is derived from the row read just before the upsert.
pub async fn upsert_active<C: ConnectionTrait>(
    conn: &C,
    catalog_id: i32,
    rate_id: i32,
) -> DomainResult<AssignmentChange> {
    let previous = find(conn, catalog_id, rate_id).await?;
    let change = AssignmentChange::from_previous(previous.as_ref());

    let now = Utc::now();
    let am = catalog_rate::ActiveModel {
        catalog_id: Set(catalog_id),
        rate_id: Set(rate_id),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
    };
    catalog_rate::Entity::insert(am)
        .on_conflict(
            OnConflict::columns([catalog_rate::Column::CatalogId, catalog_rate::Column::RateId])
                .update_columns([catalog_rate::Column::DeletedAt, catalog_rate::Column::UpdatedAt])
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await
        .map_err(|e| map_upsert_err(e, catalog_id, rate_id))?;

    Ok(change)
}

/// Soft-delete the active assignment of a pair.
pub async fn deactivate<C: ConnectionTrait>(
    conn: &C,
    catalog_id: i32,
    rate_id: i32,
) -> DomainResult<()> {
    let now = Utc::now();
    let result = catalog_rate::Entity::update_many()
        .col_expr(catalog_rate::Column::DeletedAt, Expr::value(Some(now)))
        .col_expr(catalog_rate::Column::UpdatedAt, Expr::value(now))
        .filter(catalog_rate::Column::CatalogId.eq(catalog_id))
        .filter(catalog_rate::Column::RateId.eq(rate_id))
        .filter(catalog_rate::Column::DeletedAt.is_null())
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Err(DomainError::NotFound {
            entity: "CatalogRateAssignment",
            field: "catalog_id/rate_id",
            value: format!("{}/{}", catalog_id, rate_id),
        });
    }
    Ok(())
}

/// Soft-delete every active assignment under a catalog
pub async fn deactivate_for_catalog<C: ConnectionTrait>(
    conn: &C,
    catalog_id: i32,
) -> DomainResult<u64> {
    deactivate_where(conn, catalog_rate::Column::CatalogId.eq(catalog_id)).await
}

/// Soft-delete every active assignment of a rate
pub async fn deactivate_for_rate<C: ConnectionTrait>(conn: &C, rate_id: i32) -> DomainResult<u64> {
    deactivate_where(conn, catalog_rate::Column::RateId.eq(rate_id)).await
}

async fn deactivate_where<C: ConnectionTrait>(
    conn: &C,
    scope: SimpleExpr,
) -> DomainResult<u64> {
    let now = Utc::now();
    let result = catalog_rate::Entity::update_many()
        .col_expr(catalog_rate::Column::DeletedAt, Expr::value(Some(now)))
        .col_expr(catalog_rate::Column::UpdatedAt, Expr::value(now))
        .filter(scope)
        .filter(catalog_rate::Column::DeletedAt.is_null())
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

/// Number of active assignment rows for a pair (0 or 1)
pub async fn count_active<C: ConnectionTrait>(
    conn: &C,
    catalog_id: i32,
    rate_id: i32,
) -> DomainResult<u64> {
    Ok(catalog_rate::Entity::find()
        .filter(catalog_rate::Column::CatalogId.eq(catalog_id))
        .filter(catalog_rate::Column::RateId.eq(rate_id))
        .filter(catalog_rate::Column::DeletedAt.is_null())
        .count(conn)
        .await?)
}

/// Active rates with an active assignment to the catalog, by id
pub async fn active_rates<C: ConnectionTrait>(
    conn: &C,
    catalog_id: i32,
) -> DomainResult<Vec<Rate>> {
    let models = rate::Entity::find()
        .join(JoinType::InnerJoin, rate::Relation::CatalogRate.def())
        .filter(catalog_rate::Column::CatalogId.eq(catalog_id))
        .filter(catalog_rate::Column::DeletedAt.is_null())
        .filter(rate::Column::DeletedAt.is_null())
        .order_by_asc(rate::Column::Id)
        .all(conn)
        .await?;
    Ok(models
        .into_iter()
        .map(rate_repository::entity_to_domain)
        .collect())
}
