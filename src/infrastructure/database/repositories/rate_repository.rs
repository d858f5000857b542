//! SeaORM persistence for rates
//!
//! Functions take any [`ConnectionTrait`] so registry operations can run
//! them on the transaction that also carries the propagation writes.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter, Set,
};
use tracing::info;

use crate::domain::{DomainError, DomainResult, Pricing, Rate};
use crate::infrastructure::database::entities::rate;
use crate::infrastructure::database::listing::{fetch_page, ColumnDescriptor};
use crate::shared::pagination::{ListPage, ListQuery};

/// Listable rate columns
pub const COLUMNS: &[ColumnDescriptor<rate::Column>] = &[
    ColumnDescriptor::sortable("id", rate::Column::Id),
    ColumnDescriptor::searchable("operator_id", rate::Column::OperatorId),
    ColumnDescriptor::searchable("service_id", rate::Column::ServiceId),
    ColumnDescriptor::searchable("name", rate::Column::Name),
    ColumnDescriptor::sortable("weight_min", rate::Column::WeightMin),
    ColumnDescriptor::sortable("weight_max", rate::Column::WeightMax),
    ColumnDescriptor::sortable("fixed_fee", rate::Column::FixedFee),
    ColumnDescriptor::sortable("created_at", rate::Column::CreatedAt),
    ColumnDescriptor::sortable("updated_at", rate::Column::UpdatedAt),
];

pub(crate) fn entity_to_domain(m: rate::Model) -> Rate {
    Rate {
        id: m.id,
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

fn set_pricing(am: &mut rate::ActiveModel, p: &Pricing) {
    am.operator_id = Set(p.operator_id.clone());
    am.service_id = Set(p.service_id.clone());
    am.name = Set(p.name.clone());
    am.weight_min = Set(p.weight_min);
    am.weight_max = Set(p.weight_max);
    am.fixed_fee = Set(p.fixed_fee);
    am.percentage = Set(p.percentage);
}

pub async fn insert<C: ConnectionTrait>(conn: &C, pricing: &Pricing) -> DomainResult<Rate> {
    let now = Utc::now();
    let mut am = rate::ActiveModel {
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
        ..Default::default()
    };
    set_pricing(&mut am, pricing);
    let model = am.insert(conn).await?;
    info!("Rate saved: {} ({})", model.name, model.id);
    Ok(entity_to_domain(model))
}

async fn find_active_model<C: ConnectionTrait>(conn: &C, id: i32) -> DomainResult<rate::Model> {
    rate::Entity::find_by_id(id)
        .filter(rate::Column::DeletedAt.is_null())
        .one(conn)
        .await?
        .ok_or_else(|| DomainError::not_found("Rate", id))
}

/// Non-deleted rate by id
pub async fn find_active<C: ConnectionTrait>(conn: &C, id: i32) -> DomainResult<Rate> {
    find_active_model(conn, id).await.map(entity_to_domain)
}

/// Overwrite the pricing of an active rate
pub async fn save_pricing<C: ConnectionTrait>(
    conn: &C,
    id: i32,
    pricing: &Pricing,
) -> DomainResult<Rate> {
    let mut am = find_active_model(conn, id).await?.into_active_model();
    set_pricing(&mut am, pricing);
    am.updated_at = Set(Utc::now());
    Ok(entity_to_domain(am.update(conn).await?))
}

/// Set the tombstone on an active rate
pub async fn mark_deleted<C: ConnectionTrait>(conn: &C, id: i32) -> DomainResult<Rate> {
    let now = Utc::now();
    let mut am = find_active_model(conn, id).await?.into_active_model();
    am.deleted_at = Set(Some(now));
    am.updated_at = Set(now);
    Ok(entity_to_domain(am.update(conn).await?))
}

/// Active rates, searched/sorted/windowed
pub async fn list<C: ConnectionTrait>(conn: &C, query: &ListQuery) -> DomainResult<ListPage<Rate>> {
    let base = rate::Entity::find().filter(rate::Column::DeletedAt.is_null());
    let page = fetch_page(conn, base, COLUMNS, rate::Column::Id, query).await?;
    Ok(page.map(entity_to_domain))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pricing::sample_pricing;
    use crate::infrastructure::database::setup_db;
    use crate::shared::pagination::SortDirection;

    fn pricing(operator: &str, name: &str, fee: f64) -> Pricing {
        Pricing {
            operator_id: operator.into(),
            name: name.into(),
            fixed_fee: fee,
            ..sample_pricing()
        }
    }

    #[tokio::test]
    async fn insert_and_find_roundtrip() {
        let db = setup_db().await;
        let created = insert(&db, &sample_pricing()).await.unwrap();
        let found = find_active(&db, created.id).await.unwrap();
        assert_eq!(found.pricing, sample_pricing());
        assert!(found.is_active());
    }

    #[tokio::test]
    async fn deleted_rate_is_not_found() {
        let db = setup_db().await;
        let created = insert(&db, &sample_pricing()).await.unwrap();
        let deleted = mark_deleted(&db, created.id).await.unwrap();
        assert!(deleted.deleted_at.is_some());

        assert!(matches!(
            find_active(&db, created.id).await,
            Err(DomainError::NotFound { entity: "Rate", .. })
        ));
        assert!(matches!(
            mark_deleted(&db, created.id).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn list_searches_sorts_and_windows() {
        let db = setup_db().await;
        insert(&db, &pricing("OP01", "Small", 10.0)).await.unwrap();
        insert(&db, &pricing("OP02", "Medium", 30.0)).await.unwrap();
        insert(&db, &pricing("OP01", "Large", 20.0)).await.unwrap();
        let gone = insert(&db, &pricing("OP01", "Retired", 5.0)).await.unwrap();
        mark_deleted(&db, gone.id).await.unwrap();

        let page = list(
            &db,
            &ListQuery {
                search: Some("OP01".into()),
                order_by: Some("fixed_fee".into()),
                direction: SortDirection::Desc,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.filtered, 2);
        let names: Vec<_> = page.rows.iter().map(|r| r.pricing.name.as_str()).collect();
        assert_eq!(names, vec!["Large", "Small"]);

        let window = list(
            &db,
            &ListQuery {
                order_by: Some("fixed_fee".into()),
                start: 1,
                length: Some(1),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(window.filtered, 3);
        assert_eq!(window.rows.len(), 1);
        assert_eq!(window.rows[0].pricing.name, "Large");
    }

    #[tokio::test]
    async fn search_treats_wildcards_literally() {
        let db = setup_db().await;
        insert(&db, &pricing("OP01", "10% off", 10.0)).await.unwrap();
        insert(&db, &pricing("OP01", "Standard", 20.0)).await.unwrap();

        let search = |term: &str| ListQuery {
            search: Some(term.into()),
            ..Default::default()
        };

        let percent = list(&db, &search("%")).await.unwrap();
        assert_eq!(percent.filtered, 1);
        assert_eq!(percent.rows[0].pricing.name, "10% off");

        let underscore = list(&db, &search("_")).await.unwrap();
        assert_eq!(underscore.total, 2);
        assert_eq!(underscore.filtered, 0);
        assert!(underscore.rows.is_empty());
    }

    #[tokio::test]
    async fn list_rejects_unknown_order_column() {
        let db = setup_db().await;
        let result = list(
            &db,
            &ListQuery {
                order_by: Some("deleted_at".into()),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }
}
