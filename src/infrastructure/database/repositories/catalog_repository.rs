//! SeaORM persistence for catalogs

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter, Set,
};
use tracing::info;

use crate::domain::{Catalog, DomainError, DomainResult};
use crate::infrastructure::database::entities::catalog;
use crate::infrastructure::database::listing::{fetch_page, ColumnDescriptor};
use crate::shared::pagination::{ListPage, ListQuery};

pub const COLUMNS: &[ColumnDescriptor<catalog::Column>] = &[
    ColumnDescriptor::sortable("id", catalog::Column::Id),
    ColumnDescriptor::searchable("name", catalog::Column::Name),
    ColumnDescriptor::sortable("created_at", catalog::Column::CreatedAt),
    ColumnDescriptor::sortable("updated_at", catalog::Column::UpdatedAt),
];

fn entity_to_domain(m: catalog::Model) -> Catalog {
    Catalog {
        id: m.id,
        name: m.name,
        created_at: m.created_at,
        updated_at: m.updated_at,
        deleted_at: m.deleted_at,
    }
}

pub async fn insert<C: ConnectionTrait>(conn: &C, name: &str) -> DomainResult<Catalog> {
    let now = Utc::now();
    let model = catalog::ActiveModel {
        name: Set(name.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    info!("Catalog saved: {} ({})", model.name, model.id);
    Ok(entity_to_domain(model))
}

async fn find_active_model<C: ConnectionTrait>(conn: &C, id: i32) -> DomainResult<catalog::Model> {
    catalog::Entity::find_by_id(id)
        .filter(catalog::Column::DeletedAt.is_null())
        .one(conn)
        .await?
        .ok_or_else(|| DomainError::not_found("Catalog", id))
}

pub async fn find_active<C: ConnectionTrait>(conn: &C, id: i32) -> DomainResult<Catalog> {
    find_active_model(conn, id).await.map(entity_to_domain)
}

pub async fn rename<C: ConnectionTrait>(conn: &C, id: i32, name: &str) -> DomainResult<Catalog> {
    let mut am = find_active_model(conn, id).await?.into_active_model();
    am.name = Set(name.to_string());
    am.updated_at = Set(Utc::now());
    Ok(entity_to_domain(am.update(conn).await?))
}

pub async fn mark_deleted<C: ConnectionTrait>(conn: &C, id: i32) -> DomainResult<Catalog> {
    let now = Utc::now();
    let mut am = find_active_model(conn, id).await?.into_active_model();
    am.deleted_at = Set(Some(now));
    am.updated_at = Set(now);
    Ok(entity_to_domain(am.update(conn).await?))
}

pub async fn list<C: ConnectionTrait>(
    conn: &C,
    query: &ListQuery,
) -> DomainResult<ListPage<Catalog>> {
    let base = catalog::Entity::find().filter(catalog::Column::DeletedAt.is_null());
    let page = fetch_page(conn, base, COLUMNS, catalog::Column::Id, query).await?;
    Ok(page.map(entity_to_domain))
}
