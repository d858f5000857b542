//! Search/sort/window over a SeaORM select.
//!
//! Each listable entity exposes a static table of [`ColumnDescriptor`]s;
//! `order_by` names are resolved against it, and only columns flagged
//! `searchable` take part in the free-text filter.

use sea_orm::sea_query::LikeExpr;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, Order, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select,
};

use crate::domain::{DomainError, DomainResult};
use crate::shared::pagination::{ListPage, ListQuery, SortDirection};

/// Public name of a listable column and how it may be used.
#[derive(Debug, Clone, Copy)]
pub struct ColumnDescriptor<C> {
    pub name: &'static str,
    pub column: C,
    pub searchable: bool,
}

impl<C> ColumnDescriptor<C> {
    pub const fn searchable(name: &'static str, column: C) -> Self {
        Self {
            name,
            column,
            searchable: true,
        }
    }

    pub const fn sortable(name: &'static str, column: C) -> Self {
        Self {
            name,
            column,
            searchable: false,
        }
    }
}

/// Look up an `order_by` name; unknown names are a validation error.
pub fn resolve_column<C: Copy>(columns: &[ColumnDescriptor<C>], name: &str) -> DomainResult<C> {
    columns
        .iter()
        .find(|d| d.name == name)
        .map(|d| d.column)
        .ok_or_else(|| {
            let known: Vec<&str> = columns.iter().map(|d| d.name).collect();
            DomainError::Validation(format!(
                "cannot order by '{}', expected one of: {}",
                name,
                known.join(", ")
            ))
        })
}

const LIKE_ESCAPE: char = '\\';

/// `%term%` with the term's own `%`, `_` and escape characters taken literally
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn search_condition<C: ColumnTrait>(columns: &[ColumnDescriptor<C>], term: &str) -> Condition {
    let pattern = contains_pattern(term);
    columns
        .iter()
        .filter(|d| d.searchable)
        .fold(Condition::any(), |cond, d| {
            cond.add(d.column.like(LikeExpr::new(pattern.clone()).escape(LIKE_ESCAPE)))
        })
}

impl From<SortDirection> for Order {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        }
    }
}

/// Run `base` as a listing.
///
/// `total` counts `base` as given (callers pre-filter tombstones), `filtered`
/// counts after the search term. Rows are ordered by the requested column,
/// then by `tiebreak` so windows are stable.
pub async fn fetch_page<E, C>(
    conn: &C,
    base: Select<E>,
    columns: &[ColumnDescriptor<E::Column>],
    tiebreak: E::Column,
    query: &ListQuery,
) -> DomainResult<ListPage<E::Model>>
where
    E: EntityTrait,
    E::Model: Sync,
    C: ConnectionTrait,
{
    let order_column = query
        .order_by
        .as_deref()
        .map(|name| resolve_column(columns, name))
        .transpose()?;

    let total = base.clone().count(conn).await?;

    let (select, filtered) = match query.search_term() {
        Some(term) => {
            let select = base.filter(search_condition(columns, term));
            let filtered = select.clone().count(conn).await?;
            (select, filtered)
        }
        None => (base, total),
    };

    let mut select = select;
    if let Some(column) = order_column {
        select = select.order_by(column, query.direction.into());
    }
    let rows = select
        .order_by(tiebreak, Order::Asc)
        .offset(query.start)
        .limit(query.page_length())
        .all(conn)
        .await?;

    Ok(ListPage {
        total,
        filtered,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMNS: &[ColumnDescriptor<&str>] = &[
        ColumnDescriptor::sortable("id", "id"),
        ColumnDescriptor::searchable("name", "name"),
    ];

    #[test]
    fn search_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("OP01"), "%OP01%");
        assert_eq!(contains_pattern("10%"), "%10\\%%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
        assert_eq!(contains_pattern("c:\\x"), "%c:\\\\x%");
    }

    #[test]
    fn known_column_resolves() {
        assert_eq!(resolve_column(COLUMNS, "name").unwrap(), "name");
    }

    #[test]
    fn unknown_column_lists_alternatives() {
        let err = resolve_column(COLUMNS, "password").unwrap_err();
        match err {
            DomainError::Validation(msg) => {
                assert!(msg.contains("password"));
                assert!(msg.contains("id, name"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
