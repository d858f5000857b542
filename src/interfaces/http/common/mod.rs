//! Shared HTTP plumbing: response envelope, listing parameters and the
//! mapping from domain errors to status codes.

pub mod validated_json;

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use crate::domain::DomainError;
use crate::shared::pagination::{ListPage, ListQuery, SortDirection};

pub use validated_json::ValidatedJson;

/// Standard API response envelope
///
/// Success: `{"success": true, "data": {...}}`,
/// failure: `{"success": false, "data": null, "error": "..."}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Error half of every handler result
pub type ApiError = (StatusCode, Json<ApiResponse<()>>);

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

pub fn status_for(err: &DomainError) -> StatusCode {
    match err {
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::InvalidRange { .. } | DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::DuplicateAssignment { .. } => StatusCode::CONFLICT,
        DomainError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Translate a domain error into the JSON envelope.
///
/// Storage failures are logged here and reported without driver details.
pub fn error_response(err: DomainError) -> ApiError {
    let status = status_for(&err);
    let message = match &err {
        DomainError::Storage(e) => {
            error!("Storage failure: {}", e);
            "Internal storage error".to_string()
        }
        other => other.to_string(),
    };
    (status, Json(ApiResponse::error(message)))
}

/// Search/sort/window query string accepted by every listing endpoint
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Free-text filter over the searchable columns
    pub search: Option<String>,
    /// Column to sort by
    pub order_by: Option<String>,
    /// `asc` (default) or `desc`
    pub direction: Option<String>,
    /// Offset of the first row. Default: 0
    pub start: Option<u64>,
    /// Page size (1–100). Default: 20
    pub length: Option<u64>,
}

impl ListParams {
    pub fn into_query(self) -> Result<ListQuery, DomainError> {
        let direction = match self.direction.as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("asc") => SortDirection::Asc,
            Some("desc") => SortDirection::Desc,
            Some(other) => {
                return Err(DomainError::Validation(format!(
                    "direction must be 'asc' or 'desc', got '{}'",
                    other
                )))
            }
        };
        Ok(ListQuery {
            search: self.search,
            order_by: self.order_by,
            direction,
            start: self.start.unwrap_or(0),
            length: self.length,
        })
    }
}

/// One page of a listing
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListResponse<T> {
    /// Rows before the search filter
    pub records_total: u64,
    /// Rows after the search filter
    pub records_filtered: u64,
    pub data: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn from_page<D>(page: ListPage<D>) -> Self
    where
        T: From<D>,
    {
        let page = page.map(T::from);
        Self {
            records_total: page.total,
            records_filtered: page.filtered,
            data: page.rows,
        }
    }
}
