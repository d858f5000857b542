//! Catalog REST API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::{AssignmentResponse, CatalogRequest, CatalogResponse};
use crate::interfaces::http::common::{
    error_response, ApiError, ApiResponse, ApiResult, ListParams, ListResponse, ValidatedJson,
};
use crate::interfaces::http::modules::rates::RateResponse;
use crate::interfaces::http::router::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/catalogs",
    tag = "Catalogs",
    security(("bearer_auth" = [])),
    params(ListParams),
    responses(
        (status = 200, description = "Catalog page", body = ApiResponse<ListResponse<CatalogResponse>>),
        (status = 400, description = "Unknown order_by column")
    )
)]
pub async fn list_catalogs(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<ListResponse<CatalogResponse>> {
    let query = params.into_query().map_err(error_response)?;
    let page = state.catalogs.list(&query).await.map_err(error_response)?;
    Ok(Json(ApiResponse::success(ListResponse::from_page(page))))
}

#[utoipa::path(
    post,
    path = "/api/v1/catalogs",
    tag = "Catalogs",
    security(("bearer_auth" = [])),
    request_body = CatalogRequest,
    responses(
        (status = 201, description = "Created", body = ApiResponse<CatalogResponse>),
        (status = 422, description = "Field validation failed")
    )
)]
pub async fn create_catalog(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CatalogRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CatalogResponse>>), ApiError> {
    let catalog = state
        .catalogs
        .create(&req.name)
        .await
        .map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(catalog.into()))))
}

#[utoipa::path(
    get,
    path = "/api/v1/catalogs/{id}",
    tag = "Catalogs",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Catalog ID")),
    responses(
        (status = 200, description = "Catalog details", body = ApiResponse<CatalogResponse>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_catalog(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<CatalogResponse> {
    let catalog = state.catalogs.get(id).await.map_err(error_response)?;
    Ok(Json(ApiResponse::success(catalog.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/catalogs/{id}",
    tag = "Catalogs",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Catalog ID")),
    request_body = CatalogRequest,
    responses(
        (status = 200, description = "Renamed", body = ApiResponse<CatalogResponse>),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_catalog(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(req): ValidatedJson<CatalogRequest>,
) -> ApiResult<CatalogResponse> {
    let catalog = state
        .catalogs
        .update(id, &req.name)
        .await
        .map_err(error_response)?;
    Ok(Json(ApiResponse::success(catalog.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/catalogs/{id}",
    tag = "Catalogs",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Catalog ID")),
    responses(
        (status = 204, description = "Deleted with its assignments and dependent entries"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_catalog(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    state.catalogs.soft_delete(id).await.map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/catalogs/{id}/rates",
    tag = "Catalogs",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Catalog ID")),
    responses(
        (status = 200, description = "Active assigned rates", body = ApiResponse<Vec<RateResponse>>),
        (status = 404, description = "Catalog not found")
    )
)]
pub async fn list_catalog_rates(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Vec<RateResponse>> {
    let rates = state.catalogs.rates(id).await.map_err(error_response)?;
    Ok(Json(ApiResponse::success(
        rates.into_iter().map(Into::into).collect(),
    )))
}

#[utoipa::path(
    put,
    path = "/api/v1/catalogs/{id}/rates/{rate_id}",
    tag = "Catalogs",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Catalog ID"),
        ("rate_id" = i32, Path, description = "Rate ID")
    ),
    responses(
        (status = 200, description = "Assigned (idempotent)", body = ApiResponse<AssignmentResponse>),
        (status = 404, description = "Catalog or rate not found"),
        (status = 409, description = "Conflicting concurrent assignment")
    )
)]
pub async fn assign_rate(
    State(state): State<AppState>,
    Path((id, rate_id)): Path<(i32, i32)>,
) -> ApiResult<AssignmentResponse> {
    let outcome = state
        .catalogs
        .assign_rate(id, rate_id)
        .await
        .map_err(error_response)?;
    Ok(Json(ApiResponse::success(AssignmentResponse::new(
        id, rate_id, outcome,
    ))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/catalogs/{id}/rates/{rate_id}",
    tag = "Catalogs",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Catalog ID"),
        ("rate_id" = i32, Path, description = "Rate ID")
    ),
    responses(
        (status = 204, description = "Unassigned, dependent entries removed"),
        (status = 404, description = "No active assignment")
    )
)]
pub async fn unassign_rate(
    State(state): State<AppState>,
    Path((id, rate_id)): Path<(i32, i32)>,
) -> Result<StatusCode, ApiError> {
    state
        .catalogs
        .unassign_rate(id, rate_id)
        .await
        .map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}
