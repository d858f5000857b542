//! Ratebook REST API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::{CreateEntryRequest, EntryResponse, MatchParams, SubscribeRequest, TariffResponse};
use crate::interfaces::http::common::{
    error_response, ApiError, ApiResponse, ApiResult, ListParams, ListResponse, ValidatedJson,
};
use crate::interfaces::http::modules::rates::PricingPatchDto;
use crate::interfaces::http::router::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/ratebook",
    tag = "Ratebook",
    security(("bearer_auth" = [])),
    params(ListParams),
    responses(
        (status = 200, description = "Entry page", body = ApiResponse<ListResponse<EntryResponse>>),
        (status = 400, description = "Unknown order_by column")
    )
)]
pub async fn list_entries(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<ListResponse<EntryResponse>> {
    let query = params.into_query().map_err(error_response)?;
    let page = state.ratebook.list_entries(&query).await.map_err(error_response)?;
    Ok(Json(ApiResponse::success(ListResponse::from_page(page))))
}

#[utoipa::path(
    post,
    path = "/api/v1/ratebook",
    tag = "Ratebook",
    security(("bearer_auth" = [])),
    request_body = CreateEntryRequest,
    responses(
        (status = 201, description = "Independent entry created", body = ApiResponse<EntryResponse>),
        (status = 400, description = "Invalid weight band or fee"),
        (status = 422, description = "Field validation failed")
    )
)]
pub async fn create_entry(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateEntryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<EntryResponse>>), ApiError> {
    let entry = state
        .ratebook
        .create_entry(req.into())
        .await
        .map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(entry.into()))))
}

#[utoipa::path(
    post,
    path = "/api/v1/ratebook/subscriptions",
    tag = "Ratebook",
    security(("bearer_auth" = [])),
    request_body = SubscribeRequest,
    responses(
        (status = 201, description = "Dependent entries created", body = ApiResponse<Vec<EntryResponse>>),
        (status = 404, description = "Catalog not found")
    )
)]
pub async fn subscribe(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<SubscribeRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<EntryResponse>>>), ApiError> {
    let created = state
        .ratebook
        .subscribe_catalog(&req.client_id, &req.warehouse_id, req.catalog_id)
        .await
        .map_err(error_response)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            created.into_iter().map(Into::into).collect(),
        )),
    ))
}

/// Resolve the tariff for a shipment. Never fails for lack of
/// configuration: the default tariff (id 0) is returned instead.
#[utoipa::path(
    get,
    path = "/api/v1/ratebook/match",
    tag = "Ratebook",
    security(("bearer_auth" = [])),
    params(MatchParams),
    responses(
        (status = 200, description = "Resolved tariff", body = ApiResponse<TariffResponse>),
        (status = 400, description = "Invalid weight")
    )
)]
pub async fn match_tariff(
    State(state): State<AppState>,
    Query(params): Query<MatchParams>,
) -> ApiResult<TariffResponse> {
    let resolution = state
        .resolver
        .resolve(params.into())
        .await
        .map_err(error_response)?;
    Ok(Json(ApiResponse::success(resolution.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/ratebook/{id}",
    tag = "Ratebook",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Entry ID")),
    responses(
        (status = 200, description = "Entry details", body = ApiResponse<EntryResponse>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_entry(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<EntryResponse> {
    let entry = state.ratebook.get_entry(id).await.map_err(error_response)?;
    Ok(Json(ApiResponse::success(entry.into())))
}

/// Editing an entry detaches it from propagation for good.
#[utoipa::path(
    put,
    path = "/api/v1/ratebook/{id}",
    tag = "Ratebook",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Entry ID")),
    request_body = PricingPatchDto,
    responses(
        (status = 200, description = "Updated and detached", body = ApiResponse<EntryResponse>),
        (status = 400, description = "Invalid weight band or fee"),
        (status = 404, description = "Not found")
    )
)]
pub async fn edit_entry(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(req): ValidatedJson<PricingPatchDto>,
) -> ApiResult<EntryResponse> {
    let entry = state
        .ratebook
        .edit_entry(id, req.into())
        .await
        .map_err(error_response)?;
    Ok(Json(ApiResponse::success(entry.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/ratebook/{id}",
    tag = "Ratebook",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Entry ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_entry(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    state.ratebook.delete_entry(id).await.map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}
