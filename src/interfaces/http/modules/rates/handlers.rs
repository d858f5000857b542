//! Rate REST API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::{CreateRateRequest, RateResponse, UpdateRateRequest};
use crate::domain::NewRate;
use crate::interfaces::http::common::{
    error_response, ApiError, ApiResponse, ApiResult, ListParams, ListResponse, ValidatedJson,
};
use crate::interfaces::http::router::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/rates",
    tag = "Rates",
    security(("bearer_auth" = [])),
    params(ListParams),
    responses(
        (status = 200, description = "Rate page", body = ApiResponse<ListResponse<RateResponse>>),
        (status = 400, description = "Unknown order_by column")
    )
)]
pub async fn list_rates(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<ListResponse<RateResponse>> {
    let query = params.into_query().map_err(error_response)?;
    let page = state.rates.list(&query).await.map_err(error_response)?;
    Ok(Json(ApiResponse::success(ListResponse::from_page(page))))
}

#[utoipa::path(
    post,
    path = "/api/v1/rates",
    tag = "Rates",
    security(("bearer_auth" = [])),
    request_body = CreateRateRequest,
    responses(
        (status = 201, description = "Created", body = ApiResponse<RateResponse>),
        (status = 400, description = "Invalid weight band or fee"),
        (status = 422, description = "Field validation failed")
    )
)]
pub async fn create_rate(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateRateRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RateResponse>>), ApiError> {
    let rate = state
        .rates
        .create(NewRate {
            pricing: req.into(),
        })
        .await
        .map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(rate.into()))))
}

#[utoipa::path(
    get,
    path = "/api/v1/rates/{id}",
    tag = "Rates",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Rate ID")),
    responses(
        (status = 200, description = "Rate details", body = ApiResponse<RateResponse>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_rate(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<RateResponse> {
    let rate = state.rates.get(id).await.map_err(error_response)?;
    Ok(Json(ApiResponse::success(rate.into())))
}

/// Updating a rate rewrites every dependent ratebook entry in the same
/// transaction.
#[utoipa::path(
    put,
    path = "/api/v1/rates/{id}",
    tag = "Rates",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Rate ID")),
    request_body = UpdateRateRequest,
    responses(
        (status = 200, description = "Updated", body = ApiResponse<RateResponse>),
        (status = 400, description = "Invalid weight band or fee"),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_rate(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(req): ValidatedJson<UpdateRateRequest>,
) -> ApiResult<RateResponse> {
    let rate = state
        .rates
        .update(id, req.into())
        .await
        .map_err(error_response)?;
    Ok(Json(ApiResponse::success(rate.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/rates/{id}",
    tag = "Rates",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Rate ID")),
    responses(
        (status = 204, description = "Deleted, dependent entries and assignments removed"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_rate(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    state.rates.soft_delete(id).await.map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}
