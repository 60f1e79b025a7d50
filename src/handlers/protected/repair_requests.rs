// handlers/protected/repair_requests.rs - /repair-requests
//
// Users post requests, providers browse them, and only the poster may change
// or withdraw one.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use tracing::info;
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::{guard_ownership, AnyRole, Providers, UsersOnly};
use crate::database::models::{RepairRequest, RepairRequestCreate, RepairRequestUpdate};
use crate::handlers::ListQuery;
use crate::middleware::{ApiResponse, ApiResult, Guarded};

/// POST /repair-requests
pub async fn create(
    State(state): State<AppState>,
    Guarded(caller, _): Guarded<UsersOnly>,
    payload: Result<Json<RepairRequestCreate>, JsonRejection>,
) -> ApiResult<RepairRequest> {
    let Json(payload) = payload?;
    payload.validate()?;

    let request = payload.into_record(caller.id);
    state.stores.repair_requests.insert(&request).await?;

    info!("User {} posted repair request {}", caller.id, request.id);
    Ok(ApiResponse::created(request))
}

/// GET /repair-requests - the open market, for providers.
pub async fn list(
    State(state): State<AppState>,
    _provider: Guarded<Providers>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Vec<RepairRequest>> {
    let Query(query) = query?;
    let requests = state
        .stores
        .repair_requests
        .list(query.page(&state.config))
        .await?;
    Ok(ApiResponse::success(requests))
}

/// GET /repair-requests/my-requests
pub async fn list_mine(
    State(state): State<AppState>,
    Guarded(caller, _): Guarded<UsersOnly>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Vec<RepairRequest>> {
    let Query(query) = query?;
    let requests = state
        .stores
        .repair_requests
        .list_by_owner(caller.id, query.page(&state.config))
        .await?;
    Ok(ApiResponse::success(requests))
}

/// GET /repair-requests/:id
pub async fn get(
    State(state): State<AppState>,
    _caller: Guarded<AnyRole>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<RepairRequest> {
    let Path(id) = id?;
    let request = state.stores.repair_requests.fetch_by_id(id).await?;
    Ok(ApiResponse::success(request))
}

/// PUT /repair-requests/:id
pub async fn update(
    State(state): State<AppState>,
    Guarded(caller, _): Guarded<AnyRole>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<RepairRequestUpdate>, JsonRejection>,
) -> ApiResult<RepairRequest> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    payload.validate()?;

    let mut request = state.stores.repair_requests.fetch_by_id(id).await?;
    guard_ownership(&caller, &request)?;

    payload.apply(&mut request);
    state.stores.repair_requests.save(&request).await?;

    Ok(ApiResponse::success(request))
}

/// DELETE /repair-requests/:id
pub async fn delete(
    State(state): State<AppState>,
    Guarded(caller, _): Guarded<AnyRole>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<()> {
    let Path(id) = id?;
    let request = state.stores.repair_requests.fetch_by_id(id).await?;
    guard_ownership(&caller, &request)?;

    state.stores.repair_requests.delete(request.id).await?;

    info!("User {} withdrew repair request {}", caller.id, request.id);
    Ok(ApiResponse::no_content())
}
