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
use crate::auth::{guard_ownership, Providers, UsersOnly};
use crate::database::models::{Service, ServiceCreate, ServiceUpdate};
use crate::handlers::ListQuery;
use crate::middleware::{ApiResponse, ApiResult, Guarded};

/// POST /services
pub async fn create(
    State(state): State<AppState>,
    Guarded(provider, _): Guarded<Providers>,
    payload: Result<Json<ServiceCreate>, JsonRejection>,
) -> ApiResult<Service> {
    let Json(payload) = payload?;
    payload.validate()?;

    let service = payload.into_record(provider.id);
    state.stores.services.insert(&service).await?;

    info!("Provider {} published service {}", provider.id, service.id);
    Ok(ApiResponse::created(service))
}

/// GET /services - the catalogue, for users.
pub async fn list(
    State(state): State<AppState>,
    _user: Guarded<UsersOnly>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Vec<Service>> {
    let Query(query) = query?;
    let services = state.stores.services.list(query.page(&state.config)).await?;
    Ok(ApiResponse::success(services))
}

/// GET /services/my/services
pub async fn list_mine(
    State(state): State<AppState>,
    Guarded(provider, _): Guarded<Providers>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Vec<Service>> {
    let Query(query) = query?;
    let services = state
        .stores
        .services
        .list_by_owner(provider.id, query.page(&state.config))
        .await?;
    Ok(ApiResponse::success(services))
}

/// GET /services/:id
pub async fn get(
    State(state): State<AppState>,
    _user: Guarded<UsersOnly>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Service> {
    let Path(id) = id?;
    let service = state.stores.services.fetch_by_id(id).await?;
    Ok(ApiResponse::success(service))
}

/// PUT /services/:id
pub async fn update(
    State(state): State<AppState>,
    Guarded(provider, _): Guarded<Providers>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<ServiceUpdate>, JsonRejection>,
) -> ApiResult<Service> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    payload.validate()?;

    let mut service = state.stores.services.fetch_by_id(id).await?;
    guard_ownership(&provider, &service)?;

    payload.apply(&mut service);
    state.stores.services.save(&service).await?;

    Ok(ApiResponse::success(service))
}

/// DELETE /services/:id
pub async fn delete(
    State(state): State<AppState>,
    Guarded(provider, _): Guarded<Providers>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<()> {
    let Path(id) = id?;
    let service = state.stores.services.fetch_by_id(id).await?;
    guard_ownership(&provider, &service)?;

    state.stores.services.delete(service.id).await?;

    info!("Provider {} removed service {}", provider.id, service.id);
    Ok(ApiResponse::no_content())
}
