// handlers/protected/providers.rs - /providers (public provider listings)

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
use crate::database::models::{ServiceProvider, ServiceProviderCreate, ServiceProviderUpdate};
use crate::handlers::ListQuery;
use crate::middleware::{ApiResponse, ApiResult, Guarded};

pub async fn create(
    State(state): State<AppState>,
    Guarded(provider, _): Guarded<Providers>,
    payload: Result<Json<ServiceProviderCreate>, JsonRejection>,
) -> ApiResult<ServiceProvider> {
    let Json(payload) = payload?;
    payload.validate()?;

    let listing = payload.into_record(provider.id);
    state.stores.providers.insert(&listing).await?;

    info!("Provider {} created listing {}", provider.id, listing.id);
    Ok(ApiResponse::created(listing))
}

pub async fn list(
    State(state): State<AppState>,
    _user: Guarded<UsersOnly>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Vec<ServiceProvider>> {
    let Query(query) = query?;
    let listings = state.stores.providers.list(query.page(&state.config)).await?;
    Ok(ApiResponse::success(listings))
}

pub async fn list_mine(
    State(state): State<AppState>,
    Guarded(provider, _): Guarded<Providers>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Vec<ServiceProvider>> {
    let Query(query) = query?;
    let listings = state
        .stores
        .providers
        .list_by_owner(provider.id, query.page(&state.config))
        .await?;
    Ok(ApiResponse::success(listings))
}

pub async fn get(
    State(state): State<AppState>,
    _caller: Guarded<AnyRole>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<ServiceProvider> {
    let Path(id) = id?;
    let listing = state.stores.providers.fetch_by_id(id).await?;
    Ok(ApiResponse::success(listing))
}

pub async fn update(
    State(state): State<AppState>,
    Guarded(provider, _): Guarded<Providers>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<ServiceProviderUpdate>, JsonRejection>,
) -> ApiResult<ServiceProvider> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    payload.validate()?;

    let mut listing = state.stores.providers.fetch_by_id(id).await?;
    guard_ownership(&provider, &listing)?;

    payload.apply(&mut listing);
    state.stores.providers.save(&listing).await?;

    Ok(ApiResponse::success(listing))
}

pub async fn delete(
    State(state): State<AppState>,
    Guarded(provider, _): Guarded<Providers>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<()> {
    let Path(id) = id?;
    let listing = state.stores.providers.fetch_by_id(id).await?;
    guard_ownership(&provider, &listing)?;

    state.stores.providers.delete(listing.id).await?;

    info!("Provider {} removed listing {}", provider.id, listing.id);
    Ok(ApiResponse::no_content())
}
