// handlers/elevated/admin.rs - /admin/* marketplace management
//
// Every handler takes `AdminUser`; record deletions pass ADMIN_OVERRIDE to
// guard_mutation.

use std::collections::BTreeMap;

use axum::extract::{
    rejection::{PathRejection, QueryRejection},
    Path, Query, State,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::{guard_mutation, Role, ADMIN_OVERRIDE};
use crate::database::models::{RepairRequest, Service, User};
use crate::database::repository::Page;
use crate::error::ApiError;
use crate::handlers::ListQuery;
use crate::middleware::{AdminUser, ApiResponse, ApiResult};

const RECENT_ACTIVITY_DAYS: i64 = 30;
const RECENT_REQUESTS: i64 = 10;

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub totals: Totals,
    pub recent_activity: RecentActivity,
    pub distributions: Distributions,
    pub recent_requests: Vec<RecentRequest>,
}

#[derive(Debug, Serialize)]
pub struct Totals {
    pub users: i64,
    pub providers: i64,
    pub repair_requests: i64,
    pub services: i64,
}

#[derive(Debug, Serialize)]
pub struct RecentActivity {
    pub days: i64,
    pub repair_requests: i64,
}

#[derive(Debug, Serialize)]
pub struct Distributions {
    pub user_roles: BTreeMap<Role, i64>,
    pub service_types: BTreeMap<String, i64>,
}

#[derive(Debug, Serialize)]
pub struct RecentRequest {
    pub id: Uuid,
    pub title: String,
    pub user_name: String,
    pub created_at: DateTime<Utc>,
    pub has_voice: bool,
}

/// GET /admin/analytics/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> ApiResult<Dashboard> {
    let stores = &state.stores;

    let user_roles: BTreeMap<Role, i64> = stores.users.count_by_role().await?.into_iter().collect();
    let totals = Totals {
        users: user_roles.get(&Role::User).copied().unwrap_or(0),
        providers: user_roles
            .iter()
            .filter(|(role, _)| role.is_provider())
            .map(|(_, count)| count)
            .sum(),
        repair_requests: stores.repair_requests.count().await?,
        services: stores.services.count().await?,
    };

    let since = Utc::now() - Duration::days(RECENT_ACTIVITY_DAYS);
    let recent_activity = RecentActivity {
        days: RECENT_ACTIVITY_DAYS,
        repair_requests: stores.repair_requests.count_since(since).await?,
    };

    let mut recent_requests = Vec::new();
    for request in stores.repair_requests.list(Page::first(RECENT_REQUESTS)).await? {
        let user_name = match stores.users.fetch_by_id(request.user_id).await {
            Ok(user) => user.display_name(),
            Err(e) => {
                warn!("Repair request {} has no readable owner: {}", request.id, e);
                "Unknown".to_string()
            }
        };
        recent_requests.push(RecentRequest {
            id: request.id,
            has_voice: request.voice_file.is_some(),
            title: request.title,
            user_name,
            created_at: request.created_at,
        });
    }

    let distributions = Distributions {
        service_types: stores.services.count_by_service_type().await?.into_iter().collect(),
        user_roles,
    };

    Ok(ApiResponse::success(Dashboard {
        totals,
        recent_activity,
        distributions,
        recent_requests,
    }))
}

/// GET /admin/users
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Vec<User>> {
    let Query(query) = query?;
    let users = state.stores.users.list(query.page(&state.config)).await?;
    Ok(ApiResponse::success(users))
}

#[derive(Debug, Deserialize)]
pub struct RoleQuery {
    pub new_role: String,
}

/// PUT /admin/users/:id/role?new_role=
///
/// Tokens issued under the old role stop working at the next request.
pub async fn update_user_role(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    id: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<RoleQuery>, QueryRejection>,
) -> ApiResult<User> {
    let Path(id) = id?;
    let Query(query) = query?;
    let new_role: Role = query.new_role.parse()?;

    let mut user = state.stores.users.fetch_by_id(id).await?;
    let old_role = user.role;
    user.role = new_role;
    state.stores.users.save(&user).await?;

    info!("Admin {} changed role of {} from {} to {}", admin.id, user.id, old_role, new_role);
    Ok(ApiResponse::success(user))
}

/// DELETE /admin/users/:id - removes the account and everything it owns.
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<()> {
    let Path(id) = id?;
    if id == admin.id {
        return Err(ApiError::bad_request("Cannot delete your own account"));
    }

    let removed = state.stores.delete_user(id).await?;

    info!(
        "Admin {} deleted user {} ({} requests, {} services, {} listings)",
        admin.id, id, removed.repair_requests, removed.services, removed.listings
    );
    Ok(ApiResponse::no_content())
}

/// GET /admin/repair-requests
pub async fn list_repair_requests(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
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

/// DELETE /admin/repair-requests/:id
pub async fn delete_repair_request(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<()> {
    let Path(id) = id?;
    let request = state.stores.repair_requests.fetch_by_id(id).await?;
    guard_mutation(&admin, &request, ADMIN_OVERRIDE)?;

    state.stores.repair_requests.delete(request.id).await?;

    info!("Admin {} deleted repair request {}", admin.id, request.id);
    Ok(ApiResponse::no_content())
}

/// GET /admin/services
pub async fn list_services(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Vec<Service>> {
    let Query(query) = query?;
    let services = state.stores.services.list(query.page(&state.config)).await?;
    Ok(ApiResponse::success(services))
}

/// DELETE /admin/services/:id
pub async fn delete_service(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<()> {
    let Path(id) = id?;
    let service = state.stores.services.fetch_by_id(id).await?;
    guard_mutation(&admin, &service, ADMIN_OVERRIDE)?;

    state.stores.services.delete(service.id).await?;

    info!("Admin {} deleted service {}", admin.id, service.id);
    Ok(ApiResponse::no_content())
}
