use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::password::hash_password_blocking;
use crate::database::models::{User, UserUpdate};
use crate::middleware::{AdminUser, ApiResponse, ApiResult, CurrentUser};

/// GET /users/me
pub async fn me(CurrentUser(user): CurrentUser) -> ApiResult<User> {
    Ok(ApiResponse::success(user))
}

/// PATCH /users/me - profile fields and password; never the role.
pub async fn update_me(
    State(state): State<AppState>,
    CurrentUser(mut user): CurrentUser,
    payload: Result<Json<UserUpdate>, JsonRejection>,
) -> ApiResult<User> {
    let Json(payload) = payload?;
    payload.validate()?;

    let hashed = match payload.password.clone() {
        Some(password) => Some(hash_password_blocking(password).await?),
        None => None,
    };
    payload.apply(&mut user, hashed);
    state.stores.users.save(&user).await?;

    tracing::info!("User {} updated their profile", user.id);
    Ok(ApiResponse::success(user))
}

/// GET /users/:id
pub async fn get_user(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<User> {
    let Path(id) = id?;
    let user = state.stores.users.fetch_by_id(id).await?;
    Ok(ApiResponse::success(user))
}
