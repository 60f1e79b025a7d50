use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::auth::AuthUser;
use crate::app::AppState;
use crate::database::manager::DatabaseError;
use crate::database::models::User;
use crate::error::ApiError;

/// The account named by a verified token, loaded fresh for this request.
#[derive(Clone, Debug)]
pub struct ValidatedUser(pub User);

/// Middleware that validates the user from JWT claims against the users table.
/// The account must still exist, be active, and hold the role the token was
/// issued for; a role changed by an admin invalidates older tokens.
pub async fn validate_user_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("JWT authentication required before user validation"))?;

    let user = match state.stores.users.fetch_by_id(auth_user.user_id).await {
        Ok(user) => user,
        Err(DatabaseError::NotFound(_)) => {
            tracing::warn!("Token names unknown user {}", auth_user.user_id);
            return Err(ApiError::unauthorized("User not found"));
        }
        Err(e) => return Err(e.into()),
    };

    if !user.is_active {
        tracing::warn!("Inactive user {} presented a token", user.id);
        return Err(ApiError::unauthorized("Inactive user"));
    }

    if user.role != auth_user.role {
        tracing::warn!(
            "Token role '{}' no longer matches stored role '{}' for user {}",
            auth_user.role,
            user.role,
            user.id
        );
        return Err(ApiError::unauthorized("Role has changed, please log in again"));
    }

    tracing::debug!("User validation successful: {} ({})", user.email, user.role);

    request.extensions_mut().insert(ValidatedUser(user));

    Ok(next.run(request).await)
}
