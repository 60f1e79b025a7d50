// handlers/public/auth.rs - POST /auth/register, POST /auth/jwt/login, GET /auth/roles

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::app::AppState;
use crate::auth::password::{hash_password_blocking, verify_password_blocking};
use crate::auth::Role;
use crate::database::manager::DatabaseError;
use crate::database::models::user::normalize_email;
use crate::database::models::{User, UserCreate};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

const DUPLICATE_EMAIL: &str = "User with this email already exists";
const BAD_CREDENTIALS: &str = "LOGIN_BAD_CREDENTIALS";

/// POST /auth/register - create an account with the requested role.
///
/// Self-registration as `admin` is only accepted when
/// `security.allow_admin_registration` is on.
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<UserCreate>, JsonRejection>,
) -> ApiResult<User> {
    let Json(payload) = payload?;
    payload.validate()?;

    if payload.role == Role::Admin && !state.config.security.allow_admin_registration {
        warn!("Rejected admin self-registration for {}", payload.normalized_email());
        return Err(ApiError::forbidden("Admin registration is disabled"));
    }

    let email = payload.normalized_email();
    if state.stores.users.find_by_email(&email).await?.is_some() {
        return Err(ApiError::bad_request(DUPLICATE_EMAIL));
    }

    let hashed = hash_password_blocking(payload.password.clone()).await?;
    let user = payload.into_user(hashed);

    match state.stores.users.insert(&user).await {
        Ok(()) => {}
        // lost a race with a concurrent registration of the same address
        Err(DatabaseError::Conflict(_)) => return Err(ApiError::bad_request(DUPLICATE_EMAIL)),
        Err(e) => return Err(e.into()),
    }

    info!("Registered {} as {}", user.email, user.role);
    Ok(ApiResponse::created(user))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// The account email.
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

/// POST /auth/jwt/login - exchange credentials for a bearer token.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<TokenResponse> {
    let Json(payload) = payload?;

    let Some(user) = state.stores.users.find_by_email(&normalize_email(&payload.username)).await? else {
        // same hashing cost as a known account
        let _ = hash_password_blocking(payload.password).await;
        warn!("Login failed: unknown account");
        return Err(ApiError::bad_request(BAD_CREDENTIALS));
    };

    let verified = verify_password_blocking(payload.password, user.hashed_password.clone()).await?;
    if !verified || !user.is_active {
        warn!("Login failed for {}", user.email);
        return Err(ApiError::bad_request(BAD_CREDENTIALS));
    }

    let access_token = state.tokens.issue(&user)?;
    info!("Issued token for {} ({})", user.email, user.role);

    Ok(ApiResponse::success(TokenResponse {
        access_token,
        token_type: "bearer",
        expires_in: state.tokens.lifetime().num_seconds(),
    }))
}

/// GET /auth/roles - the role values accepted at registration.
pub async fn roles() -> ApiResult<Vec<&'static str>> {
    Ok(ApiResponse::success(Role::values()))
}
