//! Role-gating extractors.
//!
//! Each extractor reads the [`ValidatedUser`] placed by the auth middleware
//! stack and runs the matching guard before the handler body executes, so a
//! denied caller never reaches the store.

use std::marker::PhantomData;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::validate_user::ValidatedUser;
use crate::auth::{guard_role, require_admin, AllowList, Identity};
use crate::database::models::User;
use crate::error::ApiError;

fn validated_user(parts: &Parts) -> Result<&User, ApiError> {
    parts
        .extensions
        .get::<ValidatedUser>()
        .map(|ValidatedUser(user)| user)
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))
}

/// Any authenticated account, with its full stored record.
pub struct CurrentUser(pub User);

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        validated_user(parts).cloned().map(CurrentUser)
    }
}

/// Admits the caller only if its role is in `L::ROLES`.
///
/// ```ignore
/// async fn create(Guarded(provider, _): Guarded<Providers>) -> ApiResult<Service> { .. }
/// ```
pub struct Guarded<L: AllowList>(pub Identity, pub PhantomData<fn() -> L>);

#[axum::async_trait]
impl<S: Send + Sync, L: AllowList + 'static> FromRequestParts<S> for Guarded<L> {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = validated_user(parts)?.identity();
        let path = parts.uri.path();

        match guard_role(identity, L::ROLES) {
            Ok(identity) => {
                tracing::debug!("{} admitted to {} as {}", identity.id, path, identity.role);
                Ok(Guarded(identity, PhantomData))
            }
            Err(denied) => {
                tracing::warn!("Role {} denied on {}", denied.role, path);
                Err(denied.into())
            }
        }
    }
}

/// Admin-only endpoints.
pub struct AdminUser(pub Identity);

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = validated_user(parts)?.identity();

        require_admin(identity).map(AdminUser).map_err(|denied| {
            tracing::warn!("Role {} denied on admin endpoint {}", denied.role, parts.uri.path());
            denied.into()
        })
    }
}
