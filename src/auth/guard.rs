//! Role and ownership guards.
//!
//! Every guard is a pure function of its inputs. Role gating is exact set
//! membership against an endpoint's allow-list; there is no role hierarchy and
//! `Admin` is only admitted where an allow-list names it. Ownership is single
//! and exclusive: the creator of a record is the only identity that passes
//! [`guard_ownership`].

use serde::Serialize;
use uuid::Uuid;

use super::role::Role;

/// An authenticated principal, resolved from a verified token and the
/// account it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

/// A record with exactly one owning identity.
pub trait Owned {
    /// Human-readable record name used in rejection messages.
    const KIND: &'static str;

    fn owner_id(&self) -> Uuid;
}

/// The caller's role is not in the endpoint's allow-list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Access denied. Required roles: [{}]", role_list(.allowed))]
pub struct AccessDenied {
    pub role: Role,
    pub allowed: Vec<Role>,
}

/// The caller's role is allowed but the caller does not own the record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Not enough permissions to modify this {kind}")]
pub struct Forbidden {
    pub kind: &'static str,
    pub caller_id: Uuid,
    pub owner_id: Uuid,
}

fn role_list(roles: &[Role]) -> String {
    roles.iter().map(Role::as_str).collect::<Vec<_>>().join(", ")
}

/// A fixed allow-list, known at compile time, for one class of endpoint.
pub trait AllowList {
    const ROLES: &'static [Role];
}

/// Plain users looking for repairs.
pub struct UsersOnly;

/// Individual and organization providers.
pub struct Providers;

/// Every role, i.e. any authenticated account.
pub struct AnyRole;

impl AllowList for UsersOnly {
    const ROLES: &'static [Role] = &[Role::User];
}

impl AllowList for Providers {
    const ROLES: &'static [Role] = &[Role::ProviderIndividual, Role::ProviderOrganization];
}

impl AllowList for AnyRole {
    const ROLES: &'static [Role] = &Role::ALL;
}

/// Roles that may skip the owner comparison on admin management endpoints.
pub const ADMIN_OVERRIDE: &[Role] = &[Role::Admin];

/// Admit `identity` iff its role is a member of `allowed`.
///
/// Returns the identity unchanged so guards can be chained.
pub fn guard_role(identity: Identity, allowed: &[Role]) -> Result<Identity, AccessDenied> {
    if allowed.contains(&identity.role) {
        Ok(identity)
    } else {
        Err(AccessDenied {
            role: identity.role,
            allowed: allowed.to_vec(),
        })
    }
}

/// Admin-only gate. Deliberately separate from [`guard_role`].
pub fn require_admin(identity: Identity) -> Result<Identity, AccessDenied> {
    match identity.role {
        Role::Admin => Ok(identity),
        Role::User | Role::ProviderIndividual | Role::ProviderOrganization => Err(AccessDenied {
            role: identity.role,
            allowed: vec![Role::Admin],
        }),
    }
}

/// Succeeds iff `identity` created `resource`.
pub fn guard_ownership<R: Owned>(identity: &Identity, resource: &R) -> Result<(), Forbidden> {
    let owner_id = resource.owner_id();
    if owner_id == identity.id {
        Ok(())
    } else {
        Err(Forbidden {
            kind: R::KIND,
            caller_id: identity.id,
            owner_id,
        })
    }
}

/// Ownership check for a mutation, skipped only when the endpoint explicitly
/// lists the caller's role in `override_roles`.
pub fn guard_mutation<R: Owned>(
    identity: &Identity,
    resource: &R,
    override_roles: &[Role],
) -> Result<(), Forbidden> {
    if override_roles.contains(&identity.role) {
        return Ok(());
    }
    guard_ownership(identity, resource)
}
