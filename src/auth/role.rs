use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of roles a registered account can hold.
///
/// Stored as the Postgres enum `user_role` and serialized with the same
/// snake_case names in JWT claims and JSON bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    ProviderIndividual,
    ProviderOrganization,
    Admin,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::User,
        Role::ProviderIndividual,
        Role::ProviderOrganization,
        Role::Admin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::ProviderIndividual => "provider_individual",
            Role::ProviderOrganization => "provider_organization",
            Role::Admin => "admin",
        }
    }

    pub fn is_provider(&self) -> bool {
        match self {
            Role::ProviderIndividual | Role::ProviderOrganization => true,
            Role::User | Role::Admin => false,
        }
    }

    /// Role values in declaration order, as accepted on the wire.
    pub fn values() -> Vec<&'static str> {
        Self::ALL.iter().map(Role::as_str).collect()
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid role. Must be one of: {}", Role::values().join(", "))]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}
