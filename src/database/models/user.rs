use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{Checks, ValidationError};
use crate::auth::{Identity, Role};

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// A registered account. Provider and organization attributes share the row
/// and stay empty for roles that do not use them.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Role,
    pub is_active: bool,
    pub is_verified: bool,
    pub service_type: Option<String>,
    pub experience: Option<String>,
    pub contact_info: Option<String>,
    pub company_name: Option<String>,
    pub team_size: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id,
            email: self.email.clone(),
            role: self.role,
        }
    }

    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(name), None) | (None, Some(name)) => name.clone(),
            (None, None) => self.email.clone(),
        }
    }
}

/// Registration payload, including the role-specific step-form fields.
#[derive(Debug, Clone, Deserialize)]
pub struct UserCreate {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub role: Role,
    pub service_type: Option<String>,
    pub experience: Option<String>,
    pub contact_info: Option<String>,
    pub company_name: Option<String>,
    pub team_size: Option<i32>,
}

impl UserCreate {
    pub fn normalized_email(&self) -> String {
        normalize_email(&self.email)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut checks = Checks::default();
        if !looks_like_email(&self.normalized_email()) {
            checks.reject("email", "Not a valid email address");
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            checks.reject(
                "password",
                format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH),
            );
        }
        if self.team_size.is_some_and(|n| n < 0) {
            checks.reject("team_size", "Team size cannot be negative");
        }
        checks
            .required("first_name", &self.first_name)
            .required("last_name", &self.last_name)
            .max_len("service_type", self.service_type.as_deref(), 100)
            .max_len("company_name", self.company_name.as_deref(), 255)
            .finish()
    }

    pub fn into_user(self, hashed_password: String) -> User {
        User {
            id: Uuid::new_v4(),
            email: normalize_email(&self.email),
            hashed_password,
            first_name: Some(self.first_name.trim().to_string()),
            last_name: Some(self.last_name.trim().to_string()),
            role: self.role,
            is_active: true,
            is_verified: false,
            service_type: self.service_type,
            experience: self.experience,
            contact_info: self.contact_info,
            company_name: self.company_name,
            team_size: self.team_size,
            created_at: Utc::now(),
        }
    }
}

/// Self-service profile changes. There is no role field: only an admin may
/// change a role.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
    pub service_type: Option<String>,
    pub experience: Option<String>,
    pub contact_info: Option<String>,
    pub company_name: Option<String>,
    pub team_size: Option<i32>,
}

impl UserUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut checks = Checks::default();
        if self
            .password
            .as_ref()
            .is_some_and(|p| p.chars().count() < MIN_PASSWORD_LENGTH)
        {
            checks.reject(
                "password",
                format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH),
            );
        }
        if self.team_size.is_some_and(|n| n < 0) {
            checks.reject("team_size", "Team size cannot be negative");
        }
        checks
            .not_blank("first_name", self.first_name.as_deref())
            .not_blank("last_name", self.last_name.as_deref())
            .max_len("service_type", self.service_type.as_deref(), 100)
            .max_len("company_name", self.company_name.as_deref(), 255)
            .finish()
    }

    /// Apply the set fields. The password must already be hashed by the caller.
    pub fn apply(self, user: &mut User, hashed_password: Option<String>) {
        if let Some(v) = self.first_name {
            user.first_name = Some(v.trim().to_string());
        }
        if let Some(v) = self.last_name {
            user.last_name = Some(v.trim().to_string());
        }
        if let Some(hash) = hashed_password {
            user.hashed_password = hash;
        }
        if let Some(v) = self.service_type {
            user.service_type = Some(v);
        }
        if let Some(v) = self.experience {
            user.experience = Some(v);
        }
        if let Some(v) = self.contact_info {
            user.contact_info = Some(v);
        }
        if let Some(v) = self.company_name {
            user.company_name = Some(v);
        }
        if let Some(v) = self.team_size {
            user.team_size = Some(v);
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}
