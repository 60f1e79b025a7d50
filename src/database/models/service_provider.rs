use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{Checks, ValidationError};
use crate::auth::Owned;

/// A provider's public listing, browsed by plain users.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ServiceProvider {
    pub id: Uuid,
    pub name: String,
    pub service_type: String,
    pub description: String,
    pub contact_info: String,
    pub created_at: DateTime<Utc>,
    pub user_id: Uuid,
}

impl Owned for ServiceProvider {
    const KIND: &'static str = "service provider";

    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceProviderCreate {
    pub name: String,
    pub service_type: String,
    pub description: String,
    pub contact_info: String,
}

impl ServiceProviderCreate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        Checks::default()
            .required("name", &self.name)
            .required("service_type", &self.service_type)
            .required("description", &self.description)
            .required("contact_info", &self.contact_info)
            .max_len("name", Some(&self.name), 255)
            .max_len("service_type", Some(&self.service_type), 100)
            .finish()
    }

    pub fn into_record(self, owner_id: Uuid) -> ServiceProvider {
        ServiceProvider {
            id: Uuid::new_v4(),
            name: self.name.trim().to_string(),
            service_type: self.service_type.trim().to_string(),
            description: self.description,
            contact_info: self.contact_info,
            created_at: Utc::now(),
            user_id: owner_id,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceProviderUpdate {
    pub name: Option<String>,
    pub service_type: Option<String>,
    pub description: Option<String>,
    pub contact_info: Option<String>,
}

impl ServiceProviderUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        Checks::default()
            .not_blank("name", self.name.as_deref())
            .not_blank("service_type", self.service_type.as_deref())
            .not_blank("description", self.description.as_deref())
            .not_blank("contact_info", self.contact_info.as_deref())
            .max_len("name", self.name.as_deref(), 255)
            .max_len("service_type", self.service_type.as_deref(), 100)
            .finish()
    }

    pub fn apply(self, listing: &mut ServiceProvider) {
        if let Some(v) = self.name {
            listing.name = v.trim().to_string();
        }
        if let Some(v) = self.service_type {
            listing.service_type = v.trim().to_string();
        }
        if let Some(v) = self.description {
            listing.description = v;
        }
        if let Some(v) = self.contact_info {
            listing.contact_info = v;
        }
    }
}
