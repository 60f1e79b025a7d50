use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{Checks, ValidationError};
use crate::auth::Owned;

/// A service offered by a provider account.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    pub service_type: String,
    pub description: String,
    pub contact_info: String,
    pub created_at: DateTime<Utc>,
    pub provider_id: Uuid,
}

impl Owned for Service {
    const KIND: &'static str = "service";

    fn owner_id(&self) -> Uuid {
        self.provider_id
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceCreate {
    pub name: String,
    pub service_type: String,
    pub description: String,
    pub contact_info: String,
}

impl ServiceCreate {
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

    pub fn into_record(self, provider_id: Uuid) -> Service {
        Service {
            id: Uuid::new_v4(),
            name: self.name.trim().to_string(),
            service_type: self.service_type.trim().to_string(),
            description: self.description,
            contact_info: self.contact_info,
            created_at: Utc::now(),
            provider_id,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceUpdate {
    pub name: Option<String>,
    pub service_type: Option<String>,
    pub description: Option<String>,
    pub contact_info: Option<String>,
}

impl ServiceUpdate {
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

    pub fn apply(self, service: &mut Service) {
        if let Some(v) = self.name {
            service.name = v.trim().to_string();
        }
        if let Some(v) = self.service_type {
            service.service_type = v.trim().to_string();
        }
        if let Some(v) = self.description {
            service.description = v;
        }
        if let Some(v) = self.contact_info {
            service.contact_info = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_create_fields_are_required() {
        let payload = ServiceCreate {
            name: "Plumbing".to_string(),
            service_type: String::new(),
            description: " ".to_string(),
            contact_info: "555-0100".to_string(),
        };
        let err = payload.validate().unwrap_err();
        assert_eq!(err.field_errors.len(), 2);
        assert!(err.field_errors.contains_key("service_type"));
        assert!(err.field_errors.contains_key("description"));
    }

    #[test]
    fn update_rejects_blanking_a_field() {
        let update = ServiceUpdate {
            name: Some(String::new()),
            ..Default::default()
        };
        assert!(update.validate().is_err());
        assert!(ServiceUpdate::default().validate().is_ok());
    }

    #[test]
    fn create_and_update_store_trimmed_names() {
        let mut service = ServiceCreate {
            name: " Rewiring ".to_string(),
            service_type: "electrical ".to_string(),
            description: "Whole-house".to_string(),
            contact_info: "555-0100".to_string(),
        }
        .into_record(Uuid::new_v4());
        assert_eq!(service.name, "Rewiring");
        assert_eq!(service.service_type, "electrical");

        ServiceUpdate {
            name: Some("  Fuse boxes".to_string()),
            service_type: Some(" electrical".to_string()),
            ..Default::default()
        }
        .apply(&mut service);
        assert_eq!(service.name, "Fuse boxes");
        assert_eq!(service.service_type, "electrical");
    }
}
