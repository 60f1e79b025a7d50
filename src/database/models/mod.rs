pub mod repair_request;
pub mod service;
pub mod service_provider;
pub mod user;

use std::collections::HashMap;

pub use repair_request::{RepairRequest, RepairRequestCreate, RepairRequestUpdate};
pub use service::{Service, ServiceCreate, ServiceUpdate};
pub use service_provider::{ServiceProvider, ServiceProviderCreate, ServiceProviderUpdate};
pub use user::{User, UserCreate, UserUpdate};

/// Payload validation failure, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    pub field_errors: HashMap<String, String>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field_errors: HashMap::new(),
        }
    }

    pub fn field(mut self, field: &str, reason: impl Into<String>) -> Self {
        self.field_errors.insert(field.to_string(), reason.into());
        self
    }
}

/// Collects per-field problems and turns them into a single error.
#[derive(Debug, Default)]
pub(crate) struct Checks {
    field_errors: HashMap<String, String>,
}

impl Checks {
    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.field_errors
                .insert(field.to_string(), "This field is required".to_string());
        }
        self
    }

    /// Optional field that, when present, must not be blank.
    pub fn not_blank(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            self.required(field, value);
        }
        self
    }

    pub fn max_len(&mut self, field: &str, value: Option<&str>, max: usize) -> &mut Self {
        if value.is_some_and(|v| v.chars().count() > max) {
            self.field_errors
                .insert(field.to_string(), format!("Must be at most {} characters", max));
        }
        self
    }

    pub fn reject(&mut self, field: &str, reason: impl Into<String>) -> &mut Self {
        self.field_errors.insert(field.to_string(), reason.into());
        self
    }

    pub fn finish(&mut self) -> Result<(), ValidationError> {
        if self.field_errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                message: "Invalid request payload".to_string(),
                field_errors: std::mem::take(&mut self.field_errors),
            })
        }
    }
}
