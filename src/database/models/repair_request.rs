use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{Checks, ValidationError};
use crate::auth::Owned;

/// A repair job posted by a plain user. Either a written description or a
/// reference to a voice recording carries the details.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RepairRequest {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub voice_file: Option<String>,
    pub created_at: DateTime<Utc>,
    pub user_id: Uuid,
}

impl Owned for RepairRequest {
    const KIND: &'static str = "repair request";

    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepairRequestCreate {
    pub title: String,
    pub description: Option<String>,
    pub voice_file: Option<String>,
}

impl RepairRequestCreate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let has_description = self.description.as_deref().is_some_and(|d| !d.trim().is_empty());
        let has_voice = self.voice_file.as_deref().is_some_and(|v| !v.trim().is_empty());
        if !has_description && !has_voice {
            return Err(ValidationError::new("Either description or voice file must be provided"));
        }

        Checks::default()
            .required("title", &self.title)
            .max_len("title", Some(&self.title), 255)
            .max_len("voice_file", self.voice_file.as_deref(), 500)
            .finish()
    }

    pub fn into_record(self, owner_id: Uuid) -> RepairRequest {
        RepairRequest {
            id: Uuid::new_v4(),
            title: self.title.trim().to_string(),
            description: self.description,
            voice_file: self.voice_file,
            created_at: Utc::now(),
            user_id: owner_id,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepairRequestUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub voice_file: Option<String>,
}

impl RepairRequestUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        Checks::default()
            .not_blank("title", self.title.as_deref())
            .max_len("title", self.title.as_deref(), 255)
            .max_len("voice_file", self.voice_file.as_deref(), 500)
            .finish()
    }

    pub fn apply(self, record: &mut RepairRequest) {
        if let Some(title) = self.title {
            record.title = title.trim().to_string();
        }
        if let Some(description) = self.description {
            record.description = Some(description);
        }
        if let Some(voice_file) = self.voice_file {
            record.voice_file = Some(voice_file);
        }
    }
}
