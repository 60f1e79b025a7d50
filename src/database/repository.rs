use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::auth::{Owned, Role};
use crate::database::manager::DatabaseError;
use crate::database::models::{RepairRequest, Service, ServiceProvider, User};

/// Offset pagination; lists are ordered newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: i64,
    pub limit: i64,
}

impl Page {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self {
            skip: skip.max(0),
            limit: limit.max(0),
        }
    }

    pub fn first(limit: i64) -> Self {
        Self::new(0, limit)
    }
}

/// Rows removed along with a deleted account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemovedRecords {
    pub repair_requests: u64,
    pub services: u64,
    pub listings: u64,
}

/// A persisted record with a primary key and creation time.
pub trait Record: Clone + Send + Sync + 'static {
    /// Name used in not-found messages, e.g. "Service".
    const LABEL: &'static str;

    fn id(&self) -> Uuid;
    fn created_at(&self) -> DateTime<Utc>;

    fn not_found() -> DatabaseError {
        DatabaseError::NotFound(format!("{} not found", Self::LABEL))
    }

    /// Unique-column clash with another row, described for a `Conflict`.
    /// Mirrors the unique constraints in the Postgres schema.
    fn clashes_with(&self, _other: &Self) -> Option<String> {
        None
    }
}

impl Record for User {
    const LABEL: &'static str = "User";

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn clashes_with(&self, other: &Self) -> Option<String> {
        (self.email.to_lowercase() == other.email.to_lowercase())
            .then(|| format!("email {} is already registered", self.email))
    }
}

impl Record for RepairRequest {
    const LABEL: &'static str = "Repair request";

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Record for Service {
    const LABEL: &'static str = "Service";

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Record for ServiceProvider {
    const LABEL: &'static str = "Service provider";

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Primary-key access to one kind of record.
#[async_trait]
pub trait Repository<T: Record>: Send + Sync {
    /// Fetch by id, or `DatabaseError::NotFound`.
    async fn fetch_by_id(&self, id: Uuid) -> Result<T, DatabaseError>;

    async fn list(&self, page: Page) -> Result<Vec<T>, DatabaseError>;

    async fn insert(&self, record: &T) -> Result<(), DatabaseError>;

    /// Persist changes to an existing record.
    async fn save(&self, record: &T) -> Result<(), DatabaseError>;

    async fn delete(&self, id: Uuid) -> Result<(), DatabaseError>;

    async fn count(&self) -> Result<i64, DatabaseError>;

    async fn count_since(&self, since: DateTime<Utc>) -> Result<i64, DatabaseError>;
}

#[async_trait]
pub trait OwnedRepository<T: Record + Owned>: Repository<T> {
    async fn list_by_owner(&self, owner_id: Uuid, page: Page) -> Result<Vec<T>, DatabaseError>;

    /// Remove every record owned by `owner_id`, returning how many went.
    async fn delete_by_owner(&self, owner_id: Uuid) -> Result<u64, DatabaseError>;
}

#[async_trait]
pub trait UserRepository: Repository<User> {
    /// Case-insensitive lookup.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    async fn count_by_role(&self) -> Result<Vec<(Role, i64)>, DatabaseError>;
}

#[async_trait]
pub trait ServiceRepository: OwnedRepository<Service> {
    async fn count_by_service_type(&self) -> Result<Vec<(String, i64)>, DatabaseError>;
}
