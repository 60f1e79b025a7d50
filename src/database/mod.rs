pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod schema;

use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::memory::MemoryRepository;
use crate::database::models::{RepairRequest, Service, ServiceProvider, User};
use crate::database::postgres::PgStore;
use crate::database::repository::{
    OwnedRepository, RemovedRecords, Repository, ServiceRepository, UserRepository,
};

/// One repository per table, behind trait objects so handlers do not care
/// which backend is in use.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserRepository>,
    pub repair_requests: Arc<dyn OwnedRepository<RepairRequest>>,
    pub services: Arc<dyn ServiceRepository>,
    pub providers: Arc<dyn OwnedRepository<ServiceProvider>>,
    backend: Backend,
}

#[derive(Clone)]
enum Backend {
    Postgres(PgPool),
    Memory,
}

impl Stores {
    pub fn postgres(pool: PgPool) -> Self {
        let store = Arc::new(PgStore::new(pool.clone()));
        Self {
            users: store.clone(),
            repair_requests: store.clone(),
            services: store.clone(),
            providers: store,
            backend: Backend::Postgres(pool),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(MemoryRepository::<User>::new()),
            repair_requests: Arc::new(MemoryRepository::<RepairRequest>::new()),
            services: Arc::new(MemoryRepository::<Service>::new()),
            providers: Arc::new(MemoryRepository::<ServiceProvider>::new()),
            backend: Backend::Memory,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self.backend {
            Backend::Postgres(_) => "postgres",
            Backend::Memory => "memory",
        }
    }

    /// Remove an account and every record it owns. Nothing is removed when
    /// the account does not exist.
    pub async fn delete_user(&self, id: Uuid) -> Result<RemovedRecords, DatabaseError> {
        match &self.backend {
            Backend::Postgres(pool) => PgStore::new(pool.clone()).delete_user(id).await,
            Backend::Memory => {
                // the user row goes first so a missing account leaves the tables untouched
                self.users.delete(id).await?;
                Ok(RemovedRecords {
                    repair_requests: self.repair_requests.delete_by_owner(id).await?,
                    services: self.services.delete_by_owner(id).await?,
                    listings: self.providers.delete_by_owner(id).await?,
                })
            }
        }
    }

    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        match &self.backend {
            Backend::Postgres(pool) => DatabaseManager::health_check(pool).await,
            Backend::Memory => Ok(()),
        }
    }
}
