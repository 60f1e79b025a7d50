use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::{FromRow, PgPool, Postgres};
use uuid::Uuid;

use crate::auth::{Owned, Role};
use crate::database::manager::DatabaseError;
use crate::database::models::{RepairRequest, Service, ServiceProvider, User};
use crate::database::repository::{
    OwnedRepository, Page, Record, RemovedRecords, Repository, ServiceRepository, UserRepository,
};

type PgQuery<'q> = sqlx::query::Query<'q, Postgres, PgArguments>;

/// Table mapping for a record stored in Postgres.
pub trait PgRecord: Record + for<'r> FromRow<'r, PgRow> + Unpin {
    const TABLE: &'static str;
    const INSERT_SQL: &'static str;
    const UPDATE_SQL: &'static str;

    fn bind_insert<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q>;

    /// Binds `$1` to the id, followed by the mutable columns.
    fn bind_update<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q>;
}

pub trait PgOwned: PgRecord + Owned {
    const OWNER_COLUMN: &'static str;
}

/// Postgres-backed store. One pool serves every table.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Delete a user and everything it owns in one transaction.
    pub async fn delete_user(&self, id: Uuid) -> Result<RemovedRecords, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let mut owned = [0u64; 3];
        for (slot, (table, column)) in owned.iter_mut().zip([
            (RepairRequest::TABLE, RepairRequest::OWNER_COLUMN),
            (Service::TABLE, Service::OWNER_COLUMN),
            (ServiceProvider::TABLE, ServiceProvider::OWNER_COLUMN),
        ]) {
            let sql = format!("DELETE FROM {} WHERE {} = $1", table, column);
            *slot = sqlx::query(&sql).bind(id).execute(&mut *tx).await?.rows_affected();
        }

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            // dropping tx rolls back
            return Err(User::not_found());
        }

        tx.commit().await?;
        let [repair_requests, services, listings] = owned;
        Ok(RemovedRecords {
            repair_requests,
            services,
            listings,
        })
    }
}

#[async_trait]
impl<T: PgRecord> Repository<T> for PgStore {
    async fn fetch_by_id(&self, id: Uuid) -> Result<T, DatabaseError> {
        let sql = format!("SELECT * FROM {} WHERE id = $1", T::TABLE);
        sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(T::not_found)
    }

    async fn list(&self, page: Page) -> Result<Vec<T>, DatabaseError> {
        let sql = format!(
            "SELECT * FROM {} ORDER BY created_at DESC, id LIMIT $1 OFFSET $2",
            T::TABLE
        );
        let rows = sqlx::query_as::<_, T>(&sql)
            .bind(page.limit)
            .bind(page.skip)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn insert(&self, record: &T) -> Result<(), DatabaseError> {
        record
            .bind_insert(sqlx::query(T::INSERT_SQL))
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from_write)?;
        Ok(())
    }

    async fn save(&self, record: &T) -> Result<(), DatabaseError> {
        let result = record
            .bind_update(sqlx::query(T::UPDATE_SQL))
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from_write)?;
        if result.rows_affected() == 0 {
            return Err(T::not_found());
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", T::TABLE);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(T::not_found());
        }
        Ok(())
    }

    async fn count(&self) -> Result<i64, DatabaseError> {
        let sql = format!("SELECT COUNT(*) FROM {}", T::TABLE);
        Ok(sqlx::query_scalar::<_, i64>(&sql).fetch_one(&self.pool).await?)
    }

    async fn count_since(&self, since: DateTime<Utc>) -> Result<i64, DatabaseError> {
        let sql = format!("SELECT COUNT(*) FROM {} WHERE created_at >= $1", T::TABLE);
        Ok(sqlx::query_scalar::<_, i64>(&sql)
            .bind(since)
            .fetch_one(&self.pool)
            .await?)
    }
}

#[async_trait]
impl<T: PgOwned> OwnedRepository<T> for PgStore {
    async fn list_by_owner(&self, owner_id: Uuid, page: Page) -> Result<Vec<T>, DatabaseError> {
        let sql = format!(
            "SELECT * FROM {} WHERE {} = $1 ORDER BY created_at DESC, id LIMIT $2 OFFSET $3",
            T::TABLE,
            T::OWNER_COLUMN
        );
        let rows = sqlx::query_as::<_, T>(&sql)
            .bind(owner_id)
            .bind(page.limit)
            .bind(page.skip)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn delete_by_owner(&self, owner_id: Uuid) -> Result<u64, DatabaseError> {
        let sql = format!("DELETE FROM {} WHERE {} = $1", T::TABLE, T::OWNER_COLUMN);
        let result = sqlx::query(&sql).bind(owner_id).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE lower(email) = lower($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn count_by_role(&self) -> Result<Vec<(Role, i64)>, DatabaseError> {
        let rows = sqlx::query_as::<_, (Role, i64)>(
            "SELECT role, COUNT(*) FROM users GROUP BY role ORDER BY role",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[async_trait]
impl ServiceRepository for PgStore {
    async fn count_by_service_type(&self) -> Result<Vec<(String, i64)>, DatabaseError> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT service_type, COUNT(*) FROM services GROUP BY service_type ORDER BY service_type",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

impl PgRecord for User {
    const TABLE: &'static str = "users";
    const INSERT_SQL: &'static str = r#"
        INSERT INTO users (
            id, email, hashed_password, first_name, last_name, role,
            is_active, is_verified, service_type, experience, contact_info,
            company_name, team_size, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
    "#;
    const UPDATE_SQL: &'static str = r#"
        UPDATE users SET
            email = $2, hashed_password = $3, first_name = $4, last_name = $5,
            role = $6, is_active = $7, is_verified = $8, service_type = $9,
            experience = $10, contact_info = $11, company_name = $12, team_size = $13
        WHERE id = $1
    "#;

    fn bind_insert<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        self.bind_update(query).bind(self.created_at)
    }

    fn bind_update<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.id)
            .bind(&self.email)
            .bind(&self.hashed_password)
            .bind(&self.first_name)
            .bind(&self.last_name)
            .bind(self.role)
            .bind(self.is_active)
            .bind(self.is_verified)
            .bind(&self.service_type)
            .bind(&self.experience)
            .bind(&self.contact_info)
            .bind(&self.company_name)
            .bind(self.team_size)
    }
}

impl PgRecord for RepairRequest {
    const TABLE: &'static str = "repair_requests";
    const INSERT_SQL: &'static str = r#"
        INSERT INTO repair_requests (id, title, description, voice_file, user_id, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
    "#;
    const UPDATE_SQL: &'static str = r#"
        UPDATE repair_requests SET title = $2, description = $3, voice_file = $4
        WHERE id = $1
    "#;

    fn bind_insert<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        self.bind_update(query).bind(self.user_id).bind(self.created_at)
    }

    fn bind_update<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.id)
            .bind(&self.title)
            .bind(&self.description)
            .bind(&self.voice_file)
    }
}

impl PgOwned for RepairRequest {
    const OWNER_COLUMN: &'static str = "user_id";
}

impl PgRecord for Service {
    const TABLE: &'static str = "services";
    const INSERT_SQL: &'static str = r#"
        INSERT INTO services (id, name, service_type, description, contact_info, provider_id, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
    "#;
    const UPDATE_SQL: &'static str = r#"
        UPDATE services SET name = $2, service_type = $3, description = $4, contact_info = $5
        WHERE id = $1
    "#;

    fn bind_insert<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        self.bind_update(query).bind(self.provider_id).bind(self.created_at)
    }

    fn bind_update<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.id)
            .bind(&self.name)
            .bind(&self.service_type)
            .bind(&self.description)
            .bind(&self.contact_info)
    }
}

impl PgOwned for Service {
    const OWNER_COLUMN: &'static str = "provider_id";
}

impl PgRecord for ServiceProvider {
    const TABLE: &'static str = "service_providers";
    const INSERT_SQL: &'static str = r#"
        INSERT INTO service_providers (id, name, service_type, description, contact_info, user_id, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
    "#;
    const UPDATE_SQL: &'static str = r#"
        UPDATE service_providers SET name = $2, service_type = $3, description = $4, contact_info = $5
        WHERE id = $1
    "#;

    fn bind_insert<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        self.bind_update(query).bind(self.user_id).bind(self.created_at)
    }

    fn bind_update<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.id)
            .bind(&self.name)
            .bind(&self.service_type)
            .bind(&self.description)
            .bind(&self.contact_info)
    }
}

impl PgOwned for ServiceProvider {
    const OWNER_COLUMN: &'static str = "user_id";
}
