//! Schema setup. `migrate` is idempotent and runs once at startup; `reset`
//! is destructive and only reachable from the operator CLI.

use sqlx::PgPool;
use tracing::{info, warn};

use crate::database::manager::DatabaseError;

const MIGRATIONS: &[&str] = &[
    r#"
    DO $$ BEGIN
        CREATE TYPE user_role AS ENUM ('user', 'provider_individual', 'provider_organization', 'admin');
    EXCEPTION
        WHEN duplicate_object THEN NULL;
    END $$
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        email VARCHAR(320) NOT NULL,
        hashed_password VARCHAR(1024) NOT NULL,
        first_name VARCHAR,
        last_name VARCHAR,
        role user_role NOT NULL DEFAULT 'user',
        is_active BOOLEAN NOT NULL DEFAULT TRUE,
        is_verified BOOLEAN NOT NULL DEFAULT FALSE,
        service_type VARCHAR(100),
        experience TEXT,
        contact_info TEXT,
        company_name VARCHAR(255),
        team_size INTEGER,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS users_email_lower_idx ON users (lower(email))",
    r#"
    CREATE TABLE IF NOT EXISTS repair_requests (
        id UUID PRIMARY KEY,
        title VARCHAR(255) NOT NULL,
        description TEXT,
        voice_file VARCHAR(500),
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        user_id UUID NOT NULL REFERENCES users (id) ON DELETE CASCADE
    )
    "#,
    "CREATE INDEX IF NOT EXISTS repair_requests_user_id_idx ON repair_requests (user_id)",
    r#"
    CREATE TABLE IF NOT EXISTS services (
        id UUID PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        service_type VARCHAR(100) NOT NULL,
        description TEXT NOT NULL,
        contact_info TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        provider_id UUID NOT NULL REFERENCES users (id) ON DELETE CASCADE
    )
    "#,
    "CREATE INDEX IF NOT EXISTS services_provider_id_idx ON services (provider_id)",
    r#"
    CREATE TABLE IF NOT EXISTS service_providers (
        id UUID PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        service_type VARCHAR(100) NOT NULL,
        description TEXT NOT NULL,
        contact_info TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        user_id UUID NOT NULL REFERENCES users (id) ON DELETE CASCADE
    )
    "#,
    "CREATE INDEX IF NOT EXISTS service_providers_user_id_idx ON service_providers (user_id)",
];

const TEARDOWN: &[&str] = &[
    "DROP TABLE IF EXISTS service_providers",
    "DROP TABLE IF EXISTS services",
    "DROP TABLE IF EXISTS repair_requests",
    "DROP TABLE IF EXISTS users",
    "DROP TYPE IF EXISTS user_role",
];

/// Create any missing types, tables and indexes.
pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
    let mut tx = pool.begin().await?;
    for statement in MIGRATIONS {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;

    info!("Schema is up to date ({} statements applied)", MIGRATIONS.len());
    Ok(())
}

/// Drop every table and recreate the schema from scratch.
pub async fn reset(pool: &PgPool) -> Result<(), DatabaseError> {
    warn!("Dropping all marketplace tables");

    let mut tx = pool.begin().await?;
    for statement in TEARDOWN {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;

    migrate(pool).await
}
