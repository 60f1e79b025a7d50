use anyhow::{anyhow, Context};
use serde_json::json;
use sqlx::PgPool;

use crate::auth::Role;
use crate::cli::utils::{output_list, output_success};
use crate::cli::OutputFormat;
use crate::database::models::user::normalize_email;
use crate::database::models::User;
use crate::database::postgres::PgStore;
use crate::database::repository::{Repository, UserRepository};

pub async fn set_role(pool: &PgPool, email: &str, role: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let role: Role = role.parse()?;
    let store = PgStore::new(pool.clone());

    let mut user = store
        .find_by_email(&normalize_email(email))
        .await
        .context("failed to look up account")?
        .ok_or_else(|| anyhow!("no account with email {}", email))?;

    let previous = user.role;
    user.role = role;
    Repository::<User>::save(&store, &user).await?;

    tracing::info!("Role of {} changed from {} to {}", user.email, previous, role);
    output_success(
        output_format,
        &format!("{} is now {}", user.email, role),
        Some(json!({ "id": user.id, "email": user.email, "previous_role": previous, "role": role })),
    )
}

pub fn roles(output_format: OutputFormat) -> anyhow::Result<()> {
    output_list(output_format, "roles", &Role::values())
}
