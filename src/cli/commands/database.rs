use serde_json::json;
use sqlx::PgPool;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::database::schema;

pub async fn migrate(pool: &PgPool, output_format: OutputFormat) -> anyhow::Result<()> {
    schema::migrate(pool).await?;
    output_success(output_format, "Schema is up to date", None)
}

pub async fn reset(pool: &PgPool, output_format: OutputFormat) -> anyhow::Result<()> {
    schema::reset(pool).await?;
    output_success(
        output_format,
        "Schema dropped and recreated",
        Some(json!({ "reset": true })),
    )
}
