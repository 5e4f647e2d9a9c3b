//! Saved form schemas repository

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::engine::model::FormSchema;
use crate::store::models::FormSummary;

/// Save a form schema (insert or update)
pub async fn save(pool: &SqlitePool, schema: &FormSchema) -> Result<()> {
    let fields_json =
        serde_json::to_string(&schema.fields).context("Failed to serialize form fields")?;

    sqlx::query(
        r#"
        INSERT INTO forms (id, title, fields_json)
        VALUES (?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            title = excluded.title,
            fields_json = excluded.fields_json,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(&schema.id)
    .bind(&schema.title)
    .bind(&fields_json)
    .execute(pool)
    .await
    .with_context(|| format!("Failed to save form '{}'", schema.id))?;

    Ok(())
}

/// Get a single form schema by id
pub async fn get(pool: &SqlitePool, id: &str) -> Result<Option<FormSchema>> {
    let row: Option<(String, String, String)> =
        sqlx::query_as("SELECT id, title, fields_json FROM forms WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
            .with_context(|| format!("Failed to get form '{id}'"))?;

    row.map(|(id, title, fields_json)| {
        let fields = serde_json::from_str(&fields_json)
            .with_context(|| format!("Corrupt fields for form '{id}'"))?;
        Ok(FormSchema { id, title, fields })
    })
    .transpose()
}

/// List saved forms, most recently updated first
pub async fn list(pool: &SqlitePool) -> Result<Vec<FormSummary>> {
    let rows: Vec<(String, String, DateTime<Utc>)> =
        sqlx::query_as("SELECT id, title, updated_at FROM forms ORDER BY updated_at DESC")
            .fetch_all(pool)
            .await
            .context("Failed to list forms")?;

    Ok(rows
        .into_iter()
        .map(|(id, title, updated_at)| FormSummary {
            id,
            title,
            updated_at,
        })
        .collect())
}

/// Delete a saved form
pub async fn delete(pool: &SqlitePool, id: &str) -> Result<()> {
    sqlx::query("DELETE FROM forms WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to delete form '{id}'"))?;

    Ok(())
}
