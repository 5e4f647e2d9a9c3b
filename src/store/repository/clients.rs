//! Client records repository

use anyhow::{Context, Result, bail};
use sqlx::SqlitePool;

use crate::engine::model::FormSchema;
use crate::store::models::ClientRecord;

/// Insert or update a client (identity attributes only; the assigned-form
/// slot is managed by [`set_assigned_form`])
pub async fn upsert(pool: &SqlitePool, id: &str, name: &str, email: Option<&str>) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO clients (id, name, email)
        VALUES (?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            email = excluded.email
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(email)
    .execute(pool)
    .await
    .with_context(|| format!("Failed to save client '{id}'"))?;

    Ok(())
}

/// Get a single client by id
pub async fn get(pool: &SqlitePool, id: &str) -> Result<Option<ClientRecord>> {
    let row: Option<(String, String, Option<String>, Option<String>)> = sqlx::query_as(
        "SELECT id, name, email, assigned_form_json FROM clients WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("Failed to get client '{id}'"))?;

    row.map(parse_client_row).transpose()
}

/// List all clients, alphabetically
pub async fn list(pool: &SqlitePool) -> Result<Vec<ClientRecord>> {
    let rows: Vec<(String, String, Option<String>, Option<String>)> = sqlx::query_as(
        "SELECT id, name, email, assigned_form_json FROM clients ORDER BY name",
    )
    .fetch_all(pool)
    .await
    .context("Failed to list clients")?;

    rows.into_iter().map(parse_client_row).collect()
}

/// Set or clear the client's assigned-form slot. `None` clears it (the
/// submit path); `Some` overwrites whatever was there (the assign path).
pub async fn set_assigned_form(
    pool: &SqlitePool,
    client_id: &str,
    form: Option<&FormSchema>,
) -> Result<()> {
    let form_json = form
        .map(serde_json::to_string)
        .transpose()
        .context("Failed to serialize assigned form")?;

    let result = sqlx::query("UPDATE clients SET assigned_form_json = ? WHERE id = ?")
        .bind(form_json)
        .bind(client_id)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to update assigned form for client '{client_id}'"))?;

    if result.rows_affected() == 0 {
        bail!("no client with id '{client_id}'");
    }

    Ok(())
}

fn parse_client_row(
    (id, name, email, assigned_form_json): (String, String, Option<String>, Option<String>),
) -> Result<ClientRecord> {
    let assigned_form = assigned_form_json
        .as_deref()
        .map(serde_json::from_str)
        .transpose()
        .with_context(|| format!("Corrupt assigned form for client '{id}'"))?;

    Ok(ClientRecord {
        id,
        name,
        email,
        assigned_form,
    })
}
