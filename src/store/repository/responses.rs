//! Form response history repository

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::engine::model::FormResponse;

/// Append one submission to a client's history. Responses are written once
/// and never updated.
pub async fn append(pool: &SqlitePool, client_id: &str, response: &FormResponse) -> Result<()> {
    let answers_json =
        serde_json::to_string(&response.answers).context("Failed to serialize answers")?;

    sqlx::query(
        r#"
        INSERT INTO form_responses (id, client_id, form_id, submitted_at, answers_json)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&response.id)
    .bind(client_id)
    .bind(&response.form_id)
    .bind(response.date)
    .bind(&answers_json)
    .execute(pool)
    .await
    .with_context(|| format!("Failed to append response '{}'", response.id))?;

    Ok(())
}

/// All submissions for a client, oldest first
pub async fn list_for_client(pool: &SqlitePool, client_id: &str) -> Result<Vec<FormResponse>> {
    let rows: Vec<(String, String, DateTime<Utc>, String)> = sqlx::query_as(
        r#"
        SELECT id, form_id, submitted_at, answers_json
        FROM form_responses
        WHERE client_id = ?
        ORDER BY submitted_at
        "#,
    )
    .bind(client_id)
    .fetch_all(pool)
    .await
    .with_context(|| format!("Failed to list responses for client '{client_id}'"))?;

    rows.into_iter()
        .map(|(id, form_id, date, answers_json)| {
            let answers = serde_json::from_str(&answers_json)
                .with_context(|| format!("Corrupt answers for response '{id}'"))?;
            Ok(FormResponse {
                id,
                form_id,
                date,
                answers,
            })
        })
        .collect()
}
