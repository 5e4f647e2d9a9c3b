//! SQLite-backed persistence for the form engine.
//!
//! This module is the "persist a named record" collaborator the engine hands
//! its documents to: saved form schemas, the client roster with its single
//! assigned-form slot, and the append-only response history. The [`Store`]
//! facade owns the pool and delegates to per-collection repository modules.

use anyhow::{Context, Result};
use std::path::PathBuf;

pub mod db;
pub mod models;
pub mod repository;

pub use models::{ClientRecord, FormSummary};

use crate::engine::model::{FormResponse, FormSchema};

pub struct Store {
    pool: sqlx::SqlitePool,
}

impl Store {
    /// Get the path to the SQLite database file
    pub fn get_db_path() -> Result<PathBuf> {
        let data_dir = if cfg!(target_os = "linux") {
            dirs::config_dir()
                .context("Failed to get XDG config directory")?
                .join("coachform")
        } else {
            dirs::home_dir()
                .context("Failed to get home directory")?
                .join(".coachform")
        };

        if !data_dir.exists() {
            std::fs::create_dir_all(&data_dir)
                .with_context(|| format!("Failed to create data directory: {data_dir:?}"))?;
            log::info!("Created data directory: {data_dir:?}");
        }

        Ok(data_dir.join("coachform.db"))
    }

    /// Open the on-disk store, applying the schema if needed
    pub async fn load() -> Result<Self> {
        let db_path = Self::get_db_path()?;
        log::debug!("Loading store from: {db_path:?}");

        let pool = db::connect(&db_path).await?;
        db::run_migrations(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new store for testing (in-memory database)
    pub async fn new_test() -> Result<Self> {
        let pool = db::connect_memory().await?;
        db::run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    // Saved form management
    pub async fn save_form(&self, schema: &FormSchema) -> Result<()> {
        repository::forms::save(&self.pool, schema).await
    }

    pub async fn get_form(&self, id: &str) -> Result<Option<FormSchema>> {
        repository::forms::get(&self.pool, id).await
    }

    pub async fn list_forms(&self) -> Result<Vec<FormSummary>> {
        repository::forms::list(&self.pool).await
    }

    pub async fn delete_form(&self, id: &str) -> Result<()> {
        repository::forms::delete(&self.pool, id).await
    }

    // Client roster
    pub async fn add_client(&self, id: &str, name: &str, email: Option<&str>) -> Result<()> {
        repository::clients::upsert(&self.pool, id, name, email).await
    }

    pub async fn get_client(&self, id: &str) -> Result<Option<ClientRecord>> {
        repository::clients::get(&self.pool, id).await
    }

    pub async fn list_clients(&self) -> Result<Vec<ClientRecord>> {
        repository::clients::list(&self.pool).await
    }

    // Assigned-form slot
    pub async fn assign_form(&self, client_id: &str, schema: &FormSchema) -> Result<()> {
        repository::clients::set_assigned_form(&self.pool, client_id, Some(schema)).await
    }

    pub async fn clear_assignment(&self, client_id: &str) -> Result<()> {
        repository::clients::set_assigned_form(&self.pool, client_id, None).await
    }

    // Response history
    pub async fn append_response(&self, client_id: &str, response: &FormResponse) -> Result<()> {
        repository::responses::append(&self.pool, client_id, response).await
    }

    pub async fn list_responses(&self, client_id: &str) -> Result<Vec<FormResponse>> {
        repository::responses::list_for_client(&self.pool, client_id).await
    }
}
