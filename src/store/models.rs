//! Stored record shapes used by the repository layer.

use chrono::{DateTime, Utc};

use crate::engine::model::FormSchema;

/// A client record as the form engine sees it: identity plus the single
/// assigned-form slot. Submitting clears the slot; assigning overwrites it.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientRecord {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub assigned_form: Option<FormSchema>,
}

/// Listing row for saved forms (the fields themselves stay in the store
/// until the schema is actually loaded).
#[derive(Debug, Clone, PartialEq)]
pub struct FormSummary {
    pub id: String,
    pub title: String,
    pub updated_at: DateTime<Utc>,
}
