//! Interactive authoring state for a form schema.
//!
//! The builder tracks two independent cursors over the forest: `selected_id`
//! (which field the property editor targets) and `insertion_target` (which
//! row column the next added field lands in). Editing one never touches the
//! other.

use anyhow::{Result, bail};
use uuid::Uuid;

use super::model::{FieldPatch, FieldType, FormField, FormSchema};
use super::tree::{self, InsertTarget, MoveDirection};
use crate::store::Store;

#[derive(Debug, Clone, Default)]
pub struct FormBuilder {
    pub title: String,
    pub fields: Vec<FormField>,
    pub selected_id: Option<String>,
    pub insertion_target: Option<InsertTarget>,
    pub preview_mode: bool,
    /// `Some` once the form has been saved (or loaded from the store); a
    /// save then updates in place instead of creating a duplicate.
    pub editing_form_id: Option<String>,
}

impl FormBuilder {
    pub fn new() -> Self {
        Self {
            title: "Untitled form".to_string(),
            ..Default::default()
        }
    }

    /// Add a defaulted field of the given type at the current insertion
    /// target (root when none is set). The target is consumed by the insert
    /// and selection lands on the new field. Returns the new field's id.
    pub fn add_field(&mut self, field_type: FieldType) -> String {
        let field = FormField::new(field_type);
        let id = field.id.clone();
        let fields = std::mem::take(&mut self.fields);
        self.fields = tree::insert_at(fields, self.insertion_target.as_ref(), field);
        self.insertion_target = None;
        self.selected_id = Some(id.clone());
        id
    }

    pub fn select_field(&mut self, id: impl Into<String>) {
        self.selected_id = Some(id.into());
    }

    pub fn clear_selection(&mut self) {
        self.selected_id = None;
    }

    pub fn selected_field(&self) -> Option<&FormField> {
        self.selected_id
            .as_deref()
            .and_then(|id| tree::find_by_id(&self.fields, id))
    }

    pub fn set_insertion_target(&mut self, parent_row_id: impl Into<String>, column_index: usize) {
        self.insertion_target = Some(InsertTarget {
            parent_row_id: parent_row_id.into(),
            column_index,
        });
    }

    pub fn clear_insertion_target(&mut self) {
        self.insertion_target = None;
    }

    pub fn update_field(&mut self, id: &str, patch: &FieldPatch) {
        let fields = std::mem::take(&mut self.fields);
        self.fields = tree::update_by_id(fields, id, patch);
    }

    pub fn remove_field(&mut self, id: &str) {
        let fields = std::mem::take(&mut self.fields);
        self.fields = tree::remove_by_id(fields, id);
        if self.selected_id.as_deref() == Some(id) {
            self.selected_id = None;
        }
    }

    pub fn move_field(&mut self, id: &str, direction: MoveDirection) {
        let fields = std::mem::take(&mut self.fields);
        self.fields = tree::move_by_id(fields, id, direction);
    }

    pub fn toggle_preview(&mut self) {
        self.preview_mode = !self.preview_mode;
    }

    /// Persist the current forest. Errors on an empty form. The first save
    /// allocates the schema id and flips the builder into editing mode, so a
    /// second save updates rather than duplicates.
    pub async fn save_form(&mut self, store: &Store) -> Result<String> {
        if self.fields.is_empty() {
            bail!("cannot save a form with no fields");
        }

        let id = match &self.editing_form_id {
            Some(id) => id.clone(),
            None => Uuid::new_v4().to_string(),
        };
        let schema = FormSchema::new(id.clone(), self.title.clone(), self.fields.clone());
        store.save_form(&schema).await?;
        log::info!("saved form '{}' ({})", schema.title, schema.id);
        self.editing_form_id = Some(id.clone());
        Ok(id)
    }

    /// Snapshot the current forest into the client's assigned-form slot,
    /// overwriting any prior assignment. An unsaved form gets its own id
    /// here, independent of any later save — assign-then-save therefore
    /// stores two schemas with the same content, a long-standing quirk kept
    /// for compatibility with existing records.
    pub async fn assign_to_client(&self, store: &Store, client_id: &str) -> Result<String> {
        if self.fields.is_empty() {
            bail!("cannot assign a form with no fields");
        }
        let Some(client) = store.get_client(client_id).await? else {
            bail!("no client with id '{client_id}'");
        };

        let id = self
            .editing_form_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let schema = FormSchema::new(id.clone(), self.title.clone(), self.fields.clone());
        store.assign_form(&client.id, &schema).await?;
        log::info!("assigned form '{}' to client {}", schema.title, client.id);
        Ok(id)
    }

    /// Replace the builder state wholesale from a stored schema.
    pub async fn load_form(&mut self, store: &Store, form_id: &str) -> Result<()> {
        let Some(schema) = store.get_form(form_id).await? else {
            bail!("no saved form with id '{form_id}'");
        };
        *self = Self {
            title: schema.title,
            fields: schema.fields,
            editing_form_id: Some(schema.id),
            ..Default::default()
        };
        Ok(())
    }

    /// Reset to an empty untitled form.
    pub fn new_form(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tree::find_by_id;

    #[test]
    fn add_field_selects_it_and_consumes_the_target() {
        let mut builder = FormBuilder::new();
        let row_id = builder.add_field(FieldType::Row);
        builder.set_insertion_target(row_id.clone(), 0);

        let text_id = builder.add_field(FieldType::Text);
        assert_eq!(builder.selected_id.as_deref(), Some(text_id.as_str()));
        assert!(builder.insertion_target.is_none());

        let row = find_by_id(&builder.fields, &row_id).unwrap();
        assert_eq!(row.columns[0][0].id, text_id);

        // with no target the next field lands at the root
        let email_id = builder.add_field(FieldType::Email);
        assert_eq!(builder.fields.len(), 2);
        assert_eq!(builder.fields[1].id, email_id);
    }

    #[test]
    fn cursors_are_independent() {
        let mut builder = FormBuilder::new();
        let row_id = builder.add_field(FieldType::Row);
        let text_id = builder.add_field(FieldType::Text);

        builder.set_insertion_target(row_id.clone(), 0);
        builder.select_field(text_id.clone());
        assert_eq!(
            builder.insertion_target.as_ref().map(|t| t.parent_row_id.as_str()),
            Some(row_id.as_str())
        );
        assert_eq!(builder.selected_id.as_deref(), Some(text_id.as_str()));
    }

    #[test]
    fn remove_clears_selection_only_for_the_removed_field() {
        let mut builder = FormBuilder::new();
        let a = builder.add_field(FieldType::Text);
        let b = builder.add_field(FieldType::Text);

        builder.select_field(a.clone());
        builder.remove_field(&b);
        assert_eq!(builder.selected_id.as_deref(), Some(a.as_str()));

        builder.remove_field(&a);
        assert_eq!(builder.selected_id, None);
    }

    #[test]
    fn stale_insertion_target_falls_through_harmlessly() {
        let mut builder = FormBuilder::new();
        let row_id = builder.add_field(FieldType::Row);
        builder.set_insertion_target(row_id.clone(), 0);
        builder.remove_field(&row_id);

        // target still points at the deleted row: insert is absorbed
        builder.add_field(FieldType::Text);
        assert!(builder.fields.is_empty());
        assert!(builder.insertion_target.is_none());
    }

    #[tokio::test]
    async fn save_twice_updates_instead_of_duplicating() {
        let store = Store::new_test().await.unwrap();
        let mut builder = FormBuilder::new();
        builder.title = "Intake".to_string();
        builder.add_field(FieldType::Text);

        let first = builder.save_form(&store).await.unwrap();
        builder.title = "Intake v2".to_string();
        let second = builder.save_form(&store).await.unwrap();

        assert_eq!(first, second);
        let forms = store.list_forms().await.unwrap();
        assert_eq!(forms.len(), 1);
        assert_eq!(forms[0].title, "Intake v2");
    }

    #[tokio::test]
    async fn save_and_assign_refuse_an_empty_form() {
        let store = Store::new_test().await.unwrap();
        let mut builder = FormBuilder::new();
        assert!(builder.save_form(&store).await.is_err());
        assert!(builder.assign_to_client(&store, "anyone").await.is_err());
    }

    #[tokio::test]
    async fn assigning_unsaved_form_allocates_an_independent_id() {
        let store = Store::new_test().await.unwrap();
        store.add_client("c1", "Alex", None).await.unwrap();

        let mut builder = FormBuilder::new();
        builder.add_field(FieldType::Text);

        let assigned_id = builder.assign_to_client(&store, "c1").await.unwrap();
        let saved_id = builder.save_form(&store).await.unwrap();
        assert_ne!(assigned_id, saved_id);

        // once saved, assignment reuses the editing id
        let reassigned_id = builder.assign_to_client(&store, "c1").await.unwrap();
        assert_eq!(reassigned_id, saved_id);
    }

    #[tokio::test]
    async fn assignment_overwrites_the_slot() {
        let store = Store::new_test().await.unwrap();
        store.add_client("c1", "Alex", None).await.unwrap();

        let mut first = FormBuilder::new();
        first.title = "First".to_string();
        first.add_field(FieldType::Text);
        first.assign_to_client(&store, "c1").await.unwrap();

        let mut second = FormBuilder::new();
        second.title = "Second".to_string();
        second.add_field(FieldType::Text);
        second.assign_to_client(&store, "c1").await.unwrap();

        let client = store.get_client("c1").await.unwrap().unwrap();
        assert_eq!(client.assigned_form.unwrap().title, "Second");
    }

    #[tokio::test]
    async fn load_form_replaces_state_and_clears_cursors() {
        let store = Store::new_test().await.unwrap();
        let mut builder = FormBuilder::new();
        builder.title = "Stored".to_string();
        builder.add_field(FieldType::Text);
        let form_id = builder.save_form(&store).await.unwrap();

        let mut other = FormBuilder::new();
        other.add_field(FieldType::Email);
        other.load_form(&store, &form_id).await.unwrap();
        assert_eq!(other.title, "Stored");
        assert_eq!(other.editing_form_id.as_deref(), Some(form_id.as_str()));
        assert_eq!(other.selected_id, None);
        assert_eq!(other.fields.len(), 1);
        assert_eq!(other.fields[0].field_type, FieldType::Text);
    }
}
