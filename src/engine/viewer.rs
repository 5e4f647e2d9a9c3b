//! Answer collection and submission for an assigned form.
//!
//! The viewer holds in-session answers keyed by field id. Submission
//! validates required leaves, remaps ids to user-facing keys (dbName, else
//! label, else the raw id) and hands the finished [`FormResponse`] to the
//! store. The persistence handoff is fire-and-forget: a store failure is
//! logged, never shown to the respondent, and in-memory state is not rolled
//! back.

use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use super::model::{AnswerValue, FormResponse, FormSchema};
use super::tree;
use crate::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerPhase {
    Filling,
    Submitted,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Validation passed; the response was built and handed to the store,
    /// the client's assigned-form slot cleared.
    Submitted(FormResponse),
    /// Labels of required fields with no recorded answer. Nothing was
    /// persisted and the entered answers are kept for correction.
    MissingRequired(Vec<String>),
    /// The viewer already submitted; there is nothing left to resubmit.
    AlreadySubmitted,
}

pub struct FormViewer {
    schema: FormSchema,
    client_id: String,
    answers: HashMap<String, AnswerValue>,
    phase: ViewerPhase,
}

impl FormViewer {
    pub fn new(schema: FormSchema, client_id: impl Into<String>) -> Self {
        Self {
            schema,
            client_id: client_id.into(),
            answers: HashMap::new(),
            phase: ViewerPhase::Filling,
        }
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn phase(&self) -> ViewerPhase {
        self.phase
    }

    pub fn answer(&self, field_id: &str) -> Option<&AnswerValue> {
        self.answers.get(field_id)
    }

    /// Record an answer for a field. An empty value clears the entry, so
    /// "typed and then erased" counts as unanswered.
    pub fn set_answer(&mut self, field_id: impl Into<String>, value: AnswerValue) {
        let field_id = field_id.into();
        if value.is_empty() {
            self.answers.remove(&field_id);
        } else {
            self.answers.insert(field_id, value);
        }
    }

    pub fn clear_answer(&mut self, field_id: &str) {
        self.answers.remove(field_id);
    }

    /// Toggle one option in a checkbox/multiselect answer, preserving the
    /// order options were switched on in.
    pub fn toggle_option(&mut self, field_id: &str, option: &str) {
        let entry = self
            .answers
            .entry(field_id.to_string())
            .or_insert_with(|| AnswerValue::Many(Vec::new()));
        let AnswerValue::Many(selected) = entry else {
            // a stray scalar under a multi-value field starts a fresh selection
            *entry = AnswerValue::Many(vec![option.to_string()]);
            return;
        };
        if let Some(position) = selected.iter().position(|o| o == option) {
            selected.remove(position);
        } else {
            selected.push(option.to_string());
        }
        if selected.is_empty() {
            self.answers.remove(field_id);
        }
    }

    /// Labels of required answer-collecting fields that have no answer yet.
    /// Requiredness is a leaf concept: rows, sections and HTML blocks are
    /// never reported even if their flag is set.
    pub fn missing_required(&self) -> Vec<String> {
        tree::flatten(&self.schema.fields)
            .into_iter()
            .filter(|field| field.required && field.field_type.collects_answer())
            .filter(|field| {
                self.answers
                    .get(&field.id)
                    .is_none_or(|value| value.is_empty())
            })
            .map(|field| field.label.clone())
            .collect()
    }

    /// Validate, remap and persist. On success the client's assigned-form
    /// slot is cleared and the viewer becomes terminal; re-submission then
    /// short-circuits. Answers whose field no longer exists in the schema
    /// are dropped; colliding resolved keys are last-in-traversal-wins.
    pub async fn submit(&mut self, store: &Store) -> SubmitOutcome {
        if self.phase == ViewerPhase::Submitted {
            return SubmitOutcome::AlreadySubmitted;
        }

        let missing = self.missing_required();
        if !missing.is_empty() {
            return SubmitOutcome::MissingRequired(missing);
        }

        let mut answers = HashMap::new();
        for field in tree::flatten(&self.schema.fields) {
            let Some(value) = self.answers.get(&field.id) else {
                continue;
            };
            let key = field
                .db_name
                .as_deref()
                .filter(|name| !name.is_empty())
                .unwrap_or(if field.label.is_empty() {
                    field.id.as_str()
                } else {
                    field.label.as_str()
                });
            answers.insert(key.to_string(), value.clone());
        }

        let response = FormResponse {
            id: Uuid::new_v4().to_string(),
            form_id: self.schema.id.clone(),
            date: Utc::now(),
            answers,
        };

        if let Err(err) = store.append_response(&self.client_id, &response).await {
            log::warn!(
                "failed to persist response for client {}: {err:#}",
                self.client_id
            );
        }
        if let Err(err) = store.clear_assignment(&self.client_id).await {
            log::warn!(
                "failed to clear assigned form for client {}: {err:#}",
                self.client_id
            );
        }

        self.phase = ViewerPhase::Submitted;
        SubmitOutcome::Submitted(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::model::{FieldType, FormField};

    fn text_field(id: &str, label: &str, db_name: Option<&str>, required: bool) -> FormField {
        let mut field = FormField::new(FieldType::Text);
        field.id = id.to_string();
        field.label = label.to_string();
        field.db_name = db_name.map(str::to_string);
        field.required = required;
        field
    }

    async fn store_with_client() -> Store {
        let store = Store::new_test().await.unwrap();
        store.add_client("c1", "Alex", None).await.unwrap();
        store
    }

    #[tokio::test]
    async fn missing_required_blocks_submission_and_keeps_the_slot() {
        let store = store_with_client().await;
        let schema = FormSchema::new(
            "f1",
            "Intake",
            vec![text_field("name", "Name", Some("name"), true)],
        );
        store.assign_form("c1", &schema).await.unwrap();

        let mut viewer = FormViewer::new(schema, "c1");
        let outcome = viewer.submit(&store).await;
        assert_eq!(
            outcome,
            SubmitOutcome::MissingRequired(vec!["Name".to_string()])
        );
        assert_eq!(viewer.phase(), ViewerPhase::Filling);

        let client = store.get_client("c1").await.unwrap().unwrap();
        assert!(client.assigned_form.is_some(), "slot must stay occupied");
        assert!(store.list_responses("c1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn submit_remaps_to_db_name_and_clears_the_slot() {
        let store = store_with_client().await;
        let schema = FormSchema::new(
            "f1",
            "Intake",
            vec![text_field("f1-name", "Name", Some("name"), true)],
        );
        store.assign_form("c1", &schema).await.unwrap();

        let mut viewer = FormViewer::new(schema, "c1");
        viewer.set_answer("f1-name", "Alex".into());

        let SubmitOutcome::Submitted(response) = viewer.submit(&store).await else {
            panic!("expected submission to go through");
        };
        assert_eq!(
            response.answers.get("name"),
            Some(&AnswerValue::Text("Alex".to_string()))
        );
        assert_eq!(response.form_id, "f1");

        let client = store.get_client("c1").await.unwrap().unwrap();
        assert!(client.assigned_form.is_none());
        let history = store.list_responses("c1").await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].answers, response.answers);

        assert_eq!(viewer.submit(&store).await, SubmitOutcome::AlreadySubmitted);
    }

    #[tokio::test]
    async fn key_fallback_runs_db_name_label_then_id() {
        let store = store_with_client().await;
        let mut unnamed = text_field("raw-id", "", None, false);
        unnamed.label = String::new();
        let schema = FormSchema::new(
            "f1",
            "Intake",
            vec![
                text_field("a", "Weight", Some("weight_kg"), false),
                text_field("b", "Height", None, false),
                unnamed,
            ],
        );
        let mut viewer = FormViewer::new(schema, "c1");
        viewer.set_answer("a", "80".into());
        viewer.set_answer("b", "180".into());
        viewer.set_answer("raw-id", "x".into());

        let SubmitOutcome::Submitted(response) = viewer.submit(&store).await else {
            panic!("expected submission to go through");
        };
        assert!(response.answers.contains_key("weight_kg"));
        assert!(response.answers.contains_key("Height"));
        assert!(response.answers.contains_key("raw-id"));
    }

    #[tokio::test]
    async fn colliding_keys_collapse_to_the_later_field() {
        let store = store_with_client().await;
        let schema = FormSchema::new(
            "f1",
            "Intake",
            vec![
                text_field("a", "first", Some("w"), false),
                text_field("b", "w", None, false),
            ],
        );
        let mut viewer = FormViewer::new(schema, "c1");
        viewer.set_answer("a", "1".into());
        viewer.set_answer("b", "2".into());

        let SubmitOutcome::Submitted(response) = viewer.submit(&store).await else {
            panic!("expected submission to go through");
        };
        assert_eq!(response.answers.len(), 1);
        assert_eq!(
            response.answers.get("w"),
            Some(&AnswerValue::Text("2".to_string()))
        );
    }

    #[tokio::test]
    async fn checkbox_in_a_row_column_keeps_toggle_order() {
        let store = store_with_client().await;
        let mut checkbox = FormField::new(FieldType::Checkbox);
        checkbox.id = "cb".to_string();
        checkbox.label = "Goals".to_string();
        checkbox.options = vec!["A".to_string(), "B".to_string()];

        let mut row = FormField::new(FieldType::Row);
        row.id = "r".to_string();
        row.columns = vec![vec![checkbox], Vec::new()];

        let schema = FormSchema::new("f1", "Intake", vec![row]);
        let mut viewer = FormViewer::new(schema, "c1");
        viewer.toggle_option("cb", "A");
        viewer.toggle_option("cb", "B");

        let SubmitOutcome::Submitted(response) = viewer.submit(&store).await else {
            panic!("expected submission to go through");
        };
        assert_eq!(
            response.answers.get("Goals"),
            Some(&AnswerValue::Many(vec!["A".to_string(), "B".to_string()]))
        );
    }

    #[test]
    fn toggle_off_removes_the_entry() {
        let schema = FormSchema::new("f1", "Intake", Vec::new());
        let mut viewer = FormViewer::new(schema, "c1");
        viewer.toggle_option("cb", "A");
        viewer.toggle_option("cb", "A");
        assert_eq!(viewer.answer("cb"), None);
    }

    #[test]
    fn required_is_leaf_level_only() {
        let mut section = FormField::new(FieldType::Section);
        section.required = true;
        let mut row = FormField::new(FieldType::Row);
        row.required = true;
        let schema = FormSchema::new("f1", "Intake", vec![section, row]);
        let viewer = FormViewer::new(schema, "c1");
        assert!(viewer.missing_required().is_empty());
    }

    #[test]
    fn empty_answers_count_as_missing() {
        let schema = FormSchema::new(
            "f1",
            "Intake",
            vec![text_field("a", "Name", None, true)],
        );
        let mut viewer = FormViewer::new(schema, "c1");
        viewer.set_answer("a", "".into());
        assert_eq!(viewer.missing_required(), vec!["Name".to_string()]);
    }
}
