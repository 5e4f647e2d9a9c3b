//! Data model for form schemas and submitted responses.
//!
//! Serialization uses the camelCase attribute names of the documents already
//! stored by the platform (`htmlContent`, `dbName`, `rowsCount`, `formId`),
//! so schemas written by older sessions keep loading.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Closed enumeration of field variants. `Row` is the only container type;
/// every other variant is a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Email,
    Number,
    Password,
    Textarea,
    Dropdown,
    Checkbox,
    Radio,
    Multiselect,
    Date,
    File,
    Section,
    Html,
    Row,
}

impl FieldType {
    /// The full palette, in the order the builder offers it.
    pub const ALL: [FieldType; 14] = [
        FieldType::Row,
        FieldType::Text,
        FieldType::Email,
        FieldType::Number,
        FieldType::Password,
        FieldType::Textarea,
        FieldType::Dropdown,
        FieldType::Checkbox,
        FieldType::Radio,
        FieldType::Multiselect,
        FieldType::Date,
        FieldType::File,
        FieldType::Section,
        FieldType::Html,
    ];

    pub fn is_container(self) -> bool {
        matches!(self, FieldType::Row)
    }

    /// Field types whose input surface is driven by the `options` list.
    pub fn has_options(self) -> bool {
        matches!(
            self,
            FieldType::Dropdown | FieldType::Checkbox | FieldType::Radio | FieldType::Multiselect
        )
    }

    /// Whether the field contributes an entry to the answer map. Sections,
    /// raw HTML blocks and row containers are purely presentational, which
    /// also means `required` carries no meaning for them.
    pub fn collects_answer(self) -> bool {
        !matches!(self, FieldType::Section | FieldType::Html | FieldType::Row)
    }

    /// Field types whose answer is an ordered subset of `options` rather
    /// than a single scalar.
    pub fn is_multi_value(self) -> bool {
        matches!(self, FieldType::Checkbox | FieldType::Multiselect)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Email => "email",
            FieldType::Number => "number",
            FieldType::Password => "password",
            FieldType::Textarea => "textarea",
            FieldType::Dropdown => "dropdown",
            FieldType::Checkbox => "checkbox",
            FieldType::Radio => "radio",
            FieldType::Multiselect => "multiselect",
            FieldType::Date => "date",
            FieldType::File => "file",
            FieldType::Section => "section",
            FieldType::Html => "html",
            FieldType::Row => "row",
        }
    }

    /// Human-readable palette label.
    pub fn display_name(self) -> &'static str {
        match self {
            FieldType::Text => "Single Line Text",
            FieldType::Email => "Email",
            FieldType::Number => "Number",
            FieldType::Password => "Password",
            FieldType::Textarea => "Text Area",
            FieldType::Dropdown => "Dropdown",
            FieldType::Checkbox => "Checkbox",
            FieldType::Radio => "Radio Buttons",
            FieldType::Multiselect => "Multiple Select",
            FieldType::Date => "Date Picker",
            FieldType::File => "File Upload",
            FieldType::Section => "Section Break",
            FieldType::Html => "Custom HTML",
            FieldType::Row => "Row Container",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node in the schema tree.
///
/// Invariants: `id` is unique across the entire tree (answers are keyed by it
/// regardless of nesting depth), and only `Row` nodes carry a non-empty
/// `columns` vector, each column itself an ordered list of fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub id: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows_count: Option<u16>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<Vec<FormField>>,
}

impl FormField {
    /// Build a field with a fresh id and per-type defaults: two placeholder
    /// options for choice types, a starter snippet for HTML blocks, a single
    /// empty column for rows.
    pub fn new(field_type: FieldType) -> Self {
        let label = if field_type.collects_answer() {
            format!("New {field_type} field")
        } else {
            String::new()
        };

        Self {
            id: Uuid::new_v4().to_string(),
            field_type,
            label,
            placeholder: None,
            required: false,
            options: if field_type.has_options() {
                vec!["Option 1".to_string(), "Option 2".to_string()]
            } else {
                Vec::new()
            },
            html_content: (field_type == FieldType::Html)
                .then(|| "<p>Custom HTML content</p>".to_string()),
            db_name: None,
            rows_count: (field_type == FieldType::Textarea).then_some(3),
            columns: if field_type.is_container() {
                vec![Vec::new()]
            } else {
                Vec::new()
            },
        }
    }

    /// Merge a partial update into this node.
    pub fn apply(&mut self, patch: &FieldPatch) {
        if let Some(label) = &patch.label {
            self.label = label.clone();
        }
        if let Some(placeholder) = &patch.placeholder {
            self.placeholder = if placeholder.is_empty() {
                None
            } else {
                Some(placeholder.clone())
            };
        }
        if let Some(required) = patch.required {
            self.required = required;
        }
        if let Some(options) = &patch.options {
            self.options = options.clone();
        }
        if let Some(html_content) = &patch.html_content {
            self.html_content = Some(html_content.clone());
        }
        if let Some(db_name) = &patch.db_name {
            self.db_name = if db_name.is_empty() {
                None
            } else {
                Some(db_name.clone())
            };
        }
        if let Some(rows_count) = patch.rows_count {
            self.rows_count = Some(rows_count);
        }
        if let Some(count) = patch.column_count {
            self.resize_columns(count);
        }
    }

    /// Grow or shrink a row's column list. Growing appends empty columns;
    /// shrinking truncates and discards the contents of the removed columns.
    /// A row always keeps at least one column. No-op for non-row fields.
    pub fn resize_columns(&mut self, count: usize) {
        if !self.field_type.is_container() {
            return;
        }
        let count = count.max(1);
        if count < self.columns.len() {
            self.columns.truncate(count);
        } else {
            while self.columns.len() < count {
                self.columns.push(Vec::new());
            }
        }
    }
}

/// Partial update for a single field; `None` leaves the attribute untouched.
/// Setting `placeholder` or `db_name` to an empty string clears them.
#[derive(Debug, Clone, Default)]
pub struct FieldPatch {
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub required: Option<bool>,
    pub options: Option<Vec<String>>,
    pub html_content: Option<String>,
    pub db_name: Option<String>,
    pub rows_count: Option<u16>,
    pub column_count: Option<usize>,
}

/// A submitted value: a scalar for text-like/date/file/dropdown/radio
/// fields, an ordered subset of options for checkbox/multiselect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Text(String),
    Many(Vec<String>),
}

impl AnswerValue {
    pub fn is_empty(&self) -> bool {
        match self {
            AnswerValue::Text(value) => value.is_empty(),
            AnswerValue::Many(values) => values.is_empty(),
        }
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        AnswerValue::Text(value)
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        AnswerValue::Text(value.to_string())
    }
}

impl From<Vec<String>> for AnswerValue {
    fn from(values: Vec<String>) -> Self {
        AnswerValue::Many(values)
    }
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerValue::Text(value) => f.write_str(value),
            AnswerValue::Many(values) => f.write_str(&values.join(", ")),
        }
    }
}

/// A named form definition: the top-level forest has no implicit root row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
    pub id: String,
    pub title: String,
    pub fields: Vec<FormField>,
}

impl FormSchema {
    pub fn new(id: impl Into<String>, title: impl Into<String>, fields: Vec<FormField>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            fields,
        }
    }
}

/// One submission of an assigned form, appended to the client's history.
/// `answers` is keyed by the resolved name (dbName, else label, else raw
/// field id), not by field id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormResponse {
    pub id: String,
    pub form_id: String,
    pub date: DateTime<Utc>,
    pub answers: HashMap<String, AnswerValue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_per_type() {
        let text = FormField::new(FieldType::Text);
        assert_eq!(text.label, "New text field");
        assert!(text.options.is_empty());
        assert!(text.columns.is_empty());
        assert_eq!(text.rows_count, None);

        let dropdown = FormField::new(FieldType::Dropdown);
        assert_eq!(dropdown.options, vec!["Option 1", "Option 2"]);

        let textarea = FormField::new(FieldType::Textarea);
        assert_eq!(textarea.rows_count, Some(3));

        let html = FormField::new(FieldType::Html);
        assert!(html.html_content.is_some());

        let row = FormField::new(FieldType::Row);
        assert_eq!(row.columns.len(), 1);
        assert!(row.label.is_empty());
    }

    #[test]
    fn resize_columns_grows_and_discards_on_shrink() {
        let mut row = FormField::new(FieldType::Row);
        row.columns[0].push(FormField::new(FieldType::Text));

        row.resize_columns(3);
        assert_eq!(row.columns.len(), 3);
        assert_eq!(row.columns[0].len(), 1);
        assert!(row.columns[1].is_empty() && row.columns[2].is_empty());

        row.columns[2].push(FormField::new(FieldType::Email));
        row.resize_columns(1);
        assert_eq!(row.columns.len(), 1);
        // first column survives intact, the email field is gone with its column
        assert_eq!(row.columns[0].len(), 1);

        // rows never drop below one column
        row.resize_columns(0);
        assert_eq!(row.columns.len(), 1);
    }

    #[test]
    fn resize_columns_ignores_leaf_fields() {
        let mut text = FormField::new(FieldType::Text);
        text.resize_columns(4);
        assert!(text.columns.is_empty());
    }

    #[test]
    fn patch_clears_optional_attributes_on_empty_string() {
        let mut field = FormField::new(FieldType::Text);
        field.apply(&FieldPatch {
            db_name: Some("weight".to_string()),
            placeholder: Some("kg".to_string()),
            required: Some(true),
            ..Default::default()
        });
        assert_eq!(field.db_name.as_deref(), Some("weight"));
        assert_eq!(field.placeholder.as_deref(), Some("kg"));
        assert!(field.required);

        field.apply(&FieldPatch {
            db_name: Some(String::new()),
            placeholder: Some(String::new()),
            ..Default::default()
        });
        assert_eq!(field.db_name, None);
        assert_eq!(field.placeholder, None);
    }

    #[test]
    fn schema_serializes_with_stored_attribute_names() {
        let mut field = FormField::new(FieldType::Textarea);
        field.db_name = Some("notes".to_string());
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["type"], "textarea");
        assert_eq!(json["dbName"], "notes");
        assert_eq!(json["rowsCount"], 3);
        assert!(json.get("columns").is_none());
    }

    #[test]
    fn answer_value_accepts_both_shapes() {
        let scalar: AnswerValue = serde_json::from_str("\"Alex\"").unwrap();
        assert_eq!(scalar, AnswerValue::Text("Alex".to_string()));

        let many: AnswerValue = serde_json::from_str("[\"A\",\"B\"]").unwrap();
        assert_eq!(
            many,
            AnswerValue::Many(vec!["A".to_string(), "B".to_string()])
        );
    }
}
