//! Interactive viewer session for a client's assigned form.
//!
//! Walks the schema top to bottom, row columns rendered as consecutive
//! stacks, one prompt per answer-collecting field. Validation failures
//! re-prompt the whole form with the previous answers seeded.

use anyhow::{Result, bail};
use colored::Colorize;
use dialoguer::{Confirm, Input, MultiSelect, Password, Select};

use crate::engine::model::{AnswerValue, FieldType, FormField};
use crate::engine::viewer::{FormViewer, SubmitOutcome};
use crate::store::Store;

pub async fn respond_command(store: &Store, client_id: &str) -> Result<()> {
    let Some(client) = store.get_client(client_id).await? else {
        bail!("no client with id '{client_id}'");
    };
    let Some(schema) = client.assigned_form else {
        println!("{}", "No form is currently assigned to this client.".yellow());
        return Ok(());
    };

    println!("{}", schema.title.bold());
    let mut viewer = FormViewer::new(schema, client_id);

    loop {
        let fields = viewer.schema().fields.clone();
        for field in &fields {
            prompt_field(&mut viewer, field)?;
        }

        match viewer.submit(store).await {
            SubmitOutcome::Submitted(response) => {
                println!(
                    "{} {} answers recorded.",
                    "Form submitted.".green().bold(),
                    response.answers.len()
                );
                return Ok(());
            }
            SubmitOutcome::MissingRequired(labels) => {
                println!(
                    "{} {}",
                    "Missing required fields:".red(),
                    labels.join(", ")
                );
                if !Confirm::new()
                    .with_prompt("Go through the form again?")
                    .default(true)
                    .interact()?
                {
                    return Ok(());
                }
            }
            SubmitOutcome::AlreadySubmitted => return Ok(()),
        }
    }
}

fn prompt_field(viewer: &mut FormViewer, field: &FormField) -> Result<()> {
    match field.field_type {
        FieldType::Row => {
            for (index, column) in field.columns.iter().enumerate() {
                if field.columns.len() > 1 {
                    println!("{}", format!("— column {} —", index + 1).dimmed());
                }
                for nested in column {
                    prompt_field(viewer, nested)?;
                }
            }
        }
        FieldType::Section => {
            println!("{}", "─".repeat(32).dimmed());
        }
        FieldType::Html => {
            // schema authors are trusted; content is printed verbatim
            if let Some(content) = &field.html_content {
                println!("{content}");
            }
        }
        FieldType::Password => {
            let value = Password::new()
                .with_prompt(prompt_label(field))
                .allow_empty_password(true)
                .interact()?;
            viewer.set_answer(&field.id, value.into());
        }
        FieldType::Dropdown | FieldType::Radio => {
            if field.options.is_empty() {
                return Ok(());
            }
            let mut items: Vec<&str> = field.options.iter().map(String::as_str).collect();
            if !field.required {
                items.push("(skip)");
            }
            let default = match viewer.answer(&field.id) {
                Some(AnswerValue::Text(value)) => field
                    .options
                    .iter()
                    .position(|option| option == value)
                    .unwrap_or(0),
                _ => 0,
            };
            let choice = Select::new()
                .with_prompt(prompt_label(field))
                .items(&items)
                .default(default)
                .interact()?;
            if choice < field.options.len() {
                viewer.set_answer(&field.id, field.options[choice].as_str().into());
            } else {
                viewer.clear_answer(&field.id);
            }
        }
        FieldType::Checkbox | FieldType::Multiselect => {
            if field.options.is_empty() {
                return Ok(());
            }
            let defaults: Vec<bool> = field
                .options
                .iter()
                .map(|option| {
                    matches!(
                        viewer.answer(&field.id),
                        Some(AnswerValue::Many(selected)) if selected.contains(option)
                    )
                })
                .collect();
            let picked = MultiSelect::new()
                .with_prompt(prompt_label(field))
                .items(&field.options)
                .defaults(&defaults)
                .interact()?;
            let values: Vec<String> = picked
                .into_iter()
                .map(|index| field.options[index].clone())
                .collect();
            viewer.set_answer(&field.id, values.into());
        }
        // text-like: text, email, number, date, file, textarea
        _ => {
            let mut input = Input::<String>::new()
                .with_prompt(prompt_label(field))
                .allow_empty(true);
            if let Some(AnswerValue::Text(existing)) = viewer.answer(&field.id) {
                input = input.with_initial_text(existing.clone());
            }
            if field.field_type == FieldType::Number {
                input = input.validate_with(|text: &String| -> Result<(), &str> {
                    if text.is_empty() || text.parse::<f64>().is_ok() {
                        Ok(())
                    } else {
                        Err("enter a number")
                    }
                });
            }
            let value = input.interact_text()?;
            viewer.set_answer(&field.id, value.into());
        }
    }
    Ok(())
}

fn prompt_label(field: &FormField) -> String {
    let mut label = if field.label.is_empty() {
        field.id.clone()
    } else {
        field.label.clone()
    };
    if field.required {
        label.push_str(" *");
    }
    match &field.placeholder {
        Some(placeholder) if !placeholder.is_empty() => format!("{label} ({placeholder})"),
        _ if field.field_type == FieldType::Date => format!("{label} (YYYY-MM-DD)"),
        _ => label,
    }
}
