//! Interactive builder session.
//!
//! A dialoguer menu loop over [`FormBuilder`]: add fields from the palette,
//! edit the selected field's properties, reorder, remove, aim the insertion
//! target at a row column, preview, save and assign. Preview mode hides
//! every structural mutation action and only renders.

use anyhow::Result;
use colored::Colorize;
use dialoguer::{Confirm, Input, Select};

use crate::engine::FormBuilder;
use crate::engine::model::{FieldPatch, FieldType, FormField};
use crate::engine::tree::{self, MoveDirection};
use crate::store::Store;

use super::forms::print_fields;

pub async fn build_command(store: &Store, form: Option<String>) -> Result<()> {
    let mut builder = FormBuilder::new();
    match form {
        Some(form_id) => builder.load_form(store, &form_id).await?,
        None => {
            builder.title = Input::<String>::new()
                .with_prompt("Form title")
                .default(builder.title.clone())
                .interact_text()?;
        }
    }

    loop {
        println!();
        render(&builder);

        if builder.preview_mode {
            let choice = Select::new()
                .with_prompt("Preview")
                .items(&["Back to editor", "Quit"])
                .default(0)
                .interact()?;
            match choice {
                0 => builder.toggle_preview(),
                _ => break,
            }
            continue;
        }

        let actions = [
            "Add field",
            "Select field",
            "Edit selected field",
            "Move field",
            "Remove field",
            "Set insertion target",
            "Preview",
            "Rename form",
            "Save",
            "Assign to client",
            "Quit",
        ];
        let choice = Select::new()
            .with_prompt("Action")
            .items(&actions)
            .default(0)
            .interact()?;
        match choice {
            0 => add_field(&mut builder)?,
            1 => {
                if let Some(id) = pick_field(&builder, "Select field", |_| true)? {
                    builder.select_field(id);
                }
            }
            2 => edit_selected(&mut builder)?,
            3 => move_field(&mut builder)?,
            4 => {
                if let Some(id) = pick_field(&builder, "Remove which field?", |_| true)? {
                    builder.remove_field(&id);
                }
            }
            5 => set_insertion_target(&mut builder)?,
            6 => builder.toggle_preview(),
            7 => {
                builder.title = Input::<String>::new()
                    .with_prompt("Form title")
                    .default(builder.title.clone())
                    .interact_text()?;
            }
            8 => match builder.save_form(store).await {
                Ok(id) => println!("{} ({})", "Saved.".green(), id.dimmed()),
                Err(err) => println!("{} {err:#}", "Not saved:".red()),
            },
            9 => assign(&builder, store).await?,
            _ => {
                if builder.editing_form_id.is_some()
                    || builder.fields.is_empty()
                    || Confirm::new()
                        .with_prompt("Quit without saving?")
                        .default(false)
                        .interact()?
                {
                    break;
                }
            }
        }
    }
    Ok(())
}

fn render(builder: &FormBuilder) {
    println!("{}", builder.title.bold());
    if builder.fields.is_empty() {
        println!("{}", "(empty — add fields from the palette)".dimmed());
    } else {
        print_fields(&builder.fields, 0);
    }
    if builder.preview_mode {
        return;
    }
    if let Some(field) = builder.selected_field() {
        println!(
            "{} {} {}",
            "selected:".dimmed(),
            field.field_type.as_str().cyan(),
            field.label
        );
    }
    if let Some(target) = &builder.insertion_target {
        println!(
            "{} row {} column {}",
            "next field lands in:".dimmed(),
            target.parent_row_id.dimmed(),
            target.column_index + 1
        );
    }
}

fn add_field(builder: &mut FormBuilder) -> Result<()> {
    let names: Vec<&str> = FieldType::ALL.iter().map(|t| t.display_name()).collect();
    let choice = Select::new()
        .with_prompt("Field type")
        .items(&names)
        .default(0)
        .interact()?;
    let id = builder.add_field(FieldType::ALL[choice]);
    println!("{} {}", "Added".green(), id.dimmed());
    Ok(())
}

/// Flattened pick list over the whole forest. Returns the chosen field id,
/// or `None` when the forest has no matching fields.
fn pick_field(
    builder: &FormBuilder,
    prompt: &str,
    filter: impl Fn(&FormField) -> bool,
) -> Result<Option<String>> {
    let candidates: Vec<&FormField> = tree::flatten(&builder.fields)
        .into_iter()
        .filter(|field| filter(field))
        .collect();
    if candidates.is_empty() {
        println!("{}", "Nothing to pick from.".dimmed());
        return Ok(None);
    }
    let items: Vec<String> = candidates
        .iter()
        .map(|field| {
            let name = if field.label.is_empty() {
                field.id.as_str()
            } else {
                field.label.as_str()
            };
            format!("{} {}", field.field_type, name)
        })
        .collect();
    let choice = Select::new()
        .with_prompt(prompt)
        .items(&items)
        .default(0)
        .interact()?;
    Ok(Some(candidates[choice].id.clone()))
}

fn edit_selected(builder: &mut FormBuilder) -> Result<()> {
    if builder.selected_field().is_none() {
        if let Some(id) = pick_field(builder, "Edit which field?", |_| true)? {
            builder.select_field(id);
        } else {
            return Ok(());
        }
    }
    let Some(field) = builder.selected_field().cloned() else {
        return Ok(());
    };

    let mut patch = FieldPatch::default();

    if field.field_type.is_container() {
        let count: String = Input::new()
            .with_prompt("Column count (1-6)")
            .default(field.columns.len().to_string())
            .interact_text()?;
        let count = count.parse::<usize>().unwrap_or(1).clamp(1, 6);
        if count < field.columns.len()
            && field.columns[count..].iter().any(|column| !column.is_empty())
            && !Confirm::new()
                .with_prompt("Removed columns still contain fields; discard them?")
                .default(false)
                .interact()?
        {
            return Ok(());
        }
        patch.column_count = Some(count);
        builder.update_field(&field.id, &patch);
        return Ok(());
    }

    if field.field_type.collects_answer() {
        patch.label = Some(
            Input::new()
                .with_prompt("Label")
                .default(field.label.clone())
                .interact_text()?,
        );
        patch.db_name = Some(
            Input::new()
                .with_prompt("DB name (answer key, empty for none)")
                .default(field.db_name.clone().unwrap_or_default())
                .allow_empty(true)
                .interact_text()?,
        );
        patch.placeholder = Some(
            Input::new()
                .with_prompt("Placeholder (empty for none)")
                .default(field.placeholder.clone().unwrap_or_default())
                .allow_empty(true)
                .interact_text()?,
        );
        patch.required = Some(
            Confirm::new()
                .with_prompt("Required?")
                .default(field.required)
                .interact()?,
        );
    }

    if field.field_type == FieldType::Textarea {
        let rows: String = Input::new()
            .with_prompt("Rows (3-10)")
            .default(field.rows_count.unwrap_or(3).to_string())
            .interact_text()?;
        patch.rows_count = Some(rows.parse::<u16>().unwrap_or(3).clamp(3, 10));
    }

    if field.field_type.has_options() {
        patch.options = Some(edit_options(field.options.clone())?);
    }

    if field.field_type == FieldType::Html {
        patch.html_content = Some(
            Input::new()
                .with_prompt("HTML content")
                .default(field.html_content.clone().unwrap_or_default())
                .allow_empty(true)
                .interact_text()?,
        );
    }

    builder.update_field(&field.id, &patch);
    Ok(())
}

fn edit_options(mut options: Vec<String>) -> Result<Vec<String>> {
    loop {
        for (index, option) in options.iter().enumerate() {
            println!("  {}. {option}", index + 1);
        }
        let choice = Select::new()
            .with_prompt("Options")
            .items(&["Add option", "Edit option", "Remove option", "Done"])
            .default(3)
            .interact()?;
        match choice {
            0 => {
                options.push(
                    Input::new()
                        .with_prompt("New option")
                        .default(format!("Option {}", options.len() + 1))
                        .interact_text()?,
                );
            }
            1 => {
                let index = Select::new()
                    .with_prompt("Which option?")
                    .items(&options)
                    .default(0)
                    .interact()?;
                options[index] = Input::new()
                    .with_prompt("Option text")
                    .default(options[index].clone())
                    .interact_text()?;
            }
            2 => {
                // a choice field keeps at least one option
                if options.len() <= 1 {
                    println!("{}", "A choice field needs at least one option.".yellow());
                    continue;
                }
                let index = Select::new()
                    .with_prompt("Remove which option?")
                    .items(&options)
                    .default(0)
                    .interact()?;
                options.remove(index);
            }
            _ => return Ok(options),
        }
    }
}

fn move_field(builder: &mut FormBuilder) -> Result<()> {
    let Some(id) = pick_field(builder, "Move which field?", |_| true)? else {
        return Ok(());
    };
    let direction = match Select::new()
        .with_prompt("Direction")
        .items(&["Up", "Down"])
        .default(0)
        .interact()?
    {
        0 => MoveDirection::Up,
        _ => MoveDirection::Down,
    };
    builder.move_field(&id, direction);
    Ok(())
}

fn set_insertion_target(builder: &mut FormBuilder) -> Result<()> {
    let rows: Vec<(String, usize)> = tree::flatten(&builder.fields)
        .into_iter()
        .filter(|field| field.field_type.is_container())
        .map(|field| (field.id.clone(), field.columns.len()))
        .collect();
    if rows.is_empty() {
        println!("{}", "Add a row container first.".dimmed());
        return Ok(());
    }

    let mut items: Vec<String> = rows
        .iter()
        .map(|(id, columns)| format!("row {id} ({columns} columns)"))
        .collect();
    items.push("(root — clear target)".to_string());
    let choice = Select::new()
        .with_prompt("Where should the next field land?")
        .items(&items)
        .default(0)
        .interact()?;
    if choice == rows.len() {
        builder.clear_insertion_target();
        return Ok(());
    }

    let (row_id, column_count) = rows[choice].clone();
    let columns: Vec<String> = (1..=column_count).map(|n| format!("Column {n}")).collect();
    let column_index = Select::new()
        .with_prompt("Which column?")
        .items(&columns)
        .default(0)
        .interact()?;
    builder.set_insertion_target(row_id, column_index);
    Ok(())
}

async fn assign(builder: &FormBuilder, store: &Store) -> Result<()> {
    let clients = store.list_clients().await?;
    if clients.is_empty() {
        println!("{}", "No clients registered; add one first.".yellow());
        return Ok(());
    }
    let items: Vec<String> = clients
        .iter()
        .map(|client| match &client.email {
            Some(email) => format!("{} <{email}>", client.name),
            None => client.name.clone(),
        })
        .collect();
    let choice = Select::new()
        .with_prompt("Assign to which client?")
        .items(&items)
        .default(0)
        .interact()?;
    match builder.assign_to_client(store, &clients[choice].id).await {
        Ok(form_id) => println!(
            "{} '{}' {} {} ({})",
            "Assigned".green(),
            builder.title,
            "to".green(),
            clients[choice].name,
            form_id.dimmed()
        ),
        Err(err) => println!("{} {err:#}", "Not assigned:".red()),
    }
    Ok(())
}
