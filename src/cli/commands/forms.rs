//! Saved form management commands

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use colored::Colorize;

use crate::engine::model::FormField;
use crate::store::Store;

#[derive(Args)]
pub struct FormCommands {
    #[command(subcommand)]
    pub command: FormSubcommands,
}

#[derive(Subcommand)]
pub enum FormSubcommands {
    /// List saved forms
    List,
    /// Print a saved form's field tree
    Show { form_id: String },
    /// Delete a saved form
    Delete { form_id: String },
    /// Open the interactive builder, optionally on an existing form
    Build {
        /// Id of a saved form to edit instead of starting fresh
        #[arg(long)]
        form: Option<String>,
    },
}

pub async fn form_command(store: &Store, args: FormCommands) -> Result<()> {
    match args.command {
        FormSubcommands::List => list_forms(store).await,
        FormSubcommands::Show { form_id } => show_form(store, &form_id).await,
        FormSubcommands::Delete { form_id } => delete_form(store, &form_id).await,
        FormSubcommands::Build { form } => super::build_command(store, form).await,
    }
}

async fn list_forms(store: &Store) -> Result<()> {
    let forms = store.list_forms().await?;
    if forms.is_empty() {
        println!("{}", "No saved forms.".dimmed());
        return Ok(());
    }
    for form in forms {
        println!(
            "{}  {}  {}",
            form.id.dimmed(),
            form.title.bold(),
            form.updated_at
                .format("updated %Y-%m-%d %H:%M")
                .to_string()
                .dimmed()
        );
    }
    Ok(())
}

async fn show_form(store: &Store, form_id: &str) -> Result<()> {
    let Some(schema) = store.get_form(form_id).await? else {
        bail!("no saved form with id '{form_id}'");
    };
    println!("{}", schema.title.bold());
    if schema.fields.is_empty() {
        println!("{}", "(no fields)".dimmed());
    }
    print_fields(&schema.fields, 0);
    Ok(())
}

async fn delete_form(store: &Store, form_id: &str) -> Result<()> {
    if store.get_form(form_id).await?.is_none() {
        bail!("no saved form with id '{form_id}'");
    }
    store.delete_form(form_id).await?;
    println!("{} {}", "Deleted form".green(), form_id);
    Ok(())
}

/// Indented tree rendering of a field forest, descending into row columns.
pub fn print_fields(fields: &[FormField], depth: usize) {
    let indent = "  ".repeat(depth);
    for field in fields {
        if field.field_type.is_container() {
            println!(
                "{indent}{} {}",
                "row".cyan(),
                format!("({} columns)", field.columns.len()).dimmed()
            );
            for (index, column) in field.columns.iter().enumerate() {
                println!("{indent}  {}", format!("column {}", index + 1).dimmed());
                print_fields(column, depth + 2);
            }
            continue;
        }

        let marker = if field.required { " *".red().to_string() } else { String::new() };
        let name = if field.label.is_empty() {
            field.id.dimmed().to_string()
        } else {
            field.label.clone()
        };
        println!(
            "{indent}{} {}{}",
            field.field_type.as_str().cyan(),
            name,
            marker
        );
    }
}
