//! Client roster, assignment and response history commands

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use colored::Colorize;
use uuid::Uuid;

use crate::store::Store;

#[derive(Args)]
pub struct ClientCommands {
    #[command(subcommand)]
    pub command: ClientSubcommands,
}

#[derive(Subcommand)]
pub enum ClientSubcommands {
    /// Register a client
    Add {
        name: String,
        #[arg(long)]
        email: Option<String>,
        /// Explicit client id (defaults to a fresh UUID)
        #[arg(long)]
        id: Option<String>,
    },
    /// List clients and their assigned forms
    List,
}

pub async fn client_command(store: &Store, args: ClientCommands) -> Result<()> {
    match args.command {
        ClientSubcommands::Add { name, email, id } => {
            let id = id.unwrap_or_else(|| Uuid::new_v4().to_string());
            store.add_client(&id, &name, email.as_deref()).await?;
            println!("{} {} ({})", "Added client".green(), name.bold(), id.dimmed());
        }
        ClientSubcommands::List => {
            let clients = store.list_clients().await?;
            if clients.is_empty() {
                println!("{}", "No clients registered.".dimmed());
                return Ok(());
            }
            for client in clients {
                let assigned = match &client.assigned_form {
                    Some(form) => format!("assigned: {}", form.title).yellow().to_string(),
                    None => "no assigned form".dimmed().to_string(),
                };
                println!(
                    "{}  {}  {}",
                    client.id.dimmed(),
                    client.name.bold(),
                    assigned
                );
            }
        }
    }
    Ok(())
}

/// Non-interactive assignment of a saved form to a client. Overwrites any
/// prior assignment.
pub async fn assign_command(store: &Store, form_id: &str, client_id: &str) -> Result<()> {
    let Some(schema) = store.get_form(form_id).await? else {
        bail!("no saved form with id '{form_id}'");
    };
    store.assign_form(client_id, &schema).await?;
    println!(
        "{} '{}' {} {}",
        "Assigned".green(),
        schema.title.bold(),
        "to client".green(),
        client_id
    );
    Ok(())
}

pub async fn responses_command(store: &Store, client_id: &str) -> Result<()> {
    if store.get_client(client_id).await?.is_none() {
        bail!("no client with id '{client_id}'");
    }
    let responses = store.list_responses(client_id).await?;
    if responses.is_empty() {
        println!("{}", "No submissions yet.".dimmed());
        return Ok(());
    }

    for response in responses {
        println!(
            "{} {}",
            response.date.format("%Y-%m-%d %H:%M").to_string().bold(),
            format!("(form {})", response.form_id).dimmed()
        );
        let mut keys: Vec<_> = response.answers.keys().collect();
        keys.sort();
        for key in keys {
            println!("  {}: {}", key.cyan(), response.answers[key]);
        }
    }
    Ok(())
}
