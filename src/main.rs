use anyhow::Result;
use clap::Parser;
use log::info;
use once_cell::sync::OnceCell;

use coachform::cli::{Cli, Commands, commands};
use coachform::store::Store;

// Global Store instance
static STORE: OnceCell<Store> = OnceCell::new();

/// Get a reference to the global Store
fn global_store() -> &'static Store {
    STORE.get().expect("Store not initialized")
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger to file (truncate on each run)
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open("coachform.log")?;
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    let cli = Cli::parse();
    info!("Starting coachform");

    let store = Store::load().await?;
    STORE
        .set(store)
        .map_err(|_| anyhow::anyhow!("Failed to initialize global Store"))?;
    let store = global_store();

    match cli.command {
        Commands::Form(args) => commands::form_command(store, args).await?,
        Commands::Client(args) => commands::client_command(store, args).await?,
        Commands::Assign { form_id, client_id } => {
            commands::assign_command(store, &form_id, &client_id).await?
        }
        Commands::Respond { client_id } => commands::respond_command(store, &client_id).await?,
        Commands::Responses { client_id } => {
            commands::responses_command(store, &client_id).await?
        }
    }

    Ok(())
}
