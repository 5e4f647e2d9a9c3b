pub mod commands;

use clap::{Parser, Subcommand};

use commands::{ClientCommands, FormCommands};

#[derive(Parser)]
#[command(name = "coachform")]
#[command(about = "Dynamic intake forms for trainer/client coaching")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Saved form management and the interactive builder
    Form(FormCommands),
    /// Client roster management
    Client(ClientCommands),
    /// Assign a saved form to a client
    Assign { form_id: String, client_id: String },
    /// Fill in the form currently assigned to a client
    Respond { client_id: String },
    /// Show a client's submission history
    Responses { client_id: String },
}
