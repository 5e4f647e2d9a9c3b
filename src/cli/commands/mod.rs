mod build;
mod clients;
mod forms;
mod respond;

pub use build::build_command;
pub use clients::{ClientCommands, assign_command, client_command, responses_command};
pub use forms::{FormCommands, form_command};
pub use respond::respond_command;
