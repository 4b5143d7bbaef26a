use clap::{Parser, Subcommand};

mod token;
mod user;

#[derive(Debug, Parser)]
#[command(name = "emporium-app", about = "Emporium admin CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Manage marketplace users
    User(user::UserCommand),

    /// Manage bearer API tokens
    Token(token::TokenCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::User(command) => user::run(command).await,
            Commands::Token(command) => token::run(command).await,
        }
    }
}
