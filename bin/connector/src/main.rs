use std::process::ExitCode;

use clap::{Parser, Subcommand};
use connector_net::config::Config;
use connector_net::server::{build_server, init_tracing, issue_token, revoke_token, ServerError};
use tracing::error;

#[derive(Parser)]
#[command(name = "connector", version, about = "Developer profiles and posts API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Open a session for an existing user and print its bearer token
    IssueToken {
        /// Account id (UUID)
        user_id: String,
    },
    /// Close the session behind a bearer token
    RevokeToken { token: String },
}

async fn run(command: Command) -> Result<(), ServerError> {
    let config = Config::load()?;

    match command {
        Command::Serve => build_server(config).await,
        Command::IssueToken { user_id } => {
            println!("{}", issue_token(&config, &user_id)?);
            Ok(())
        }
        Command::RevokeToken { token } => {
            if !revoke_token(&config, &token)? {
                eprintln!("connector: no live session for that token");
            }
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(cli.command.unwrap_or(Command::Serve)).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("connector: {e}");
            ExitCode::FAILURE
        }
    }
}
