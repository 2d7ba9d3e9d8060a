//! Solace CLI and REST API entry point.
//!
//! Binary name: `solace`
//!
//! Parses CLI arguments, initializes the database and services, then
//! either starts the REST API server or runs a management command.

mod http;
mod state;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use http::extractors::auth::create_token;
use http::router::build_router;
use state::AppState;

#[derive(Parser)]
#[command(name = "solace", about = "Scripted supportive-chat service", version)]
struct Cli {
    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the REST API server
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1", env = "SOLACE_HOST")]
        host: String,
        /// Port to listen on
        #[arg(long, default_value_t = 8080, env = "SOLACE_PORT")]
        port: u16,
    },
    /// Manage API tokens
    Token {
        #[command(subcommand)]
        command: TokenCommands,
    },
}

#[derive(Subcommand)]
enum TokenCommands {
    /// Provision a new user and print their API token (shown once)
    Create,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info,solace=debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    let state = AppState::init().await?;

    match cli.command {
        Commands::Serve { host, port } => {
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!(%addr, "solace API listening");
            axum::serve(listener, build_router(state)).await?;
        }
        Commands::Token { command } => match command {
            TokenCommands::Create => {
                let (user_id, token) = create_token(&state).await?;
                println!("user id: {user_id}");
                println!("token:   {token}");
                println!("Store the token now; only its hash is kept.");
            }
        },
    }

    Ok(())
}
