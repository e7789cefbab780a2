//! cyberblog CLI - run and inspect the security teaching blog

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod output;

use commands::{delete_user, flaws, serve, status, users};

const DEFAULT_LOG_FILTER: &str = "cyberblog=info,tower_http=info";

/// cyberblog - a deliberately vulnerable blog for security courses
#[derive(Parser)]
#[command(name = "cyberblog", version, about, long_about = None)]
struct Cli {
    /// Data directory holding settings.json, the database and uploads
    #[arg(long, global = true, env = "CYBERBLOG_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run migrations and start the web server
    Serve {
        /// Address to listen on (overrides settings.json and CYBERBLOG_BIND)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Show row counts and which flaws are active
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List registered users
    Users {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a user with their profile, thoughts and sessions
    DeleteUser {
        /// Username to delete
        username: String,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// Show or toggle the intentional vulnerabilities
    Flaws {
        #[command(subcommand)]
        command: Option<flaws::FlawCommands>,
    },
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let data_dir = commands::resolve_data_dir(cli.data_dir)?;

    match cli.command {
        Commands::Serve { bind } => serve::run(&data_dir, bind),
        Commands::Status { json } => status::run(&data_dir, json),
        Commands::Users { json } => users::run(&data_dir, json),
        Commands::DeleteUser { username, force } => delete_user::run(&data_dir, &username, force),
        Commands::Flaws { command } => flaws::run(&data_dir, command),
    }
}
