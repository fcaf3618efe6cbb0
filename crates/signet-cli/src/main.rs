//! Signet CLI — match HTML signature files to Google Workspace users and
//! push them to Gmail.
//!
//! Set SIGNET_ACCESS_TOKEN (or configure a token file via `signet init`).

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use signet_cli::init_tracing;

mod commands;

#[derive(Parser)]
#[command(name = "signet", about = "Gmail signature deployment for Google Workspace")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive setup: admin email, customer id, token file
    Init,
    /// Match signature files against the directory and push them to Gmail
    Deploy {
        /// Folder containing the HTML signature files
        folder: PathBuf,
        /// Match and validate only, deploy nothing
        #[arg(long)]
        dry_run: bool,
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Match and validate a signatures folder without deploying
    Validate {
        /// Folder containing the HTML signature files
        folder: PathBuf,
    },
    /// Show the signature currently set for a user
    Preview {
        /// The user's primary email address
        email: String,
    },
    /// Print the stored configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => commands::init::run().await,
        Commands::Deploy {
            folder,
            dry_run,
            yes,
        } => commands::deploy::run(&folder, dry_run, yes).await,
        Commands::Validate { folder } => commands::deploy::run(&folder, true, true).await,
        Commands::Preview { email } => commands::preview::run(&email).await,
        Commands::Config => commands::config::run(),
    }
}
