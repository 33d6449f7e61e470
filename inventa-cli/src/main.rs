//! Inventa CLI - encrypted entity backups for the inventory console

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{demo, entities, export, import, inspect, logs, resolve_store_path};

/// Inventa - export and import encrypted entity backups
#[derive(Parser)]
#[command(name = "inv", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write an encrypted backup of one entity
    Export {
        /// Entity to export
        entity_id: String,
        /// Store file (default: ~/.inventa/store.json)
        #[arg(long)]
        store: Option<PathBuf>,
        /// Output file or directory (default: current directory)
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Refuse to export entities with broken references
        #[arg(long)]
        strict: bool,
        /// Overwrite an existing backup file
        #[arg(long, short)]
        force: bool,
        /// Backup password
        #[arg(short, long)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Import an encrypted backup
    Import {
        /// Backup file
        file: PathBuf,
        /// Store file (default: ~/.inventa/store.json)
        #[arg(long)]
        store: Option<PathBuf>,
        /// Replace the data of this entity instead of creating a new one
        #[arg(long, value_name = "ENTITY_ID")]
        replace: Option<String>,
        /// Decrypt and remap without saving
        #[arg(long)]
        dry_run: bool,
        /// Backup password
        #[arg(short, long)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decrypt a backup and show what it contains
    Inspect {
        /// Backup file
        file: PathBuf,
        /// Backup password
        #[arg(short, long)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the entities in a store file
    Entities {
        /// Store file (default: ~/.inventa/store.json)
        #[arg(long)]
        store: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View and manage the event log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },

    /// Create a store file with sample data
    Demo {
        /// Store file (default: ~/.inventa/store.json)
        #[arg(long)]
        store: Option<PathBuf>,
        /// Overwrite an existing store file
        #[arg(long, short)]
        force: bool,
    },
}

impl Commands {
    fn wants_json(&self) -> bool {
        match self {
            Commands::Export { json, .. }
            | Commands::Import { json, .. }
            | Commands::Inspect { json, .. }
            | Commands::Entities { json, .. } => *json,
            Commands::Logs { .. } | Commands::Demo { .. } => false,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let json = cli.command.wants_json();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::failure(&e, json);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Export {
            entity_id,
            store,
            out,
            strict,
            force,
            password,
            json,
        } => export::run(export::ExportArgs {
            entity_id,
            store: resolve_store_path(store),
            out,
            strict,
            force,
            password,
            json,
        }),
        Commands::Import {
            file,
            store,
            replace,
            dry_run,
            password,
            json,
        } => import::run(import::ImportArgs {
            file,
            store: resolve_store_path(store),
            replace,
            dry_run,
            password,
            json,
        }),
        Commands::Inspect {
            file,
            password,
            json,
        } => inspect::run(file, password, json),
        Commands::Entities { store, json } => entities::run(resolve_store_path(store), json),
        Commands::Logs { command } => logs::run(command),
        Commands::Demo { store, force } => demo::run(resolve_store_path(store), force),
    }
}
