//! CLI entry point for todos.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use todos_app::{ClientConfig, TodoSync};
use todos_core::FilterStatus;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod commands;
mod config;
mod tui;

/// Task list synchronized with a remote `/todos` collection.
#[derive(Parser, Debug)]
#[command(
    name = "todos",
    version,
    about = "todos: a terminal client for a remote /todos collection"
)]
struct Cli {
    /// Configuration file (defaults to `<config dir>/todos/config.toml`).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List items.
    Ls {
        /// Which items to show.
        #[arg(long, default_value = "all")]
        filter: FilterStatus,
        /// Output format.
        #[arg(long, value_enum, default_value = "table")]
        format: LsFormat,
    },

    /// Create an item.
    Add {
        /// Title of the new item.
        title: String,
    },

    /// Flip the completion flag of an item.
    Toggle {
        /// Item id.
        id: String,
    },

    /// Complete every item, or reopen all of them when all are completed.
    ToggleAll,

    /// Delete an item.
    Rm {
        /// Item id.
        id: String,
    },

    /// Rename an item. A blank title deletes it.
    Rename {
        /// Item id.
        id: String,
        /// New title.
        title: String,
    },

    /// Delete every completed item.
    ClearCompleted,

    /// Launch interactive terminal UI.
    Tui,

    /// Write a configuration file with the default settings.
    InitConfig {
        /// Destination (defaults to the per-user configuration path).
        #[arg(long)]
        output: Option<PathBuf>,
        /// Overwrite an existing file without asking.
        #[arg(long)]
        force: bool,
    },
}

/// Output format for `ls`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LsFormat {
    /// Human readable table.
    Table,
    /// JSON array of items.
    Json,
}

fn main() -> Result<()> {
    let Cli { config, cmd } = Cli::parse();

    if should_install_tracing(&cmd) {
        install_tracing();
    }

    execute_command(config.as_deref(), cmd)
}

fn execute_command(config_path: Option<&Path>, command: Command) -> Result<()> {
    if let Command::InitConfig { output, force } = command {
        return config::init_config(output.as_deref(), force);
    }

    let client = ClientConfig::load(config_path)?;
    run_with_client(&client, config_path, command)
}

fn run_with_client(client: &ClientConfig, config_path: Option<&Path>, command: Command) -> Result<()> {
    match command {
        Command::Tui => tui::run(client, config_path),
        other => {
            let Some(owner) = client.owner() else {
                bail!(
                    "no owner id configured; set client.owner_id in the config file or {}",
                    todos_app::config::ENV_OWNER_ID
                );
            };
            let store = client.store()?;
            let sync = TodoSync::new(store, owner, client.sync_options());
            let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
            runtime.block_on(commands::run(other, &sync))
        }
    }
}

const fn should_install_tracing(cmd: &Command) -> bool {
    !matches!(cmd, Command::Tui)
}

fn install_tracing() {
    // RUST_LOG is honored; INFO by default.
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}
