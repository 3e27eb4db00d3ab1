//! Configuration file management for todos.

use anyhow::{Context, Result, anyhow};
use std::io::{self, Write};
use std::path::Path;
use todos_app::ClientConfig;

pub mod keybindings;

pub use keybindings::{Action, KeyBindingsConfig};

/// Write a configuration file with the default settings.
pub fn init_config(output: Option<&Path>, force: bool) -> Result<()> {
    let output_path = match output {
        Some(path) => path.to_path_buf(),
        None => ClientConfig::default_path().ok_or_else(|| anyhow!("Could not determine config directory"))?,
    };

    if output_path.exists() && !force && !confirm_overwrite(&output_path)? {
        println!("Aborted.");
        return Ok(());
    }

    write_default_config(&output_path)?;

    println!("✓ Wrote configuration file: {}", output_path.display());
    println!();
    println!("Set client.owner_id (or TODOS_OWNER_ID) before running todos.");
    println!("Restart todos tui to apply keybinding changes.");
    Ok(())
}

fn write_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
    }

    let content = keybindings::generate_default_config_toml()?;
    std::fs::write(path, content).with_context(|| format!("Failed to write config file: {}", path.display()))
}

fn confirm_overwrite(path: &Path) -> Result<bool> {
    print!("File already exists: {}\nOverwrite? [y/N]: ", path.display());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}
