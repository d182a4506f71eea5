//! Configuration view and validation commands — `botctl config`.

use anyhow::Result;
use std::path::Path;

use botctl::config::{BotctlToml, CONFIG_FILE, CliOverrides, Settings};

use super::super::ConfigCommands;

pub fn cmd_config(
    project_dir: &Path,
    overrides: &CliOverrides,
    command: Option<ConfigCommands>,
) -> Result<()> {
    let config_path = project_dir.join(CONFIG_FILE);

    match command {
        None | Some(ConfigCommands::Show) => {
            let settings = Settings::load(project_dir, overrides)?;
            let toml = &settings.toml;

            println!();
            if config_path.exists() {
                println!("Config file: {}", config_path.display());
            } else {
                println!("No {} found, using defaults.", CONFIG_FILE);
            }
            println!();
            println!("Effective values (with .env/env/CLI overrides):");
            println!();
            println!("[compose]");
            println!("  command = {:?}", toml.compose.command);
            println!("  service = \"{}\"", toml.compose.service);
            if !toml.compose.files.is_empty() {
                let files: Vec<String> = toml
                    .compose
                    .files
                    .iter()
                    .map(|f| f.display().to_string())
                    .collect();
                println!("  files = {:?}", files);
            }
            println!();
            println!("[migrations]");
            println!("  tool = \"{}\"", toml.migrations.tool);
            println!("  in_container = {}", toml.migrations.in_container);
            println!();
            println!("[tasks]");
            println!("  shell = \"{}\"", toml.tasks.shell);
            println!("  test = {:?}", toml.tasks.test);
            println!("  prune = {:?}", toml.tasks.prune);
            println!();
        }
        Some(ConfigCommands::Validate) => {
            if !config_path.exists() {
                println!("No {} found. Using defaults (valid).", CONFIG_FILE);
                return Ok(());
            }

            let warnings = BotctlToml::load(&config_path)?.validate();
            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("{} already exists at {}", CONFIG_FILE, config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            BotctlToml::default().save(&config_path)?;
            println!("Created {} at {}", CONFIG_FILE, config_path.display());
        }
    }

    Ok(())
}
