// logx - emit records through a configured logger or check a log config

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use cli::{Cli, Commands};
use commands::{execute_check, execute_emit};
use logx::log;
use logx::LogConfig;

const DEFAULT_CONFIG_FILE: &str = "~/.logx.toml";

/// Load configuration, falling back to defaults when no file is given
/// and the default file is absent
fn load_config(cli: &Cli) -> Result<LogConfig> {
    let path = match &cli.config {
        Some(path) => Some(PathBuf::from(shellexpand::tilde(path).to_string())),
        None => {
            let path = PathBuf::from(shellexpand::tilde(DEFAULT_CONFIG_FILE).to_string());
            path.exists().then_some(path)
        }
    };

    let mut config = match &path {
        Some(path) => {
            log::dev_instance().infom(
                "config file used",
                [("path", path.display().to_string().into())],
            );
            LogConfig::from_file(path)?
        }
        None => LogConfig::default(),
    };

    if let Some(dir) = &cli.log {
        config.log_dir = Some(dir.clone());
    }
    if let Some(level) = cli.level {
        config.level = level.to_string();
    }

    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load config file: {:#}", e);
            std::process::exit(1);
        }
    };

    match &cli.command {
        Commands::Check => {
            if let Err(e) = execute_check(&config) {
                eprintln!("load config failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Commands::Emit(args) => {
            if let Err(e) = log::init(&config) {
                eprintln!("init log failed: {}", e);
                std::process::exit(1);
            }
            execute_emit(args)?;
        }
    }

    Ok(())
}
