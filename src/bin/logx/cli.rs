// CLI argument definitions using clap

use clap::{Args, Parser, Subcommand};
use logx::Level;

#[derive(Parser, Debug)]
#[command(name = "logx")]
#[command(author = "hatlonely <hatlonely@foxmail.com>")]
#[command(version = "0.1.0")]
#[command(about = "Structured logging playground and config checker", long_about = None)]
pub struct Cli {
    /// Path to config file (default: ~/.logx.toml if it exists)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Log directory, overrides output/err_output with <dir>/info.log and <dir>/error.log
    #[arg(short, long, global = true)]
    pub log: Option<String>,

    /// Override the configured level
    #[arg(long, global = true)]
    pub level: Option<Level>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Emit records through the configured logger
    Emit(EmitArgs),
    /// Validate the config and print the effective configuration
    Check,
}

#[derive(Args, Debug)]
pub struct EmitArgs {
    /// Record level (debug, info, warn, error, panic, fatal)
    #[arg(id = "record_level", value_name = "LEVEL")]
    pub level: Level,

    /// Record message
    pub message: String,

    /// Number of times to emit the record
    #[arg(long, default_value = "1")]
    pub count: usize,

    /// Logger name, dot separated (e.g. db.raw)
    #[arg(long)]
    pub name: Option<String>,

    /// Extra field as key=value, value parsed as JSON when possible
    #[arg(short, long = "field")]
    pub fields: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emit_args(cli: &Cli) -> &EmitArgs {
        match &cli.command {
            Commands::Emit(args) => args,
            Commands::Check => panic!("expected emit"),
        }
    }

    #[test]
    fn test_emit_level_does_not_override_global_level() {
        let cli = Cli::try_parse_from(["logx", "emit", "debug", "x"]).unwrap();
        assert_eq!(cli.level, None);
        assert_eq!(emit_args(&cli).level, Level::Debug);
        assert_eq!(emit_args(&cli).message, "x");
    }

    #[test]
    fn test_global_level_and_emit_level_are_separate() {
        let cli =
            Cli::try_parse_from(["logx", "--level", "error", "emit", "info", "hello"]).unwrap();
        assert_eq!(cli.level, Some(Level::Error));
        assert_eq!(emit_args(&cli).level, Level::Info);

        let cli = Cli::try_parse_from([
            "logx", "emit", "warn", "hello", "--level", "debug", "--count", "3", "-f", "k=1",
        ])
        .unwrap();
        assert_eq!(cli.level, Some(Level::Debug));
        assert_eq!(emit_args(&cli).level, Level::Warn);
        assert_eq!(emit_args(&cli).count, 3);
        assert_eq!(emit_args(&cli).fields, vec!["k=1"]);
    }

    #[test]
    fn test_check_command() {
        let cli = Cli::try_parse_from(["logx", "-c", "app.yaml", "check"]).unwrap();
        assert!(matches!(cli.command, Commands::Check));
        assert_eq!(cli.config.as_deref(), Some("app.yaml"));
    }
}
