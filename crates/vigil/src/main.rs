// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vigil - a policy-enforcing proxy for text-generation APIs.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;
mod usage;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use vigil_config::{ConfigError, VigilConfig};

/// Vigil - a policy-enforcing proxy for text-generation APIs.
#[derive(Parser, Debug)]
#[command(name = "vigil", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the proxy server (default).
    Serve,
    /// Inspect configuration.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Print the current day and month usage for a key as JSON.
    Usage {
        /// Caller key to report on.
        #[arg(long)]
        key: String,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Load and validate configuration, reporting every problem found.
    Check,
}

fn load(path: Option<&PathBuf>) -> Result<VigilConfig, Vec<ConfigError>> {
    match path {
        Some(path) if !path.is_file() => Err(vec![ConfigError::Other(format!(
            "config file not found: {}",
            path.display()
        ))]),
        Some(path) => vigil_config::load_and_validate_path(path),
        None => vigil_config::load_and_validate(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load(cli.config.as_ref()) {
        Ok(config) => config,
        Err(errors) => {
            vigil_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve::run_serve(config).await,
        Commands::Config {
            action: ConfigAction::Check,
        } => {
            println!(
                "vigil: config ok ({} key(s), listening on {}:{})",
                config.keys.len(),
                config.server.host,
                config.server.port
            );
            Ok(())
        }
        Commands::Usage { key } => usage::run_usage(&config, &key).await,
    };

    if let Err(e) = result {
        eprintln!("vigil: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["vigil"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_config_check_and_usage() {
        let cli = Cli::try_parse_from(["vigil", "config", "check"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                action: ConfigAction::Check
            })
        ));

        let cli = Cli::try_parse_from(["vigil", "usage", "--key", "abc"]).unwrap();
        match cli.command {
            Some(Commands::Usage { key }) => assert_eq!(key, "abc"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn usage_requires_key() {
        assert!(Cli::try_parse_from(["vigil", "usage"]).is_err());
    }

    #[test]
    fn global_config_flag() {
        let cli = Cli::try_parse_from(["vigil", "config", "check", "--config", "x.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
    }
}
