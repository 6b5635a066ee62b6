// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! devmatch - asynchronous effects core of the devmatch platform.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use devmatch_config::DevmatchConfig;

#[derive(Parser, Debug)]
#[command(name = "devmatch", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the usual lookup paths.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the hubs, the reminder scheduler and the chat websocket server.
    Serve,
    /// Validate the configuration and exit.
    CheckConfig,
}

fn load(path: Option<&PathBuf>) -> Option<DevmatchConfig> {
    let loaded = match path {
        Some(path) => devmatch_config::load_and_validate_path(path),
        None => devmatch_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => Some(config),
        Err(errors) => {
            devmatch_config::render_errors(&errors);
            None
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let Some(config) = load(cli.config.as_ref()) else {
        return ExitCode::FAILURE;
    };

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => match devmatch::serve::run_serve(config).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("devmatch: {e}");
                ExitCode::FAILURE
            }
        },
        Commands::CheckConfig => {
            println!(
                "devmatch: config ok (embedding workers={}, recommendation workers={}, trial cron `{}`)",
                config.embedding.workers, config.recommendation.workers, config.scheduler.trial_cron
            );
            ExitCode::SUCCESS
        }
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
    fn serve_is_the_default_command() {
        let cli = Cli::parse_from(["devmatch"]);
        assert!(cli.command.is_none());

        let cli = Cli::parse_from(["devmatch", "check-config", "--config", "/tmp/x.toml"]);
        assert!(matches!(cli.command, Some(Commands::CheckConfig)));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/x.toml")));
    }
}
