mod checks;
mod cli;
mod client;
mod progress;
mod results;

use std::path::PathBuf;

use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            match checks::run_connectivity_check(&cli.base_url, cli.verbose).await {
                Ok(true) => std::process::exit(0),
                Ok(false) => std::process::exit(1),
                Err(e) => {
                    eprintln!("Error: {e:#}");
                    std::process::exit(2);
                }
            }
        }
        Commands::Run { output_dir, no_report } => {
            let report_dir = if no_report {
                None
            } else {
                Some(PathBuf::from(&output_dir))
            };
            match checks::run_suite(&cli.base_url, report_dir.as_deref(), cli.verbose).await {
                Ok(true) => std::process::exit(0),
                Ok(false) => std::process::exit(1),
                Err(e) => {
                    eprintln!("Error: {e:#}");
                    std::process::exit(2);
                }
            }
        }
    }
}
