use clap::{Parser, Subcommand};

/// Backend the suite targets when no --base-url is given.
pub const DEFAULT_BASE_URL: &str = "https://healthy-bites-49.preview.emergentagent.com/api";

#[derive(Parser, Debug)]
#[command(name = "dryfruto-checker", about = "Conformance checker for the DryFruto site-settings API")]
pub struct Cli {
    /// Enable verbose output (dump raw bodies of failed responses)
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Backend API base URL
    #[arg(long, global = true, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Probe backend connectivity without touching any settings
    Check,

    /// Run the full site-settings conformance suite
    Run {
        /// Output directory for the JSON report
        #[arg(long, default_value = "./check-output")]
        output_dir: String,

        /// Skip writing the JSON report
        #[arg(long)]
        no_report: bool,
    },
}
