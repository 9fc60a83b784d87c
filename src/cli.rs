use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "estate_admin")]
#[command(about = "Terminal admin dashboard for a real-estate project catalog", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Listing webhook URL (overrides ESTATE_LIST_URL)
    #[arg(long, global = true)]
    pub list_url: Option<String>,

    /// Retries after the first listing attempt
    #[arg(long, global = true)]
    pub max_retries: Option<u32>,

    /// Fixed delay between listing attempts, in milliseconds
    #[arg(long, global = true)]
    pub retry_delay_ms: Option<u64>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Open the interactive dashboard (default)
    Tui,

    /// Fetch the catalog and print it as a table
    List,

    /// Fetch the catalog and write a snapshot file
    Export {
        /// Snapshot format
        #[arg(short, long, default_value = "json")]
        format: ExportFormat,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Html,
}

impl Cli {
    /// Command-line flags win over the environment
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(url) = &self.list_url {
            config.list_url = url.clone();
        }
        if let Some(max_retries) = self.max_retries {
            config.max_retries = max_retries;
        }
        if let Some(delay) = self.retry_delay_ms {
            config.retry_delay_ms = delay;
        }
    }
}
