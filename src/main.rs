use std::path::PathBuf;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use cx_dashboard::{logging, models::TrendUnit, AppError, Config};

mod commands;
mod output;

#[derive(Parser)]
#[command(
    name = "cxdash",
    about = "Customer-experience analytics client",
    version,
    long_about = None
)]
pub struct Cli {
    /// Backend base URL (overrides CX_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check whether the current session is logged in
    Status,

    /// Parse a CSV/XLSX file locally and show a preview; nothing is uploaded
    Preview {
        file: PathBuf,
        /// Number of preview rows to print (at most 5)
        #[arg(long, default_value_t = 5)]
        rows: usize,
    },

    /// Upload a CSV/XLSX file for AI analysis and print the result
    Analyze {
        file: PathBuf,
        /// Write the result JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fetch the CX report for a store
    Report {
        #[arg(long = "store")]
        store_id: String,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(long, value_enum, default_value = "day")]
        unit: TrendUnit,
    },

    /// Pull the latest Google reviews for a store into the backend
    Sync {
        #[arg(long = "store")]
        store_id: String,
    },

    /// Fetch the rating trend for a store
    Trend {
        #[arg(long = "store")]
        store_id: String,
        #[arg(long, value_enum, default_value = "day")]
        unit: TrendUnit,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
    },

    /// End the current session
    Logout,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    logging::init_logging(cli.verbose)?;

    // Load configuration
    let mut config = Config::new()?;
    if let Some(api_url) = cli.api_url {
        config = config.with_api_url(api_url);
    }

    commands::run(cli.command, config).await.map_err(|e| {
        match e.downcast_ref::<AppError>() {
            Some(err @ AppError::Unauthenticated) => anyhow!(err.user_message()),
            _ => e,
        }
    })
}
