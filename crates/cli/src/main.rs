//! Vehicle Price Predictor CLI
//!
//! Queries a running pricer server for its model schema and price estimates,
//! and inspects model artifacts offline.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{inspect, predict, schema};
use pricer_lib::models::{UserInputs, DEFAULT_CYLINDERS, DEFAULT_MILEAGE, DEFAULT_YEAR};
use std::path::PathBuf;

/// Vehicle Price Predictor CLI
#[derive(Parser)]
#[command(name = "vpp")]
#[command(author, version, about = "CLI for the Vehicle Price Predictor", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via VPP_API_URL env var)
    #[arg(long, env = "VPP_API_URL")]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the input schema of the model the server has loaded
    Schema,

    /// Request a price estimate from the server
    Predict {
        /// Model year
        #[arg(long, default_value_t = DEFAULT_YEAR)]
        year: i32,

        /// Odometer reading
        #[arg(long, default_value_t = DEFAULT_MILEAGE)]
        mileage: u32,

        /// Engine cylinder count
        #[arg(long, default_value_t = DEFAULT_CYLINDERS)]
        cylinders: u32,

        /// Categorical choice as group=feature (repeatable)
        #[arg(long = "select", short = 's')]
        selections: Vec<String>,
    },

    /// Discover the input schema of a local model artifact
    Inspect {
        /// Path to the model (.json or .onnx)
        model: PathBuf,

        /// Expected SHA256 of the artifact
        #[arg(long)]
        sha256: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Schema => {
            let client = connect(cli.api_url.as_deref())?;
            schema::show_schema(&client, cli.format).await?;
        }
        Commands::Predict {
            year,
            mileage,
            cylinders,
            selections,
        } => {
            let client = connect(cli.api_url.as_deref())?;
            let inputs = predict::parse_selections(&selections)?
                .into_iter()
                .fold(UserInputs::new(year, mileage, cylinders), |inputs, (group, feature)| {
                    inputs.with_selection(group, feature)
                });
            predict::predict(&client, inputs, cli.verbose, cli.format).await?;
        }
        Commands::Inspect { model, sha256 } => {
            inspect::inspect(&model, sha256.as_deref(), cli.format)?;
        }
    }

    Ok(())
}

fn connect(api_url: Option<&str>) -> Result<client::ApiClient> {
    let config = config::Config::load()?;
    client::ApiClient::new(&config.resolve_api_url(api_url))
}
