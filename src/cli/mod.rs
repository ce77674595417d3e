pub mod commands;
pub mod utils;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::resources::ResourceRegistry;
use crate::store;

#[derive(Parser)]
#[command(name = "people")]
#[command(about = "People CLI - drive resource facades directly against the document store")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Document operations on a resource")]
    Data {
        #[command(subcommand)]
        cmd: commands::data::DataCommands,
    },

    #[command(about = "Inspect registered resource descriptors")]
    Schema {
        #[command(subcommand)]
        cmd: commands::schema::SchemaCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    let config = AppConfig::from_env();
    let store = store::connect(&config.store)
        .await
        .context("failed to connect document store")?;
    let registry = ResourceRegistry::from_config(store, &config)?;

    match cli.command {
        Commands::Data { cmd } => {
            registry.prepare_all().await?;
            commands::data::handle(cmd, &registry, output_format).await
        }
        Commands::Schema { cmd } => commands::schema::handle(cmd, &registry, output_format),
    }
}
