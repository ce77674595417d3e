use anyhow::Context;
use clap::Subcommand;
use serde_json::{json, Value};
use std::io::Read;
use std::sync::Arc;

use crate::cli::utils::{output_success, parse_json_input};
use crate::cli::OutputFormat;
use crate::facade::Facade;
use crate::resources::ResourceRegistry;
use crate::store::Filter;

#[derive(Subcommand)]
pub enum DataCommands {
    #[command(about = "List documents, optionally filtered by exact field values")]
    List {
        #[arg(help = "Resource name")]
        resource: String,
        #[arg(long, help = "JSON object of field values to match, e.g. '{\"age\": 31}'")]
        filter: Option<String>,
    },

    #[command(about = "Get one document by ID")]
    Get {
        #[arg(help = "Resource name")]
        resource: String,
        #[arg(help = "Document ID")]
        id: String,
    },

    #[command(about = "Create a document from a JSON object on stdin")]
    Create {
        #[arg(help = "Resource name")]
        resource: String,
    },

    #[command(about = "Merge a JSON object from stdin into a document")]
    Update {
        #[arg(help = "Resource name")]
        resource: String,
        #[arg(help = "Document ID to update")]
        id: String,
    },

    #[command(about = "Delete a document")]
    Delete {
        #[arg(help = "Resource name")]
        resource: String,
        #[arg(help = "Document ID to delete")]
        id: String,
    },
}

pub async fn handle(
    cmd: DataCommands,
    registry: &ResourceRegistry,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let (message, data) = execute(cmd, registry, std::io::stdin()).await?;
    output_success(&output_format, &message, Some(data))
}

/// Run a data command, reading any JSON body from `input`
pub async fn execute(
    cmd: DataCommands,
    registry: &ResourceRegistry,
    mut input: impl Read,
) -> anyhow::Result<(String, Value)> {
    match cmd {
        DataCommands::List { resource, filter } => {
            let facade = lookup(registry, &resource)?;
            let filter = filter.as_deref().map(parse_filter).transpose()?;
            let documents = facade.list(filter).await?;
            Ok((
                format!("{} {} document(s)", documents.len(), resource),
                serde_json::to_value(documents)?,
            ))
        }
        DataCommands::Get { resource, id } => {
            let document = lookup(registry, &resource)?.get(&id).await?;
            Ok((format!("{} {}", resource, id), document.into_value()))
        }
        DataCommands::Create { resource } => {
            let facade = lookup(registry, &resource)?;
            let body = read_body(&mut input)?;
            let document = facade.create(body).await?;
            Ok((format!("Created {} {}", resource, document.id), document.into_value()))
        }
        DataCommands::Update { resource, id } => {
            let facade = lookup(registry, &resource)?;
            let body = read_body(&mut input)?;
            let document = facade.update(&id, body).await?;
            Ok((format!("Updated {} {}", resource, id), document.into_value()))
        }
        DataCommands::Delete { resource, id } => {
            let document = lookup(registry, &resource)?.delete(&id).await?;
            Ok((format!("Deleted {} {}", resource, id), json!({ "id": document.id })))
        }
    }
}

fn lookup(registry: &ResourceRegistry, resource: &str) -> anyhow::Result<Arc<Facade>> {
    registry.get(resource).ok_or_else(|| {
        anyhow::anyhow!(
            "Unknown resource '{}' (available: {})",
            resource,
            registry.names().join(", ")
        )
    })
}

/// Filter values are matched as given; strings are coerced by the facade
fn parse_filter(raw: &str) -> anyhow::Result<Filter> {
    match parse_json_input(raw, "filter")? {
        Value::Object(map) => Ok(map),
        _ => anyhow::bail!("Filter must be a JSON object"),
    }
}

fn read_body(input: &mut impl Read) -> anyhow::Result<Value> {
    let mut raw = String::new();
    input.read_to_string(&mut raw).context("failed to read stdin")?;
    parse_json_input(&raw, "document")
}
