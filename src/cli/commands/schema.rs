use clap::Subcommand;
use serde_json::{json, Value};

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::resources::ResourceRegistry;

#[derive(Subcommand)]
pub enum SchemaCommands {
    #[command(about = "List registered resources")]
    List,

    #[command(about = "Show a resource descriptor")]
    Show {
        #[arg(help = "Resource name")]
        resource: String,
    },
}

pub fn handle(
    cmd: SchemaCommands,
    registry: &ResourceRegistry,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let (message, data) = describe(cmd, registry)?;
    output_success(&output_format, &message, Some(data))
}

pub fn describe(cmd: SchemaCommands, registry: &ResourceRegistry) -> anyhow::Result<(String, Value)> {
    match cmd {
        SchemaCommands::List => {
            let names = registry.names();
            Ok((format!("{} resource(s)", names.len()), json!(names)))
        }
        SchemaCommands::Show { resource } => {
            let facade = registry
                .get(&resource)
                .ok_or_else(|| anyhow::anyhow!("Unknown resource '{}'", resource))?;
            Ok((
                format!("Resource '{}'", resource),
                serde_json::to_value(facade.schema())?,
            ))
        }
    }
}
