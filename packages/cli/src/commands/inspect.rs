use crate::commands::load_session;
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use richnode_editor::{EditSession, HostEditor};
use richnode_schema::{NodeInstance, ID_ATTRIBUTE};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Markup file to inspect
    pub file: PathBuf,

    /// Print the nodes as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn inspect(args: InspectArgs, config: &Config) -> Result<()> {
    let session = load_session(&args.file, &config.editor)?;
    let nodes = custom_nodes(&session);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&nodes)?);
        return Ok(());
    }

    println!("🔍 {} {}", "Inspecting".green().bold(), args.file.display());
    println!("   Document size: {}", session.host().document_size());
    println!();

    if nodes.is_empty() {
        println!("{}", "⚠️  No custom nodes found".yellow());
        return Ok(());
    }

    for node in &nodes {
        println!(
            "  {:>5}  {}  {}",
            node.position.unwrap_or_default(),
            node.type_name.cyan(),
            node.id().unwrap_or("-").dimmed()
        );
        for (key, value) in node.attrs.iter().filter(|(key, _)| *key != ID_ATTRIBUTE) {
            println!("         {} = {}", key, value);
        }
    }

    println!();
    println!("   Found {} custom nodes", nodes.len());
    Ok(())
}

/// Every registered custom node in the document, in document order
pub fn custom_nodes(session: &EditSession) -> Vec<NodeInstance> {
    session
        .host()
        .document()
        .descendants()
        .into_iter()
        .filter(|(_, element)| session.registry().contains(&element.type_name))
        .map(|(pos, element)| element.to_instance(pos))
        .collect()
}
