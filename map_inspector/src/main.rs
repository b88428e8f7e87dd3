use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use remap_schema::LayerMapArtifact;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(author, version, about = "Apply exported layer map artifacts to indices and masks", long_about = None)]
struct Cli {
    /// Path to an exported layer map artifact (JSON).
    #[arg(long)]
    map: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Transform a single layer index through the map.
    Layer {
        /// Old layer index. Out-of-range values resolve like slot 0.
        index: i32,
    },
    /// Transform a 32-bit layer mask through the map.
    Mask {
        /// Old mask value, decimal or 0x-prefixed hex.
        mask: String,
    },
    /// Print the full old-to-new slot table.
    Show,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .init();

    let cli = Cli::parse();
    let text = fs::read_to_string(&cli.map)
        .with_context(|| format!("failed to read layer map at {}", cli.map.display()))?;
    let artifact = LayerMapArtifact::from_json(&text)
        .with_context(|| format!("invalid layer map artifact at {}", cli.map.display()))?;
    debug!(map = %cli.map.display(), "layer map loaded");

    match cli.command {
        Command::Layer { index } => {
            println!("{} -> {}", index, artifact.transform_layer(index));
        }
        Command::Mask { mask } => {
            let value = parse_mask(&mask)?;
            println!("{:#010x} -> {:#010x}", value, artifact.transform_mask(value));
        }
        Command::Show => {
            for (old, new) in artifact.slots().iter().enumerate() {
                println!("{old:>2} -> {new:>2}");
            }
        }
    }
    Ok(())
}

fn parse_mask(text: &str) -> Result<u32> {
    let trimmed = text.trim();
    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        u32::from_str_radix(hex, 16).with_context(|| format!("invalid hex mask: {trimmed}"))
    } else {
        trimmed
            .parse::<u32>()
            .with_context(|| format!("invalid mask: {trimmed}"))
    }
}
