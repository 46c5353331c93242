mod file;

use anyhow::{Context, Result};
use clap::Parser;
use file::{GraphFile, OrderedPositions};
use nodegraph_layout::{compute_layout, Direction, LayoutConfig, Mode};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Lay out a node graph described in a RON file and print node positions
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Graph description (RON)
    input: PathBuf,

    /// Write positions to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Flow direction, overrides the file's config
    #[arg(short, long)]
    direction: Option<Direction>,

    /// Layout mode (full or incremental), overrides the file's config
    #[arg(short, long)]
    mode: Option<Mode>,

    #[arg(long)]
    horizontal_spacing: Option<u32>,

    #[arg(long)]
    vertical_spacing: Option<u32>,

    /// Collapse pure data inputs next to the execution node they feed
    #[arg(long)]
    group_data_inputs: bool,
}

impl Args {
    /// Apply command line overrides on top of a configuration
    fn apply(&self, config: &mut LayoutConfig) {
        if let Some(direction) = self.direction {
            config.direction = direction;
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(spacing) = self.horizontal_spacing {
            config.horizontal_spacing = spacing;
        }
        if let Some(spacing) = self.vertical_spacing {
            config.vertical_spacing = spacing;
        }
        if self.group_data_inputs {
            config.group_data_inputs = true;
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let mut graph = GraphFile::load(&args.input)
        .with_context(|| format!("Failed to load graph from {:?}", args.input))?;
    args.apply(&mut graph.config);
    debug!("Layout config: {:?}", graph.config);

    let positions = compute_layout(&graph.nodes, &graph.config, &graph.existing);
    let ordered = OrderedPositions::new(&graph.nodes, &positions);
    info!(
        "Placed {} of {} node(s) ({}, {})",
        ordered.len(),
        graph.nodes.len(),
        graph.config.direction,
        graph.config.mode
    );

    let text = ordered.to_ron().context("Failed to serialize positions")?;
    match &args.output {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("Failed to write positions to {path:?}"))?,
        None => println!("{text}"),
    }

    Ok(())
}
