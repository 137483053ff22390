use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::*;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use interlocking_exporter::config::APP_NAME;
use interlocking_exporter::{file, ExportConfig, Exporter, Placement, RouteExport, TopologyExport};

/// Export a track topology for the interlocking UI
#[derive(Parser)]
#[command(name = "interlocking-exporter")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Export settings (TOML). Defaults to the user configuration.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Merge plain connector nodes before exporting
    #[arg(long)]
    simplify: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Write the export here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Topology document (JSON)
    input: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Inventory of edges, nodes, points, signals and sections
    Topology,
    /// Branch assignment of points and item order of edges
    Placement,
    /// Element states needed by every route
    Routes,
    /// All of the above in one object
    All,
}

#[derive(Serialize)]
struct FullExport {
    topology: TopologyExport,
    placement: Placement,
    routes: Vec<RouteExport>,
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<ExportConfig> {
    match path {
        Some(path) => {
            let data = fs::read_to_string(path).with_context(|| format!("reading config {:?}", path))?;
            ExportConfig::from_toml(&data).with_context(|| format!("parsing config {:?}", path))
        }
        None => confy::load(APP_NAME).context("loading user configuration"),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = load_config(cli.config.as_ref())?;
    if cli.simplify {
        config.simplify = true;
    }
    debug!("Export configuration: {:?}", config);

    let topology = file::load(&cli.input).with_context(|| format!("loading topology {:?}", cli.input))?;
    let mut exporter = Exporter::new(topology, config)?;
    let output = cli.output.as_deref();

    match cli.command {
        Command::Topology => file::dump_json(output, &exporter.export_topology()?)?,
        Command::Placement => {
            // placement items refer to the axle counting heads created here
            exporter.export_topology()?;
            file::dump_json(output, &exporter.export_placement()?)?
        }
        Command::Routes => file::dump_json(output, &exporter.export_routes()?)?,
        Command::All => {
            let topology = exporter.export_topology()?;
            let export = FullExport {
                topology,
                placement: exporter.export_placement()?,
                routes: exporter.export_routes()?,
            };
            file::dump_json(output, &export)?
        }
    }
    Ok(())
}
