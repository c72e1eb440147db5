use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use usb_topology::{report, system_mapper, TopologyConfig};

#[derive(Parser)]
#[command(author, version, long_about = None)]
#[command(name = "usb-topology")]
#[command(about = "Show which hub and port each USB device is plugged into")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    limits: Limits,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args)]
struct Limits {
    /// Maximum number of records to keep from one scan
    #[arg(long, env = "USB_TOPOLOGY_CAPACITY", global = true)]
    capacity: Option<usize>,

    /// Keep every record regardless of count; overrides --capacity
    #[arg(long, global = true)]
    unbounded: bool,
}

impl Limits {
    fn config(&self) -> TopologyConfig {
        if self.unbounded {
            TopologyConfig::unbounded()
        } else if let Some(capacity) = self.capacity {
            TopologyConfig::default().with_capacity(Some(capacity))
        } else {
            TopologyConfig::default()
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print attached devices grouped by hub (default)
    List,
    /// Print the snapshot as JSON
    Json {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mapper = system_mapper(cli.limits.config())?;
    let snapshot = mapper.enumerate()?;

    match cli.command.unwrap_or(Commands::List) {
        Commands::List => print!("{}", report::render_table(&snapshot)),
        Commands::Json { output: Some(path) } => {
            report::save_json(&snapshot, &path)?;
            eprintln!("Topology saved to {}", path.display());
        }
        Commands::Json { output: None } => println!("{}", report::to_json(&snapshot)?),
    }

    Ok(())
}
