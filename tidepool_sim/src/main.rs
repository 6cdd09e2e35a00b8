//! Tidepool CLI
//!
//! Runs the predator/prey ocean across in-process ranks and reports totals.

use clap::Parser;
use std::sync::Arc;
use tidepool_env::SystemContext;
use tidepool_sim::{SimConfig, SimError, SimWorld, Speed};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Tidepool predator/prey stencil simulator
#[derive(Parser, Debug)]
#[command(name = "tidepool")]
#[command(about = "Run the partitioned predator/prey ocean", long_about = None)]
struct Args {
    /// Logical columns
    #[arg(short = 'W', long, default_value = "2048")]
    width: usize,

    /// Logical rows
    #[arg(short = 'H', long, default_value = "1024")]
    height: usize,

    /// Generations to run
    #[arg(short, long, default_value = "500")]
    generations: u64,

    /// Number of cooperating processes (ranks)
    #[arg(short, long, default_value = "4")]
    procs: usize,

    /// Worker threads per process
    #[arg(short, long, default_value = "4")]
    threads: usize,

    /// Reporting preset (fast, medium, slow)
    #[arg(long, default_value = "fast", conflicts_with = "interval")]
    speed: Speed,

    /// Report every Nth generation (overrides --speed)
    #[arg(short, long)]
    interval: Option<u64>,

    /// Print an ASCII frame with each report
    #[arg(short, long)]
    display: bool,

    /// Master seed for determinism (0 = random from OS entropy)
    #[arg(short, long, default_value = "0")]
    seed: u64,

    /// Envelopes buffered per link
    #[arg(long, default_value = "4")]
    capacity: usize,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON summary on stdout
    #[arg(long)]
    json: bool,

    /// Export the run summary to a JSON file
    #[arg(long)]
    export: Option<String>,
}

impl Args {
    fn config(&self) -> SimConfig {
        let config = SimConfig {
            width: self.width,
            height: self.height,
            generations: self.generations,
            procs: self.procs,
            threads: self.threads,
            display: self.display,
            channel_capacity: self.capacity,
            ..Default::default()
        }
        .with_speed(self.speed);

        match self.interval {
            Some(report_interval) => SimConfig {
                report_interval,
                ..config
            },
            None => config,
        }
    }
}

async fn run(args: &Args) -> Result<(), SimError> {
    let context = if args.seed == 0 {
        Arc::new(SystemContext::new())
    } else {
        SystemContext::shared(args.seed)
    };

    let world = SimWorld::new(args.config(), context)?;
    let summary = world.run().await?;

    if let Some(path) = &args.export {
        summary.write_to_file(path)?;
        info!("Exported {} reports to {}", summary.reports.len(), path);
    }

    if args.json {
        let json = serde_json::to_string_pretty(&summary).map_err(std::io::Error::from)?;
        println!("{}", json);
        return Ok(());
    }

    for report in &summary.reports {
        println!(
            "generation {:>6}: {:>9} prey, {:>9} predators",
            report.generation, report.prey, report.predators
        );
        if let Some(frame) = &report.frame {
            println!("{}", frame);
        }
    }

    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!(
        "{} generations on {} ranks x {} threads in {:.3}s (seed={})",
        summary.generations, summary.procs, summary.threads, summary.elapsed_secs, summary.seed
    );
    info!(
        "Final population: {} prey, {} predators ({} messages)",
        summary.final_population.prey, summary.final_population.predators, summary.messages_sent
    );
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    if !args.json {
        info!("Tidepool v{}", env!("CARGO_PKG_VERSION"));
    }

    if let Err(e) = run(&args).await {
        error!("{}", e);
        std::process::exit(1);
    }
}
