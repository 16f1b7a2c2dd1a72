//! PatternLab Simulator CLI
//!
//! Run the seeded pattern scenarios and report which ones hold.

use clap::Parser;
use patternlab_core::SortAlgorithm;
use patternlab_sim::{LabConfig, LabWorld, ScenarioId, SimError, WorldRun};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// PatternLab deterministic simulation CLI
#[derive(Parser, Debug)]
#[command(name = "patternlab-sim")]
#[command(about = "Run seeded, self-checking simulations of the PatternLab engines", long_about = None)]
struct Args {
    /// Master seed for determinism (0 = random from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Scenario to run (strategy, command, state, observer, proxy, builder,
    /// decorator, factory, singleton, adapter, all)
    #[arg(short = 'S', long, default_value = "all")]
    scenario: String,

    /// Number of consecutive seeds to test (for CI mode)
    #[arg(long, default_value = "1")]
    seeds: usize,

    /// Length of the seeded sort input
    #[arg(short, long, default_value = "10")]
    len: usize,

    /// Sort algorithm whose trace is played back (bubble, quick, merge)
    #[arg(short, long, default_value = "bubble")]
    algorithm: SortAlgorithm,

    /// Delay between playback frames in milliseconds
    #[arg(long, default_value = "100")]
    playback_ms: u64,

    /// Persist learner progress in a sled database at this path
    #[arg(long)]
    progress_db: Option<PathBuf>,

    /// Export the trace of a single scenario to this JSON file
    #[arg(long)]
    export: Option<PathBuf>,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn lab_config(&self) -> LabConfig {
        LabConfig {
            seed: base_seed(self.seed),
            seeds: self.seeds.max(1),
            sequence_len: self.len,
            algorithm: self.algorithm,
            playback_delay: Duration::from_millis(self.playback_ms),
            progress_db: self.progress_db.clone(),
            export: self.export.clone(),
            ..Default::default()
        }
    }
}

fn base_seed(seed: u64) -> u64 {
    if seed != 0 {
        return seed;
    }
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(42)
}

fn parse_scenarios(name: &str) -> Result<Vec<ScenarioId>, SimError> {
    if name == "all" {
        return Ok(ScenarioId::all());
    }
    name.parse::<ScenarioId>()
        .map(|scenario| vec![scenario])
        .map_err(SimError::InvalidConfig)
}

/// Runs everything and returns the completed runs.
async fn run(config: LabConfig, scenarios: &[ScenarioId], quiet: bool) -> Result<Summary, SimError> {
    if config.export.is_some() && (scenarios.len() > 1 || config.seeds > 1) {
        return Err(SimError::InvalidConfig(
            "--export only supports a single scenario and seed".to_string(),
        ));
    }

    let mut world = LabWorld::new(config.clone())?;
    world.sign_in()?;

    let mut runs: Vec<WorldRun> = Vec::new();
    for seed_offset in 0..config.seeds {
        let seed = config.seed.wrapping_add(seed_offset as u64);

        for scenario in scenarios {
            let run = world.run_scenario(*scenario, seed).await?;
            let result = &run.result;

            if !quiet {
                if result.passed {
                    info!("✓ {} (seed={}) PASSED", scenario.name(), seed);
                } else {
                    error!(
                        "✗ {} (seed={}) FAILED: {}",
                        scenario.name(),
                        seed,
                        result.failure_reason.as_deref().unwrap_or("unknown")
                    );
                }
            }
            runs.push(run);
        }
    }

    if let (Some(path), Some(run)) = (&config.export, runs.first()) {
        run.export.write_to_file(path)?;
        info!("Exported {} frames to {}", run.export.frames.len(), path.display());
    }

    let progress = world.progress().await?;
    Ok(Summary { runs, progress })
}

struct Summary {
    runs: Vec<WorldRun>,
    progress: patternlab_env::ProgressStats,
}

impl Summary {
    fn failed(&self) -> usize {
        self.runs.iter().filter(|r| !r.result.passed).count()
    }

    fn to_json(&self) -> serde_json::Value {
        let total = self.runs.len();
        serde_json::json!({
            "total": total,
            "passed": total - self.failed(),
            "failed": self.failed(),
            "progress": self.progress,
            "results": self.runs.iter().map(|run| {
                let r = &run.result;
                serde_json::json!({
                    "scenario": r.scenario.name(),
                    "seed": r.seed,
                    "passed": r.passed,
                    "checks": r.metrics.checks,
                    "frames": r.metrics.frames,
                    "progress_recorded": run.progress_recorded,
                    "failure_reason": r.failure_reason,
                })
            }).collect::<Vec<_>>(),
        })
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if !args.json {
        info!("PatternLab Simulator v{}", env!("CARGO_PKG_VERSION"));
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    let scenarios = match parse_scenarios(&args.scenario) {
        Ok(scenarios) => scenarios,
        Err(e) => {
            error!("{}", e);
            error!("Available scenarios: strategy, command, state, observer, proxy, builder, decorator, factory, singleton, adapter, all");
            std::process::exit(1);
        }
    };

    let summary = match run(args.lab_config(), &scenarios, args.json).await {
        Ok(summary) => summary,
        Err(e) => {
            error!("Simulation aborted: {}", e);
            std::process::exit(1);
        }
    };

    let failed = summary.failed();
    let total = summary.runs.len();

    if args.json {
        match serde_json::to_string_pretty(&summary.to_json()) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("Failed to encode summary: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        info!("");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        if failed == 0 {
            info!("✅ All {} scenario runs passed!", total);
        } else {
            error!("❌ {}/{} scenario runs failed!", failed, total);

            for run in &summary.runs {
                let result = &run.result;
                if !result.passed {
                    error!(
                        "  - {} seed={}: {}",
                        result.scenario.name(),
                        result.seed,
                        result.failure_reason.as_deref().unwrap_or("unknown")
                    );
                }
            }
        }

        let progress = &summary.progress;
        info!(
            "Progress: {}/{} completed ({:.0}%), {} in progress, {} not started",
            progress.completed,
            progress.total,
            progress.completed_percent(),
            progress.in_progress,
            progress.not_started
        );
    }

    // Exit with proper code for CI
    if failed > 0 {
        std::process::exit(1);
    }
}
