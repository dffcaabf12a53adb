use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use footpath::{OutputFormat, Recorder, Scenario, SimConfig};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scenario to run (see --list-scenarios)
    #[arg(long, default_value = "flat")]
    scenario: String,

    /// Number of ticks to simulate (overrides the config)
    #[arg(long)]
    ticks: Option<u32>,

    /// Milliseconds per tick (overrides the config)
    #[arg(long)]
    dt: Option<f32>,

    /// Base seed for every mob's generator (overrides the config)
    #[arg(long)]
    seed: Option<u64>,

    /// Output format (overrides the config)
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Config file in RON format (default: ./footpath.ron if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// List available scenarios
    #[arg(long)]
    list_scenarios: bool,

    /// Only print the summary, not every frame
    #[arg(long)]
    summary_only: bool,

    /// Log at debug level regardless of RUST_LOG
    #[arg(long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if args.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    // Handle --list-scenarios flag
    if args.list_scenarios {
        for (name, description) in Scenario::catalog() {
            println!("{:<8} {}", name, description);
        }
        return Ok(());
    }

    let mut config = SimConfig::load(args.config.as_deref())?;
    if let Some(ticks) = args.ticks {
        config.run.ticks = ticks;
    }
    if let Some(dt) = args.dt {
        config.run.dt_ms = dt;
    }
    if let Some(seed) = args.seed {
        config.run.seed = seed;
    }
    if let Some(format) = args.format {
        config.run.format = format;
    }
    config.validate()?;

    let scenario = Scenario::by_name(&args.scenario)?;
    log::info!(
        "Running '{}' for {} ticks at {:.2} ms (seed {})",
        scenario.name,
        config.run.ticks,
        config.run.dt_ms,
        config.run.seed
    );

    let format = config.run.format;
    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    let mut recorder = Recorder::new(scenario, &config);
    recorder.run(config.run.ticks, |frame| {
        if args.summary_only {
            return Ok(());
        }
        frame.write(&mut out, format)
    })?;

    if format == OutputFormat::Text && !args.summary_only {
        writeln!(out)?;
    }
    recorder.summary().write(&mut out, format)?;
    out.flush().context("Failed to flush output")?;
    Ok(())
}
