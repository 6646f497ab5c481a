//! # topodeath — headless trial runner
//!
//! Runs one trial without a display and appends the result to a CSV log.
//! The observer is either simulated (rate-of-change heuristic) or a person
//! pressing Enter on stdin.
//!
//! ```text
//! topodeath --observer                          # simulated observer
//! topodeath --interactive --output results.csv  # Enter = "it's dying"
//! topodeath --config trial.json --append
//! topodeath --summarize --output results.csv    # mean/median delta_t, no trial
//! ```

use std::fs::File;
use std::io::BufRead;
use std::path::PathBuf;

use clap::Parser;

use topodeath::experiment::{signal_slot, ExperimentConfig, Outcome};
use topodeath::export::{summarize, ResultsLog};
use topodeath::pipeline::TransformVariant;
use topodeath::runner::{Experiment, LogSink};
use topodeath::Result;

#[derive(Parser)]
#[command(name = "topodeath")]
#[command(about = "Race a human observer against a topological death detector")]
struct Cli {
    /// JSON configuration file; unset fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Results CSV
    #[arg(long, default_value = "results.csv")]
    output: PathBuf,

    /// Append to an existing results file instead of truncating it
    #[arg(long)]
    append: bool,

    /// Override the RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Monitored transform
    #[arg(long, value_enum)]
    variant: Option<TransformVariant>,

    /// Let the rate-of-change heuristic answer inside the PREDICT window
    #[arg(long)]
    observer: bool,

    /// Treat every line on stdin as an observer signal
    #[arg(long)]
    interactive: bool,

    /// Log every n-th tick at debug level
    #[arg(long, default_value = "20")]
    log_every: u64,

    /// Summarize delta_t over the results file and exit without running
    #[arg(long)]
    summarize: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("topodeath=info")),
        )
        .init();

    let cli = Cli::parse();

    if cli.summarize {
        match summarize(File::open(&cli.output)?)? {
            Some(summary) => {
                println!("anticipated trials : {}", summary.count);
                println!("mean delta_t       : {:.4}", summary.mean);
                println!("median delta_t     : {:.4}", summary.median);
            }
            None => println!("no anticipated trials in {}", cli.output.display()),
        }
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => ExperimentConfig::load(path)?,
        None => ExperimentConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(variant) = cli.variant {
        config.variant = variant;
    }
    let observer = cli.observer.then_some(config.observer);
    let variant = config.variant;

    let experiment = Experiment::from_config(config)?;
    let (sender, signals) = signal_slot();

    if cli.interactive {
        println!("Press Enter when the structure looks dead.");
        std::thread::spawn(move || {
            for line in std::io::stdin().lock().lines() {
                if line.is_err() {
                    break;
                }
                sender.signal();
            }
        });
    }

    let record = experiment.run(&mut LogSink::new(cli.log_every), signals, observer)?;

    let log = if cli.append {
        ResultsLog::open(&cli.output)?
    } else {
        ResultsLog::create(&cli.output)?
    };
    log.append(variant.label(), &record)?;

    println!("\n==== RESULT ====");
    println!("t_real   : {}", record.t_death.map_or("none".to_string(), |t| format!("{t:.3}")));
    println!("t_human  : {}", record.t_human.time());
    println!("outcome  : {}", record.outcome);
    if record.outcome == Outcome::HumanAnticipated {
        if let Some(dt) = record.delta_t {
            println!("delta_t  : {dt:.3}");
        }
    }

    Ok(())
}
