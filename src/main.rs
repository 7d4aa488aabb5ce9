use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;

use fraudscope_io::{ExperimentName, ResultWriter};
use fraudscope_pipeline::{Pipeline, PipelineConfig};

#[derive(Parser)]
#[command(name = "fraudscope")]
#[command(about = "Fraud classification: clean, split, train, tune and evaluate a random forest")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for the split, the forests and the CV folds
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,

    /// Input field delimiter (a single ASCII character)
    #[arg(long, default_value_t = ',', global = true)]
    delimiter: char,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full workflow and write the JSON report and ROC chart
    Run {
        /// Path to the input CSV file
        #[arg(long)]
        data: PathBuf,

        /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        experiment: String,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Share of rows held out for testing
        #[arg(long, default_value_t = 0.3)]
        test_fraction: f64,

        /// Number of cross-validation folds for the grid search
        #[arg(long, default_value_t = 3)]
        cv_folds: usize,
    },

    /// Load and clean the data, then print missing values, outliers and VIF
    Inspect {
        /// Path to the input CSV file
        #[arg(long)]
        data: PathBuf,
    },
}

fn parse_delimiter(c: char) -> Result<u8> {
    if !c.is_ascii() {
        bail!("delimiter must be a single ASCII character, got {c:?}");
    }
    Ok(c as u8)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    let config = PipelineConfig::new()
        .with_seed(cli.seed)
        .with_delimiter(parse_delimiter(cli.delimiter)?);

    match cli.command {
        Command::Run {
            data,
            experiment,
            output_dir,
            test_fraction,
            cv_folds,
        } => {
            let experiment_name = ExperimentName::new(experiment)?;
            let pipeline = Pipeline::new(
                config
                    .with_test_fraction(test_fraction)
                    .with_cv_folds(cv_folds),
            );

            let report = pipeline
                .run(&data)
                .with_context(|| format!("pipeline failed on {}", data.display()))?;

            let writer = ResultWriter::new(&output_dir, experiment_name)?;
            let (report_path, roc_path) = report.write_artifacts(&writer)?;

            if !cli.quiet {
                print!("{report}");
                println!();
                println!("Report written to {}", report_path.display());
                println!("ROC chart written to {}", roc_path.display());
            }
        }

        Command::Inspect { data } => {
            let report = Pipeline::new(config)
                .inspect(&data)
                .with_context(|| format!("inspection failed on {}", data.display()))?;
            if !cli.quiet {
                print!("{report}");
            }
        }
    }

    Ok(())
}
