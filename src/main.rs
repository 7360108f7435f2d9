use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use dq_pipeline::commands::config::{resolve_config, PipelineConfig};
use dq_pipeline::commands::{check, render, run};
use dq_pipeline::display;
use dq_pipeline::warehouse::BigQueryClient;

/// dqp CLI - bronze/silver/gold SQL runner with data-quality checks
#[derive(Parser)]
#[clap(name = "dqp", about = "Run SQL transformations and data-quality checks on BigQuery", version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Args)]
struct ConfigArgs {
    /// Path to the pipeline configuration (defaults to ./pipeline.yaml when present)
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Project identifier; overrides PROJECT_ID and the config file
    #[clap(short, long)]
    project: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Run every transformation file, then the data-quality checks
    Run {
        #[clap(flatten)]
        config: ConfigArgs,
    },

    /// Run only the data-quality checks
    Check {
        #[clap(flatten)]
        config: ConfigArgs,

        /// DQ file to run instead of the configured one
        #[clap(short, long)]
        dq_file: Option<PathBuf>,
    },

    /// Print SQL files after project substitution, without running them
    Render {
        #[clap(flatten)]
        config: ConfigArgs,

        /// Files to render (defaults to every configured file)
        files: Vec<PathBuf>,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = execute(cli.command) {
        eprintln!("Error: {:#}", err);
        process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn execute(command: Command) -> Result<()> {
    match command {
        Command::Run { config } => {
            let config = load_config(config)?;
            let client = connect(&config)?;
            run::run_pipeline(&client, &config, &mut io::stdout().lock())?;
        }
        Command::Check { config, dq_file } => {
            let mut config = load_config(config)?;
            if let Some(dq_file) = dq_file {
                config.dq_file = dq_file;
            }
            let client = connect(&config)?;
            check::run_dq_checks(&client, &config, &mut io::stdout().lock())?;
        }
        Command::Render { config, files } => {
            let config = load_config(config)?;
            render::render_command(&config, &files, &mut io::stdout().lock())?;
        }
        Command::Version => display::display_version(),
    }
    Ok(())
}

fn load_config(args: ConfigArgs) -> Result<PipelineConfig> {
    resolve_config(args.config.as_deref(), args.project).context("Could not load pipeline configuration")
}

fn connect(config: &PipelineConfig) -> Result<BigQueryClient> {
    BigQueryClient::connect(&config.project_id, config.location.as_deref())
        .with_context(|| format!("Could not create BigQuery client for project {}", config.project_id))
}
