//! Docflow CLI - Turn business PDFs into searchable, answerable records

mod commands;
mod sequencer;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use docflow_config::Config;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Docflow - classify, extract, index and query business documents
#[derive(Parser)]
#[command(name = "docflow")]
#[command(version)]
#[command(about = "Classify, extract, index and query business documents", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to a config file (default: ./docflow.toml, then the user config dir)
    #[arg(short, long, global = true, env = "DOCFLOW_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the config file, working directories and document store
    Init,

    /// Classify PDFs and extract their fields into JSON records
    Extract {
        /// Fail when any file is skipped or fails
        #[arg(long)]
        strict: bool,
    },

    /// Embed JSON records into the document store
    Index {
        /// Fail when any record fails to index
        #[arg(long)]
        strict: bool,
    },

    /// Start the question answering server
    Serve {
        /// Address to listen on (default: from config)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Run extract, index and serve in sequence, stopping at the first failure
    Run {
        /// Treat per-file failures as stage failures
        #[arg(long)]
        strict: bool,

        /// Address for the server stage (default: from config)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Answer one question from the stored documents
    Ask {
        /// Your question
        question: String,
    },

    /// Show document store statistics
    Stats,

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration
    Show,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("docflow=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("docflow=info,warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn execute(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    tracing::debug!(
        "Using store {} and PDFs from {}",
        config.store.path.display(),
        config.paths.pdf_dir.display()
    );

    match cli.command {
        Commands::Init => commands::init::run(&config, cli.config.as_deref()),
        Commands::Extract { strict } => commands::extract::run(&config, strict),
        Commands::Index { strict } => commands::index::run(&config, strict),
        Commands::Serve { bind } => commands::serve::run(&config, bind),
        Commands::Run { strict, bind } => commands::run::run(&config, strict, bind),
        Commands::Ask { question } => commands::ask::run(&config, &question),
        Commands::Stats => commands::stats::run(&config),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => commands::config::show(&config),
        },
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = execute(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
