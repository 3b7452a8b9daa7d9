//! CLI command implementations.

pub mod ask;
pub mod config;
pub mod extract;
pub mod index;
pub mod init;
pub mod run;
pub mod serve;
pub mod stats;

use anyhow::{Context, Result};
use colored::Colorize;
use docflow_config::Config;
use docflow_db::Database;
use docflow_llm::OllamaClient;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tokio::runtime::Runtime;

/// Create the async runtime a command blocks on.
pub fn runtime() -> Result<Runtime> {
    Runtime::new().context("Failed to create async runtime")
}

/// Open the document store named by the configuration.
pub fn open_database(config: &Config) -> Result<Database> {
    Database::open(&config.store.path).with_context(|| {
        format!(
            "Failed to open document store at {}",
            config.store.path.display()
        )
    })
}

/// Warn when Ollama is down or `model` has not been pulled.
///
/// Returns whether the model is ready to use.
pub fn check_model(rt: &Runtime, client: &OllamaClient, model: &str) -> bool {
    if !rt.block_on(client.is_available()) {
        println!(
            "{} Ollama is not reachable at {}. Start it with 'ollama serve'.",
            "Warning:".yellow().bold(),
            client.host()
        );
        return false;
    }

    match rt.block_on(client.has_model(model)) {
        Ok(true) => true,
        Ok(false) => {
            println!(
                "{} Model '{}' is not available. Run: {}",
                "Warning:".yellow().bold(),
                model,
                format!("ollama pull {}", model).cyan()
            );
            false
        }
        Err(e) => {
            tracing::warn!("Could not list Ollama models: {}", e);
            false
        }
    }
}

/// Progress bar for a per-file stage; lines go through `pb.println`.
pub fn progress_bar(len: usize) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("█▓░"),
    );
    Ok(pb)
}

/// File name for display, falling back to the full path.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Format a file size in human-readable form.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
