//! Initialize Docflow in the working directory.

use super::open_database;
use anyhow::{Context, Result};
use colored::Colorize;
use docflow_config::{Config, LOCAL_CONFIG_FILE};
use docflow_core::DocumentType;
use std::path::{Path, PathBuf};

pub fn run(config: &Config, explicit: Option<&Path>) -> Result<()> {
    println!("{}", "Initializing Docflow...".cyan().bold());

    let config_file = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE));
    if config_file.exists() {
        println!(
            "  {} Config already exists: {}",
            "↷".yellow(),
            config_file.display()
        );
    } else {
        Config::create_default_file(&config_file).context("Failed to create config file")?;
        println!("  {} Created config: {}", "✓".green(), config_file.display());
    }

    for dir in [
        &config.paths.pdf_dir,
        &config.paths.invoices_dir,
        &config.paths.contracts_dir,
    ] {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    println!("  {} Created working directories", "✓".green());

    let db = open_database(config)?;
    for doc_type in DocumentType::ALL {
        db.get_or_create_collection(doc_type.collection_name())?;
    }
    println!(
        "  {} Document store ready: {}",
        "✓".green(),
        config.store.path.display()
    );

    println!();
    println!("{}", "Docflow initialized successfully!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Set {} in the environment or a .env file", "GOOGLE_API_KEY".cyan());
    println!(
        "  2. Put PDF documents into {}",
        config.paths.pdf_dir.display().to_string().cyan()
    );
    println!("  3. Process and serve them: {}", "docflow run".cyan());

    Ok(())
}
