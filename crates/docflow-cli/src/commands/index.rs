//! Index command - embed JSON records into the document store.

use super::{check_model, display_name, open_database, progress_bar, runtime};
use anyhow::{Context, Result};
use colored::Colorize;
use docflow_config::Config;
use docflow_ingest::{IndexFileReport, IndexOutcome, IndexReport, Indexer};
use docflow_llm::{OllamaClient, OllamaEmbedder};
use std::sync::Arc;

pub fn run(config: &Config, strict: bool) -> Result<()> {
    let db = open_database(config)?;
    let client = OllamaClient::from_config(&config.ollama).context("Failed to create Ollama client")?;
    let rt = runtime()?;

    let indexer = Indexer::new(
        db,
        Arc::new(OllamaEmbedder::new(client.clone(), &config.ollama.embedding_model)),
        config.paths.clone(),
    );
    let files = indexer.all_pending()?;

    println!(
        "{} {} JSON records pending",
        "Indexing:".cyan().bold(),
        files.len()
    );

    if !files.is_empty() && !check_model(&rt, &client, &config.ollama.embedding_model) {
        println!("  Records that cannot be embedded are kept for the next run.");
    }

    let pb = progress_bar(files.len())?;
    let report = rt.block_on(indexer.process_files(&files, |file| {
        pb.println(outcome_line(file));
        pb.inc(1);
    }))?;
    pb.finish_and_clear();

    print_summary(&report);

    if strict && report.failed() > 0 {
        anyhow::bail!("{} records failed to index", report.failed());
    }

    Ok(())
}

fn outcome_line(file: &IndexFileReport) -> String {
    let name = display_name(&file.file);
    match &file.outcome {
        IndexOutcome::Indexed { id } => {
            format!("  {} {} → {} '{}'", "✓".green(), name, file.doc_type, id)
        }
        IndexOutcome::AlreadyIndexed { id } => {
            format!("  {} {} ('{}' is already indexed)", "↷".yellow(), name, id)
        }
        IndexOutcome::Failed { reason } => {
            format!("  {} {} ({})", "✗".red(), name, reason)
        }
    }
}

fn print_summary(report: &IndexReport) {
    println!();
    println!(
        "{} {} indexed, {} already present, {} failed",
        "Done:".green().bold(),
        report.indexed(),
        report.already_indexed(),
        report.failed()
    );
    println!("  Invoices in store: {}", report.invoice_count);
    println!("  Contracts in store: {}", report.contract_count);
}
