//! Extract command - turn pending PDFs into JSON records.

use super::{display_name, progress_bar, runtime};
use anyhow::{Context, Result};
use colored::Colorize;
use docflow_config::Config;
use docflow_core::DocumentType;
use docflow_ingest::{
    BatchPipeline, Classifier, ExtractionReport, FieldExtractor, FileOutcome, FileReport,
    PdfTextExtractor,
};
use docflow_llm::{GeminiClient, TextGenerator};
use std::sync::Arc;

pub fn run(config: &Config, strict: bool) -> Result<()> {
    // Missing credentials stop the stage before any file is touched.
    let api_key = config.gemini_api_key()?;
    let gemini = GeminiClient::from_config(&config.gemini, api_key)
        .context("Failed to create Gemini client")?;
    let generator: Arc<dyn TextGenerator> = Arc::new(gemini);

    let pipeline = BatchPipeline::new(
        Arc::new(PdfTextExtractor::new()),
        Classifier::new(generator.clone(), config.gemini.sample_chars),
        FieldExtractor::new(generator),
        config.paths.clone(),
    );

    pipeline
        .prepare_dirs()
        .context("Failed to create working directories")?;
    let files = pipeline.pending_files()?;

    println!(
        "{} {} ({} PDF files)",
        "Extracting:".cyan().bold(),
        config.paths.pdf_dir.display(),
        files.len()
    );

    if files.is_empty() {
        println!(
            "{} No PDF files to process. Put documents into {}",
            "Note:".yellow(),
            config.paths.pdf_dir.display()
        );
        return Ok(());
    }

    let rt = runtime()?;
    let pb = progress_bar(files.len())?;
    let report = rt.block_on(pipeline.process_files(&files, |file| {
        pb.println(outcome_line(file));
        pb.inc(1);
    }));
    pb.finish_and_clear();

    print_summary(&report);

    if strict && !report.is_clean() {
        anyhow::bail!(
            "{} of {} files were not stored",
            report.total() - report.stored(),
            report.total()
        );
    }

    Ok(())
}

fn outcome_line(file: &FileReport) -> String {
    let name = display_name(&file.file);
    match &file.outcome {
        FileOutcome::Stored { doc_type, output } => format!(
            "  {} {} → {} ({})",
            "✓".green(),
            name,
            output.display(),
            doc_type
        ),
        FileOutcome::SkippedEmpty => {
            format!("  {} {} (no text on the first page)", "↷".yellow(), name)
        }
        FileOutcome::SkippedUnclassified => {
            format!("  {} {} (not recognised as invoice or contract)", "↷".yellow(), name)
        }
        FileOutcome::FailedExtraction { reason } => {
            format!("  {} {} (extraction failed: {})", "✗".red(), name, reason)
        }
        FileOutcome::FailedWrite { reason } => {
            format!("  {} {} (could not save record: {})", "✗".red(), name, reason)
        }
    }
}

fn print_summary(report: &ExtractionReport) {
    println!();
    println!(
        "{} {} invoices, {} contracts",
        "Stored:".green().bold(),
        report.stored_as(DocumentType::Invoice),
        report.stored_as(DocumentType::Contract)
    );
    if report.skipped() > 0 {
        println!(
            "{} {} (left in place for review)",
            "Skipped:".yellow(),
            report.skipped()
        );
    }
    if report.failed() > 0 {
        println!("{} {}", "Failed:".red(), report.failed());
    }
}
