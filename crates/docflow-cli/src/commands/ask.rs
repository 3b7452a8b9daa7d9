//! Ask command - one question, answered from every stored document.

use super::{runtime, serve::query_service};
use anyhow::Result;
use colored::Colorize;
use docflow_config::Config;

pub fn run(config: &Config, question: &str) -> Result<()> {
    let question = question.trim();
    if question.is_empty() {
        anyhow::bail!("Question is empty");
    }

    let (service, _) = query_service(config)?;
    let (invoices, contracts) = service.counts();
    println!(
        "{} {} invoices, {} contracts as context",
        "Asking:".cyan().bold(),
        invoices,
        contracts
    );

    let rt = runtime()?;
    let answer = rt.block_on(service.answer(question))?;

    println!();
    println!("{}", answer);
    Ok(())
}
