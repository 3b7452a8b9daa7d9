//! Serve command - answer questions over HTTP.

use super::{check_model, open_database, runtime};
use anyhow::{Context, Result};
use colored::Colorize;
use docflow_config::Config;
use docflow_llm::{OllamaClient, OllamaGenerator};
use docflow_server::{AppState, QueryService};
use std::sync::Arc;

/// Build the Query Service over the configured store and local model.
pub fn query_service(config: &Config) -> Result<(QueryService, OllamaClient)> {
    let db = open_database(config)?;
    let client = OllamaClient::from_config(&config.ollama).context("Failed to create Ollama client")?;
    let generator = OllamaGenerator::new(client.clone(), &config.ollama.model);

    let service = QueryService::from_database(&db, Arc::new(generator))
        .context("Failed to open document collections")?;
    Ok((service, client))
}

pub fn run(config: &Config, bind: Option<String>) -> Result<()> {
    let bind = bind.unwrap_or_else(|| config.server.bind.clone());
    let (service, client) = query_service(config)?;
    let (invoices, contracts) = service.counts();

    println!("{}", "Starting query service".cyan().bold());
    println!("  Documents: {} invoices, {} contracts", invoices, contracts);
    println!("  Model: {} at {}", config.ollama.model, config.ollama.host);
    println!("  Open {} in a browser", format!("http://{}", bind).cyan());
    println!("  Press Ctrl-C to stop");

    let rt = runtime()?;
    check_model(&rt, &client, &config.ollama.model);

    let state = AppState::new(Arc::new(service), Some(client));
    rt.block_on(docflow_server::serve(&bind, state))
        .with_context(|| format!("Query service failed on {}", bind))
}
