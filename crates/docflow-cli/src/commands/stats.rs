//! Stats command - show document store statistics.

use super::{format_size, open_database};
use anyhow::Result;
use colored::Colorize;
use docflow_config::Config;
use docflow_core::DocumentType;
use docflow_db::Database;
use std::path::Path;
use walkdir::WalkDir;

pub fn run(config: &Config) -> Result<()> {
    let db = open_database(config)?;

    println!("{}", "Docflow Statistics".cyan().bold());
    println!("{}", "─".repeat(50));

    println!();
    println!("{}", "Document Store".white().bold());
    for doc_type in DocumentType::ALL {
        let count = db.get_or_create_collection(doc_type.collection_name())?.count()?;
        println!("  {}: {}", doc_type.collection_name(), count.to_string().green());
    }

    println!();
    println!("{}", "Pending".white().bold());
    println!("  PDFs to extract: {}", count_files(&config.paths.pdf_dir, "pdf"));
    println!(
        "  Invoices to index: {}",
        count_files(&config.paths.invoices_dir, "json")
    );
    println!(
        "  Contracts to index: {}",
        count_files(&config.paths.contracts_dir, "json")
    );

    println!();
    println!("{}", "Storage".white().bold());
    let file = Database::file_path(&config.store.path);
    println!("  Store: {}", file.display());
    println!("  Size: {}", format_size(Database::file_size(&file)?));

    Ok(())
}

/// Files directly inside `dir` with the given extension, case-insensitive.
fn count_files(dir: &Path, extension: &str) -> usize {
    if !dir.is_dir() {
        return 0;
    }

    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case(extension))
                .unwrap_or(false)
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::config_in;
    use tempfile::TempDir;

    #[test]
    fn test_count_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.pdf"), b"").unwrap();
        std::fs::write(dir.path().join("B.PDF"), b"").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"").unwrap();
        std::fs::create_dir(dir.path().join("nested.pdf")).unwrap();

        assert_eq!(count_files(dir.path(), "pdf"), 2);
        assert_eq!(count_files(&dir.path().join("missing"), "pdf"), 0);
    }

    #[test]
    fn test_stats_on_fresh_store() {
        let dir = TempDir::new().unwrap();
        run(&config_in(&dir)).unwrap();
    }
}
