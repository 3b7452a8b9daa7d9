//! Configuration commands.

use anyhow::Result;
use colored::Colorize;
use docflow_config::Config;

pub fn show(config: &Config) -> Result<()> {
    println!("{}", "Current Configuration".cyan().bold());
    println!("{}", "─".repeat(50));
    println!("{}", config.to_display_string()?);
    Ok(())
}
