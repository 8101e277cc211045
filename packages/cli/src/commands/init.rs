use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Default log filter (overridden by RUST_LOG)
    #[arg(short, long, default_value = "warn")]
    pub log_filter: String,

    /// Enable the permutation check in `verify`
    #[arg(long)]
    pub check_permutations: bool,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = Config::path(cwd);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    let config = Config {
        log_filter: args.log_filter,
        check_permutations: args.check_permutations,
        ..Config::default()
    };

    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("Next steps:");
    println!("  1. Record a journal of finalized commands and undo/redo events");
    println!("  2. Run: apicollab replay <document> <journal>");
    println!("  3. Run: apicollab verify <document> <journal>");

    Ok(())
}
