mod commands;
mod config;
mod journal;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{init, replay, verify, InitArgs, ReplayArgs, VerifyArgs};
use config::Config;
use tracing_subscriber::EnvFilter;

/// apicollab - replay and check collaborative API document edits
#[derive(Parser, Debug)]
#[command(name = "apicollab")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write an apicollab.config.json
    Init(InitArgs),

    /// Apply a command journal to a document and print the result
    Replay(ReplayArgs),

    /// Check that a journal converges regardless of arrival order
    Verify(VerifyArgs),
}

fn init_tracing(cwd: &str) {
    let fallback = Config::load(cwd)
        .map(|config| config.log_filter)
        .unwrap_or_else(|_| Config::default().log_filter);

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir.display().to_string(),
        Err(err) => {
            eprintln!("{} Cannot get current directory: {}", "Error:".red().bold(), err);
            std::process::exit(1);
        }
    };

    init_tracing(&cwd);

    let result = match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Replay(args) => replay(args, &cwd),
        Command::Verify(args) => verify(args, &cwd),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
