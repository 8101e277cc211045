use crate::config::Config;
use crate::journal::Journal;
use anyhow::{anyhow, Result};
use apicollab_editor::{ApiDocument, CommandRegistry, OtEngine};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Starting document (Swagger 2.0 or OpenAPI 3.x JSON)
    pub document: PathBuf,

    /// Journal of finalized commands and undo/redo events
    pub journal: PathBuf,

    /// Write the resulting document here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Single-line output (overrides config)
    #[arg(long)]
    pub compact: bool,
}

pub fn replay(args: ReplayArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let initial = load_document(&resolve(cwd, &args.document))?;
    let journal = Journal::load(&resolve(cwd, &args.journal))
        .map_err(|e| anyhow!("Cannot read journal {}: {}", args.journal.display(), e))?;

    let registry = CommandRegistry::with_builtin();
    let mut engine = OtEngine::new(initial);
    let stats = journal.replay(&mut engine, &registry)?;

    let document = engine.current_document();
    let text = if config.pretty && !args.compact {
        document.to_json_pretty()
    } else {
        document.to_json()
    };

    match &args.output {
        Some(output) => {
            fs::write(resolve(cwd, output), text)?;
            eprintln!("  {} Wrote {}", "✓".green(), output.display());
        }
        None => println!("{}", text),
    }

    eprintln!(
        "{} Replayed {} commands ({} undone, {} redone, {} deferred or ignored)",
        "✅".green(),
        stats.finalized,
        stats.undone,
        stats.redone,
        stats.deferred_or_ignored
    );
    if !engine.pending_undos().is_empty() {
        eprintln!(
            "{} Undo requested for positions never delivered: {:?}",
            "⚠️".yellow(),
            engine.pending_undos()
        );
    }

    Ok(())
}

pub(crate) fn resolve(cwd: &str, path: &Path) -> PathBuf {
    PathBuf::from(cwd).join(path)
}

pub(crate) fn load_document(path: &Path) -> Result<ApiDocument> {
    let source = fs::read_to_string(path)
        .map_err(|e| anyhow!("Cannot read document {}: {}", path.display(), e))?;
    Ok(ApiDocument::from_json(&source)?)
}
