use super::replay::{load_document, resolve};
use crate::config::Config;
use crate::journal::{permutations, Journal, JournalEvent};
use anyhow::{anyhow, Result};
use apicollab_editor::{ApiDocument, CommandRegistry, OtEngine};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct VerifyArgs {
    /// Starting document (Swagger 2.0 or OpenAPI 3.x JSON)
    pub document: PathBuf,

    /// Journal of finalized commands and undo/redo events
    pub journal: PathBuf,

    /// Document the journal is expected to produce
    #[arg(short, long)]
    pub expected: Option<PathBuf>,

    /// Also replay every arrival order of the finalized commands (overrides config)
    #[arg(long)]
    pub permutations: bool,
}

pub fn verify(args: VerifyArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let initial = load_document(&resolve(cwd, &args.document))?;
    let journal = Journal::load(&resolve(cwd, &args.journal))
        .map_err(|e| anyhow!("Cannot read journal {}: {}", args.journal.display(), e))?;

    let duplicates = journal.duplicate_positions();
    if !duplicates.is_empty() {
        return Err(anyhow!(
            "Journal delivers positions more than once: {:?}",
            duplicates
        ));
    }

    println!("{}", "🔍 Verifying journal...".bright_blue().bold());

    let registry = CommandRegistry::with_builtin();
    let reference = journal.reference_document(&initial, &registry)?.to_json();

    let mut engine = OtEngine::new(initial.clone());
    journal.replay(&mut engine, &registry)?;
    let replayed = engine.current_document().to_json();

    let mut failures = 0;
    report(
        "journal order matches position order",
        replayed == reference,
        &mut failures,
    );

    if let Some(expected) = &args.expected {
        let expected = load_document(&resolve(cwd, expected))?;
        report(
            "result matches expected document",
            replayed == expected.to_json(),
            &mut failures,
        );
    }

    if args.permutations || config.check_permutations {
        let finalized = journal.finalized_indexes();
        if finalized.len() > config.max_permutation_commands {
            println!(
                "  {} Skipping permutations: {} commands exceeds the limit of {}",
                "-".dimmed(),
                finalized.len(),
                config.max_permutation_commands
            );
        } else {
            let diverged = check_permutations(&journal, &initial, &registry, &reference)?;
            report(
                &format!("every arrival order converges ({} diverged)", diverged),
                diverged == 0,
                &mut failures,
            );
        }
    }

    println!();
    if failures == 0 {
        println!("{}", "✅ Journal converges".green().bold());
        Ok(())
    } else {
        Err(anyhow!("{} check(s) failed", failures))
    }
}

fn report(label: &str, ok: bool, failures: &mut usize) {
    if ok {
        println!("  {} {}", "✓".green(), label);
    } else {
        *failures += 1;
        println!("  {} {}", "✗".red(), label.red());
    }
}

/// Replay each ordering of the finalized events, with undo/redo events after
/// them in journal order. Returns how many orderings diverged.
fn check_permutations(
    journal: &Journal,
    initial: &ApiDocument,
    registry: &CommandRegistry,
    reference: &str,
) -> Result<usize> {
    let tail: Vec<usize> = journal
        .events
        .iter()
        .enumerate()
        .filter(|(_, event)| !matches!(event, JournalEvent::Finalized { .. }))
        .map(|(index, _)| index)
        .collect();

    let mut diverged = 0;
    for mut order in permutations(&journal.finalized_indexes()) {
        order.extend(tail.iter().copied());
        let mut engine = OtEngine::new(initial.clone());
        journal.replay_order(&mut engine, registry, &order)?;
        if engine.current_document().to_json() != reference {
            tracing::warn!(?order, "arrival order diverged");
            diverged += 1;
        }
    }
    Ok(diverged)
}
