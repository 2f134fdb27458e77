// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Three commands are supported:
//   1. `train` — build the corpus, cross-validate, save a model
//   2. `build` — build the corpus and export it, no training
//   3. `gloss` — map one gloss line, for checking the glossary
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{BuildArgs, Commands, GlossArgs, TrainArgs};

use crate::application::{
    build_use_case::BuildUseCase,
    gloss_use_case::GlossUseCase,
    train_use_case::TrainUseCase,
};
use crate::infra::report::CrossValidationSummary;

#[derive(Parser, Debug)]
#[command(
    name = "gloss-morph",
    version = "0.1.0",
    about = "Map Leipzig glosses to UD features and cross-validate a morphological tagger."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Route to the use case; the CLI layer never computes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args) => run_train(args),
            Commands::Build(args) => run_build(args),
            Commands::Gloss(args) => run_gloss(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    tracing::info!(
        "Starting {}-fold training for '{}' on: {}",
        args.n_folds,
        args.data.lang,
        args.data.data_dir
    );

    let summary = TrainUseCase::new(args.into()).execute()?;
    print_summary(&summary);
    Ok(())
}

fn run_build(args: BuildArgs) -> Result<()> {
    let output = BuildUseCase::new(args.into()).execute()?;
    let stats  = output.stats;

    println!("Files:       {}", stats.files);
    println!("Rows:        {} ({} without text or gloss)", stats.rows, stats.rows_dropped);
    println!("Utterances:  {}", stats.utterances);
    println!("Documents:   {} ({} tokens)", stats.documents, stats.tokens);
    println!(
        "Diagnostics: {} ({} excluded data)",
        output.diagnostics.len(),
        output.diagnostics.exclusions()
    );
    Ok(())
}

fn run_gloss(args: GlossArgs) -> Result<()> {
    let use_case = GlossUseCase::new(args.glossary, args.features, args.raw)?;
    let (gloss, mapping) = use_case.execute(&args.gloss);

    let width = gloss.split_whitespace().map(|t| t.chars().count()).max().unwrap_or(0);
    for (token, features) in gloss.split_whitespace().zip(&mapping.features) {
        println!("{token:<width$}  {features}");
    }
    if mapping.has_unknown_codes() {
        println!("\nUnknown codes: {}", mapping.unknown_codes.join(", "));
    }
    Ok(())
}

fn print_summary(summary: &CrossValidationSummary) {
    println!(
        "\nResults for '{}' ({} folds, {} documents)",
        summary.language, summary.n_folds, summary.documents
    );
    println!("{:<16} {:>8}", "metric", "score");
    println!("{:-<16} {:->8}", "", "");
    for (name, score) in &summary.mean {
        println!("{name:<16} {score:>8.4}");
    }
}
