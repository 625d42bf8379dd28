//! `molvocgen` command-line tool: train and inspect molecular BPE vocabularies.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use env_logger::Env;
use log::LevelFilter;

use molvocgen::serialization::{load_json, load_text};
use molvocgen::{InputFormat, Trainer, TrainerConfig, Vocabulary};

/// Entries listed by `show` and `show-json`
const SHOW_ENTRIES: usize = 20;

#[derive(Parser, Debug)]
#[command(author, version, about = "BPE vocabulary trainer for SMILES and SELFIES", long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (-q, -qq)
    #[arg(short = 'q', long, global = true, action = ArgAction::Count)]
    quiet: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Train a vocabulary on a corpus
    Train(TrainArgs),
    /// Print a text-format vocabulary
    Show(ShowArgs),
    /// Print a JSON-format vocabulary
    #[command(name = "show-json")]
    ShowJson(ShowArgs),
}

#[derive(Args, Debug)]
struct TrainArgs {
    /// Corpus file, one molecule per line
    #[arg(short = 'f', long = "file", value_name = "PATH", conflicts_with = "text")]
    file: Option<PathBuf>,

    /// Literal corpus text, one molecule per line
    #[arg(long, value_name = "TEXT", required_unless_present = "file")]
    text: Option<String>,

    /// Number of merges to perform
    #[arg(short = 'n', long = "merges", value_name = "N")]
    num_merges: u32,

    /// Input notation: smiles or selfies
    #[arg(short = 't', long = "type", value_name = "FORMAT", default_value = "selfies")]
    format: InputFormat,

    /// Output directory, created if missing
    #[arg(short = 'o', long = "output", value_name = "DIR", default_value = ".")]
    output: PathBuf,

    /// Count pairs on all cores
    #[arg(long)]
    parallel: bool,
}

#[derive(Args, Debug)]
struct ShowArgs {
    /// Vocabulary file to load
    path: PathBuf,
}

fn init_logging(verbose: u8, quiet: u8) {
    let level = if quiet > 0 {
        match quiet {
            1 => LevelFilter::Warn,
            _ => LevelFilter::Error,
        }
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_timestamp_millis();
    builder.filter_level(level);
    let _ = builder.try_init();
}

fn run_train(args: TrainArgs) -> Result<()> {
    let config = TrainerConfig::new(args.format, args.num_merges).with_parallel(args.parallel);
    let trainer = Trainer::new(config).context("invalid training configuration")?;

    let outcome = match (&args.file, &args.text) {
        (Some(path), _) => trainer
            .train_file(path)
            .with_context(|| format!("failed to train on {}", path.display()))?,
        (None, Some(text)) => trainer.train_text(text),
        (None, None) => anyhow::bail!("either --file or --text is required"),
    };

    let paths = trainer
        .save(&outcome.vocabulary, &args.output)
        .with_context(|| format!("failed to write vocabulary to {}", args.output.display()))?;

    if outcome.stopped_early {
        log::warn!(
            "Corpus ran out of pairs after {} of {} merges",
            outcome.merges_performed,
            args.num_merges
        );
    }
    println!(
        "Vocabulary size: {} tokens ({} merges over {} molecules)",
        outcome.vocabulary.len(),
        outcome.merges_performed,
        outcome.molecules
    );
    for file in paths.files() {
        println!("Wrote {}", file.display());
    }
    Ok(())
}

fn print_vocabulary(vocab: &Vocabulary) {
    println!("Loaded {} merge operations:", vocab.num_merges());
    for (i, pair) in vocab.merges().iter().enumerate() {
        println!("  {}. {}", i + 1, pair);
    }

    println!("\nVocabulary (showing first {} entries):", SHOW_ENTRIES);
    for (token, count) in vocab.sorted_by_count().into_iter().take(SHOW_ENTRIES) {
        println!("  - {}: {}", token, count);
    }
    println!("\nTotal vocabulary size: {} tokens", vocab.len());
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Train(args) => run_train(args)?,
        Commands::Show(args) => {
            let vocab = load_text(&args.path)
                .with_context(|| format!("failed to load {}", args.path.display()))?;
            print_vocabulary(&vocab);
        }
        Commands::ShowJson(args) => {
            let vocab = load_json(&args.path)
                .with_context(|| format!("failed to load {}", args.path.display()))?;
            print_vocabulary(&vocab);
        }
    }

    Ok(())
}
