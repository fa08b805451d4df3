/// Conlang CLI — coin words, translate tagged phrases, lint rule files, and
/// train digraph tables.
///
/// Usage: conlang [--config <file.ron>] [--table <table.ron>] <command>
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;

use conlang_engine::core::digraph::{load_table, save_table, DigraphTable};
use conlang_engine::core::transform::RuleSet;
use conlang_engine::{ConlangConfig, SeedAlgorithm, Translator, WordMaker};

#[derive(Parser)]
#[command(name = "conlang", version, about = "Constructed-language word and sentence generator")]
struct Cli {
    /// Engine configuration (word settings, rules, corpus).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Pre-trained digraph table; overrides the configured corpus.
    #[arg(long, global = true)]
    table: Option<PathBuf>,

    /// Seed algorithm: h/hash or n/naive.
    #[arg(short, long, global = true)]
    algorithm: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Spew freshly invented words.
    Generate {
        /// Number of words.
        #[arg(short = 'n', long, default_value = "10")]
        count: usize,
        /// Seed for the whole run; unseeded when omitted.
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Coin the conlang word for each key.
    Words {
        /// Keys (English words, names, roots).
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Translate a tagged phrase such as "(S (NP I) (VP am (NP groot)))".
    Translate {
        /// Bracketed tree text.
        phrase: String,
        /// Extra rule file appended after the configured rules.
        #[arg(long)]
        rules: Option<PathBuf>,
    },

    /// Check that a rule file parses and every rule is well formed.
    Lint {
        /// RON rule file.
        rules: PathBuf,
    },

    /// Train a digraph table from a corpus and save it as RON.
    Train {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => ConlangConfig::load_from_ron(path)?,
        None => ConlangConfig::default(),
    };
    if let Some(name) = &cli.algorithm {
        config.word.seed = SeedAlgorithm::from_name(name)
            .ok_or_else(|| format!("algorithm '{}' isn't known (use hash or naive)", name))?;
    }

    match &cli.command {
        Commands::Lint { rules } => return lint(rules),
        Commands::Train { input, output } => return train(input, output),
        _ => {}
    }

    let mut translator = config.translator()?;
    if let Some(path) = &cli.table {
        translator = Translator::builder()
            .rules(translator.rules().clone())
            .table(load_table(path)?)
            .word_config(config.word.clone())
            .build()?;
    }

    match cli.command {
        Commands::Generate { count, seed } => {
            let maker = WordMaker::new(translator.table(), config.word.clone())?;
            let mut rng: rand::rngs::StdRng = match seed {
                Some(seed) => rand::SeedableRng::seed_from_u64(seed),
                None => rand::SeedableRng::from_entropy(),
            };
            for word in maker.generate_many(count, &mut rng)? {
                println!("{}", word);
            }
        }
        Commands::Words { keys } => {
            for key in &keys {
                println!("{} {}", key, translator.coin(key)?);
            }
        }
        Commands::Translate { phrase, rules } => {
            if let Some(path) = rules {
                let mut merged = translator.rules().clone();
                merged.merge(RuleSet::load_from_ron(&path)?);
                translator = Translator::builder()
                    .rules(merged)
                    .table(translator.table().clone())
                    .word_config(config.word.clone())
                    .build()?;
            }
            let translation = translator.translate(&phrase)?;
            println!("{}", translation.tree);
            println!("{}", translation.surface);
            println!("{}", translation.words.join(" "));
        }
        Commands::Lint { .. } | Commands::Train { .. } => {}
    }
    Ok(())
}

fn train(input: &Path, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(input)?;
    let table = DigraphTable::train(&text);
    save_table(&table, output)?;
    println!(
        "Trained {} contexts, {} start pairs from '{}'; saved to '{}'",
        table.len(),
        table.starts().len(),
        input.display(),
        output.display()
    );
    Ok(())
}

fn lint(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let rules = RuleSet::load_from_ron(path)?;
    println!("Loaded {} rules from '{}'", rules.len(), path.display());
    for (index, rule) in rules.rules.iter().enumerate() {
        println!(
            "  {:>3}. {} {:?}: {} -> {}",
            index + 1,
            rule.name().unwrap_or("(unnamed)"),
            rule.scope(),
            rule.pattern_text(),
            rule.replacement_text()
        );
    }
    println!("All checks passed!");
    Ok(())
}
