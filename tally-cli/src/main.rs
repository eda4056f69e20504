use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tally_core::{
    AccountInfo, Category, ClassificationRule, LearnedPattern, SourceFormat, StoredTransaction,
};
use tally_finance::{
    review_batch, BatchReview, Catalog, HistoryBook, LearningStore, LlmClient, ReviewScope,
};
use tally_ingest::{parse_file, parse_file_as, ParseResult, SignSource};

mod config;
mod logging;
mod state;

#[derive(Parser, Debug)]
#[command(
    name = "tally",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TALLY_BUILD_SHA"), ")"),
    about = "Import bank statements, flag duplicates and suggest categories"
)]
struct Cli {
    /// Debug logging (overridden by TALLY_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a statement and print the reviewed batch as JSON
    Import {
        /// Statement file (.ofx or .csv)
        file: PathBuf,

        /// Account kind the file belongs to: checking, savings, cash, credit_card
        #[arg(long)]
        source: Option<String>,

        /// JSON list of stored transactions to check for duplicates
        #[arg(long)]
        existing: Option<PathBuf>,

        /// JSON list of classification rules
        #[arg(long)]
        rules: Option<PathBuf>,

        /// JSON list of learned patterns
        #[arg(long)]
        history: Option<PathBuf>,

        /// JSON list of categories offered to the text model
        #[arg(long)]
        categories: Option<PathBuf>,

        /// Account id used to scope rules
        #[arg(long)]
        account: Option<i64>,

        /// Skip the text model even when configured
        #[arg(long)]
        no_ai: bool,
    },

    /// Record a human category choice in a history file
    Learn {
        /// JSON list of learned patterns; created when missing
        #[arg(long)]
        history: PathBuf,

        #[arg(long)]
        description: String,

        #[arg(long)]
        category: i64,
    },

    /// Manage ~/.tally/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
    /// Print the effective config
    Show,
}

#[derive(Debug, Serialize)]
struct ImportReport {
    file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    account_info: Option<AccountInfo>,
    errors: Vec<String>,
    #[serde(flatten)]
    review: BatchReview,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match cli.command {
        Command::Import {
            file,
            source,
            existing,
            rules,
            history,
            categories,
            account,
            no_ai,
        } => {
            let inputs = ImportInputs {
                existing: state::read_json_list(existing.as_deref())?,
                rules: state::read_json_list(rules.as_deref())?,
                history: state::read_json_list(history.as_deref())?,
                categories: state::read_json_list(categories.as_deref())?,
            };
            let report = import(&file, source.as_deref(), &inputs, account, no_ai).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Command::Learn {
            history,
            description,
            category,
        } => {
            let patterns: Vec<LearnedPattern> = if history.exists() {
                state::read_json_list(Some(history.as_path()))?
            } else {
                Vec::new()
            };
            let mut book = HistoryBook::new(patterns);
            book.record_correction(&description, category, Utc::now())?;
            state::write_json(&history, book.patterns())?;
            println!("Learned {:?} -> category {category}", description.trim());
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let cfg = config::load_config()?;
                println!("# {}", config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

struct ImportInputs {
    existing: Vec<StoredTransaction>,
    rules: Vec<ClassificationRule>,
    history: Vec<LearnedPattern>,
    categories: Vec<Category>,
}

async fn import(
    path: &Path,
    source: Option<&str>,
    inputs: &ImportInputs,
    account_id: Option<i64>,
    no_ai: bool,
) -> Result<ImportReport> {
    if !path.exists() {
        bail!("statement not found: {}", path.display());
    }
    let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    // Some banks still export Latin-1.
    let content = String::from_utf8_lossy(&bytes);
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let parsed: ParseResult = match source {
        Some(tag) => parse_file_as(&file_name, &content, tag)?,
        None => parse_file(&file_name, &content),
    };

    let cfg = config::load_config()?;
    let history_only = source
        .map(|tag| tag.parse::<SignSource>())
        .transpose()?
        .is_some_and(|s| s == SignSource::CreditCard)
        || (!parsed.transactions.is_empty()
            && parsed
                .transactions
                .iter()
                .all(|t| t.source_format == SourceFormat::CardStatement));

    let generator = if no_ai || !cfg.classification.use_ai || history_only {
        None
    } else {
        match cfg.llm_config().and_then(|c| LlmClient::from_env(c, &cfg.llm.api_key_env)) {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!(error = %e, "text model unavailable; continuing without it");
                None
            }
        }
    };

    let catalog = Catalog {
        rules: &inputs.rules,
        history: &inputs.history,
        categories: &inputs.categories,
    };
    let scope = ReviewScope {
        account_id,
        history_only,
    };

    let ParseResult {
        transactions,
        errors,
        account_info,
    } = parsed;
    let review = review_batch(
        transactions,
        &inputs.existing,
        &catalog,
        scope,
        &cfg.review(),
        generator.as_ref(),
    )
    .await;

    Ok(ImportReport {
        file: file_name,
        account_info,
        errors,
        review,
    })
}
