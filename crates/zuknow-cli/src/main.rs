//! zuknow CLI
//!
//! Command-line interface for zuknow - a personal question bank for
//! self-quizzing.

use std::fs::OpenOptions;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use zuknow_core::query::{SortField, SortOrder};
use zuknow_core::{
    Config, Difficulty, QuestionFilter, QuestionRepository, RepositoryError, StorageError,
};

mod commands;
mod editor;
mod output;

use commands::question::{parse_difficulty_filter, ListOptions, NewQuestion, QuestionEdits};
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "zuknow")]
#[command(about = "zuknow - Personal question bank and self-quiz")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new question
    #[command(alias = "create")]
    Add {
        /// The question prompt
        #[arg(long)]
        question: String,
        /// The expected answer
        #[arg(long)]
        answer: String,
        /// Why the answer is correct
        #[arg(long)]
        explanation: String,
        /// Category
        #[arg(short, long)]
        category: Option<String>,
        /// Tags to add (repeatable)
        #[arg(short, long)]
        tag: Vec<String>,
        /// Difficulty (easy, medium, hard)
        #[arg(short, long)]
        difficulty: Option<Difficulty>,
    },
    /// List questions
    #[command(alias = "ls")]
    List {
        /// Filter by category
        #[arg(short, long)]
        category: Option<String>,
        /// Filter by tag
        #[arg(short, long)]
        tag: Option<String>,
        /// Filter by difficulty (easy, medium, hard, unspecified)
        #[arg(short, long)]
        difficulty: Option<String>,
        /// Filter by keyword
        #[arg(short, long)]
        search: Option<String>,
        /// Sort field (created_at, updated_at, category, difficulty)
        #[arg(long, default_value = "created_at")]
        sort: SortField,
        /// Sort order (asc, desc)
        #[arg(long, default_value = "asc")]
        order: SortOrder,
    },
    /// Show question details
    Show {
        /// Question ID (full ID or prefix)
        id: String,
    },
    /// Edit a question
    Edit {
        /// Question ID (full ID or prefix)
        id: String,
        /// New question prompt
        #[arg(long)]
        question: Option<String>,
        /// New answer
        #[arg(long)]
        answer: Option<String>,
        /// New explanation
        #[arg(long)]
        explanation: Option<String>,
        /// New category
        #[arg(short, long, conflicts_with = "clear_category")]
        category: Option<String>,
        /// Replace tags (repeatable)
        #[arg(short, long, conflicts_with = "clear_tags")]
        tag: Vec<String>,
        /// New difficulty
        #[arg(short, long, conflicts_with = "clear_difficulty")]
        difficulty: Option<Difficulty>,
        /// Remove the category
        #[arg(long)]
        clear_category: bool,
        /// Remove all tags
        #[arg(long)]
        clear_tags: bool,
        /// Remove the difficulty
        #[arg(long)]
        clear_difficulty: bool,
    },
    /// Delete a question
    #[command(alias = "rm")]
    Delete {
        /// Question ID (full ID or prefix)
        id: String,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Search questions
    Search {
        /// Search keyword
        keyword: String,
    },
    /// Show collection statistics
    Stats,
    /// List all tags
    Tags,
    /// List all categories
    Categories,
    /// Answer a random question
    Quiz {
        /// Answer to check (reads from stdin if omitted)
        #[arg(short, long)]
        answer: Option<String>,
        /// Only pick from this category
        #[arg(short, long)]
        category: Option<String>,
        /// Only pick questions with this tag
        #[arg(short, long)]
        tag: Option<String>,
    },
    /// Export all questions to a JSON file
    Export {
        /// Output file (`-` for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Import questions from a JSON or CSV file
    Import {
        /// File to import (.json or .csv)
        path: PathBuf,
        /// Replace the whole collection instead of merging
        #[arg(long)]
        replace: bool,
    },
    /// Delete all questions
    Clear {
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Show status (storage location, size, counts)
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, storage, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_deref();

    // Commands that don't need the repository
    if let Commands::Config { command } = &cli.command {
        return match command.clone() {
            Some(ConfigCommands::Show) | None => commands::config::show(config_path, &output),
            Some(ConfigCommands::Set { key, value }) => {
                commands::config::set(key, value, config_path, &output)
            }
        };
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    init_logging(&config);

    let mut repo = open_repository(&config)?;

    match cli.command {
        Commands::Add {
            question,
            answer,
            explanation,
            category,
            tag,
            difficulty,
        } => commands::question::add(
            &mut repo,
            NewQuestion {
                question,
                answer,
                explanation,
                category,
                tags: tag,
                difficulty,
            },
            &output,
        ),
        Commands::List {
            category,
            tag,
            difficulty,
            search,
            sort,
            order,
        } => {
            let difficulty = difficulty
                .as_deref()
                .map(parse_difficulty_filter)
                .transpose()
                .map_err(anyhow::Error::msg)?;
            commands::question::list(
                &repo,
                ListOptions {
                    category,
                    tag,
                    difficulty,
                    search,
                    sort,
                    order,
                },
                &output,
            )
        }
        Commands::Show { id } => commands::question::show(&repo, id, &output),
        Commands::Edit {
            id,
            question,
            answer,
            explanation,
            category,
            tag,
            difficulty,
            clear_category,
            clear_tags,
            clear_difficulty,
        } => commands::question::edit(
            &mut repo,
            id,
            QuestionEdits {
                question,
                answer,
                explanation,
                category,
                tags: tag,
                difficulty,
                clear_category,
                clear_tags,
                clear_difficulty,
            },
            &output,
        ),
        Commands::Delete { id, yes } => commands::question::delete(&mut repo, id, yes, &output),
        Commands::Search { keyword } => commands::question::search(&repo, keyword, &output),
        Commands::Stats => commands::stats::show(&repo, &output),
        Commands::Tags => commands::stats::tags(&repo, &output),
        Commands::Categories => commands::stats::categories(&repo, &output),
        Commands::Quiz {
            answer,
            category,
            tag,
        } => {
            let filter = QuestionFilter {
                category,
                tag,
                ..QuestionFilter::default()
            };
            commands::quiz::run(&repo, filter, answer, &output)
        }
        Commands::Export { output: path } => commands::transfer::export(&repo, path, &output),
        Commands::Import { path, replace } => {
            commands::transfer::import(&mut repo, path, replace, &output)
        }
        Commands::Clear { yes } => commands::transfer::clear(&mut repo, yes, &output),
        Commands::Status => commands::status::show(&repo, &config, &output),
        Commands::Config { .. } => Ok(()), // Handled above
    }
}

/// Open the configured store, attaching a recovery hint when storage fails
fn open_repository(config: &Config) -> Result<QuestionRepository> {
    QuestionRepository::open(config).map_err(|err: RepositoryError| {
        let hint = err
            .storage_error()
            .and_then(StorageError::recovery_suggestion);
        let err = anyhow::Error::new(err).context("Failed to open question store");
        match hint {
            Some(hint) => err.context(hint),
            None => err,
        }
    })
}

/// Initialize file logging
///
/// Only initializes if ZUKNOW_LOG environment variable is set.
/// Logs to file (config.log_file or default {data_dir}/debug.log).
fn init_logging(config: &Config) {
    let Ok(log_level) = std::env::var("ZUKNOW_LOG") else {
        return;
    };

    let log_path = config.log_path();

    let log_file = match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not open log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::new(format!(
        "zuknow_core={},zuknow_cli={}",
        log_level, log_level
    ));

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("Logging initialized to {:?}", log_path);
}
