//! # Memory Harness CLI (`mem`)
//!
//! ## Usage
//!
//! ```bash
//! mem --config ./config/mem.toml <command>
//! ```
//!
//! | Command | Description |
//! |---------|-------------|
//! | `mem tags <cat:val>...` | Lines carrying every given tag |
//! | `mem tags --list-tags [--category <cat>]` | Tag frequencies |
//! | `mem retrieve "<query>"` | Classify a query and rank notes in scope |
//! | `mem classify "<query>"` | Print the category of a query |
//! | `mem archive` | Move stale notes into the archive folder |
//!
//! ## Examples
//!
//! ```bash
//! mem tags 人物:王隆哲 类型:开票信息
//! mem tags --list-tags --category 人物
//! mem retrieve 午饭吃了什么
//! mem --root ~/memory archive --dry-run
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use memory_harness::{archive, config, retrieve, tag_search};

/// Memory Harness CLI: tag search and smart retrieval over memory notes.
#[derive(Parser)]
#[command(
    name = "mem",
    about = "Memory Harness: tag search and smart retrieval over plain-text memory notes",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/mem.toml")]
    config: PathBuf,

    /// Corpus root. Overrides `corpus.root`; the config file becomes
    /// optional when this is set.
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search notes by inline tags, or list tag frequencies.
    ///
    /// Tags are `category:value` (surrounding brackets are accepted). A line
    /// matches when it carries every given tag.
    Tags {
        /// Tags to AND together.
        #[arg(required_unless_present = "list_tags")]
        tags: Vec<String>,

        /// List every tag with its occurrence count instead of searching.
        #[arg(long, conflicts_with = "tags")]
        list_tags: bool,

        /// Restrict --list-tags to one tag category.
        #[arg(long, requires = "list_tags")]
        category: Option<String>,

        /// Emit JSON.
        #[arg(long)]
        json: bool,
    },

    /// Classify a free-text query and rank the notes in its scope.
    Retrieve {
        /// Query text; multiple words are joined with spaces.
        #[arg(required = true)]
        query: Vec<String>,

        /// Maximum number of notes (defaults to `retrieval.top_k`).
        #[arg(long)]
        limit: Option<usize>,

        /// Skip classification and use this category.
        #[arg(long)]
        category: Option<String>,

        /// Emit JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the category a query is routed to.
    Classify {
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// Move notes older than the threshold into the archive folder.
    Archive {
        /// Age in days past which a note is archived (defaults to
        /// `archive.threshold_days`).
        #[arg(long)]
        threshold_days: Option<i64>,

        /// Report what would move without touching any file.
        #[arg(long)]
        dry_run: bool,

        /// Emit JSON.
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("memory_harness={level},memory_harness_core={level}"))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cfg = config::resolve_config(&cli.config, cli.root.as_deref())?;

    match cli.command {
        Commands::Tags {
            tags,
            list_tags,
            category,
            json,
        } => {
            if list_tags {
                tag_search::run_list_tags(&cfg, category.as_deref(), json)?;
            } else {
                tag_search::run_tag_search(&cfg, &tags, json)?;
            }
        }
        Commands::Retrieve {
            query,
            limit,
            category,
            json,
        } => {
            let query = query.join(" ");
            retrieve::run_retrieve(&cfg, &query, limit, category.as_deref(), json)?;
        }
        Commands::Classify { query } => {
            retrieve::run_classify(&cfg, &query.join(" "))?;
        }
        Commands::Archive {
            threshold_days,
            dry_run,
            json,
        } => {
            archive::run_archive(&cfg, threshold_days, dry_run, json)?;
        }
    }

    Ok(())
}
