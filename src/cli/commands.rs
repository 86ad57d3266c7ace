use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::warn;

use super::render;
use crate::index_storage::{StoreMetadata, default_store_dir, load_index, save_index};
use crate::indexer::{Ingestor, RefreshReport, refresh_index};
use crate::models::{IndexStats, Record, Role};
use crate::search::{
    HistoryIndex, QueryOptions, SearchFilter, parse_since,
    query::{DEFAULT_CONTEXT_RECORDS, DEFAULT_SEARCH_LIMIT, DEFAULT_SNIPPET_CHARS},
};
use crate::utils::default_log_root;

const DEFAULT_SESSIONS_LIMIT: usize = 20;
const DEFAULT_SHOW_LIMIT: usize = 50;
const DEFAULT_SHOW_CHARS: usize = 800;

#[derive(Parser)]
#[command(name = "ai-history-search")]
#[command(version)]
#[command(about = "Keyword search over Claude Code session history", long_about = None)]
pub struct Cli {
    /// Directory holding session logs [default: ~/.claude/projects]
    #[arg(long, global = true, env = "AI_HISTORY_ROOT")]
    pub root: Option<PathBuf>,

    /// Index store directory [default: per-root directory under the user cache]
    #[arg(long, global = true, env = "AI_HISTORY_STORE")]
    pub store: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Log progress and debug details to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build or refresh the index from the session logs
    Index {
        /// Ignore the stored index and re-read every file
        #[arg(long)]
        full: bool,
    },
    /// Search past conversations by keyword
    Search(SearchArgs),
    /// List sessions, most recent first
    Sessions(SessionsArgs),
    /// Show the transcript of one session
    Show(ShowArgs),
    /// Show statistics about the index
    Stats,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Search terms (a session matches when it contains any of them)
    #[arg(required = true, num_args = 1..)]
    pub terms: Vec<String>,

    #[arg(short, long, default_value_t = DEFAULT_SEARCH_LIMIT)]
    pub limit: usize,

    /// Records shown before and after each hit
    #[arg(short, long, default_value_t = DEFAULT_CONTEXT_RECORDS)]
    pub context: usize,

    /// Maximum characters shown per record
    #[arg(long, default_value_t = DEFAULT_SNIPPET_CHARS)]
    pub max_chars: usize,

    /// Only sessions whose project path contains this text
    #[arg(long)]
    pub project: Option<String>,

    /// Only match records from this role (user or assistant)
    #[arg(long, value_parser = parse_role_arg)]
    pub role: Option<Role>,

    /// Only match records on or after this date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date_arg)]
    pub since: Option<NaiveDate>,
}

#[derive(Args)]
pub struct SessionsArgs {
    #[arg(short, long, default_value_t = DEFAULT_SESSIONS_LIMIT)]
    pub limit: usize,

    /// Only sessions whose project path contains this text
    #[arg(long)]
    pub project: Option<String>,

    /// Only sessions active on or after this date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date_arg)]
    pub since: Option<NaiveDate>,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Session id or a unique prefix of one
    pub id: String,

    /// Maximum number of records shown
    #[arg(short, long, default_value_t = DEFAULT_SHOW_LIMIT)]
    pub limit: usize,

    /// Maximum characters shown per record
    #[arg(long, default_value_t = DEFAULT_SHOW_CHARS)]
    pub max_chars: usize,
}

fn parse_role_arg(value: &str) -> Result<Role, String> {
    Role::parse(value).ok_or_else(|| format!("unknown role '{}' (expected user or assistant)", value))
}

fn parse_date_arg(value: &str) -> Result<NaiveDate, String> {
    parse_since(value).map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    crate::logging::init(cli.verbose);

    let Some(command) = &cli.command else {
        println!("Use --help for usage information");
        return Ok(());
    };

    let root = match &cli.root {
        Some(root) => root.clone(),
        None => default_log_root()?,
    };
    let store = match &cli.store {
        Some(store) => store.clone(),
        None => default_store_dir(&root)?,
    };

    match command {
        Commands::Index { full } => run_index(&root, &store, *full, cli.json),
        Commands::Search(args) => with_index(&root, &store, |index| search(index, args, cli.json)),
        Commands::Sessions(args) => {
            with_index(&root, &store, |index| list_sessions(index, args, cli.json))
        }
        Commands::Show(args) => with_index(&root, &store, |index| show(index, args, cli.json)),
        Commands::Stats => {
            with_index(&root, &store, |index| show_stats(index, &root, &store, cli.json))
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("Failed to serialize output")?);
    Ok(())
}

/// Load the stored index and run `f` on it, or tell the user to build one.
fn with_index(
    root: &Path,
    store: &Path,
    f: impl FnOnce(&HistoryIndex) -> Result<()>,
) -> Result<()> {
    let Some((index, metadata)) = load_index(store)? else {
        println!("{}", render::missing_store(store));
        return Ok(());
    };
    warn_on_root_mismatch(&metadata, root);
    f(&index)
}

fn warn_on_root_mismatch(metadata: &StoreMetadata, root: &Path) {
    if metadata.root != root {
        warn!(
            "Index store was built from {}, not {}; run `ai-history-search index` to rebuild",
            metadata.root.display(),
            root.display()
        );
    }
}

#[derive(Serialize)]
struct IndexOutput<'a> {
    root: &'a Path,
    store: &'a Path,
    stats: IndexStats,
    report: &'a RefreshReport,
}

fn run_index(root: &Path, store: &Path, full: bool, json: bool) -> Result<()> {
    let previous = if full {
        None
    } else {
        // An unreadable store is rebuilt rather than reported
        load_index(store).unwrap_or_else(|e| {
            warn!("Discarding unreadable index store: {:#}", e);
            None
        })
    };

    let refreshed = refresh_index(&Ingestor::new(root), previous)?;
    save_index(store, &refreshed.index, &refreshed.metadata)
        .with_context(|| format!("Failed to save index to {}", store.display()))?;

    let stats = refreshed.index.stats();
    if json {
        print_json(&IndexOutput { root, store, stats, report: &refreshed.report })
    } else {
        println!("{}", render::refresh_summary(&refreshed.report, &stats, root));
        Ok(())
    }
}

fn search(index: &HistoryIndex, args: &SearchArgs, json: bool) -> Result<()> {
    let options = QueryOptions {
        limit: args.limit,
        context: args.context,
        max_chars: args.max_chars,
        filter: SearchFilter { project: args.project.clone(), role: args.role, since: args.since },
        ..Default::default()
    };
    let results = index.search(&args.terms.join(" "), &options);

    if json {
        print_json(&results)
    } else {
        println!("{}", render::search_results(&results));
        Ok(())
    }
}

fn list_sessions(index: &HistoryIndex, args: &SessionsArgs, json: bool) -> Result<()> {
    let filter = SearchFilter { project: args.project.clone(), since: args.since, role: None };
    let mut sessions = index.list_sessions_filtered(&filter);
    sessions.truncate(args.limit);

    if json {
        print_json(&sessions)
    } else {
        println!("{}", render::session_list(&sessions));
        Ok(())
    }
}

#[derive(Serialize)]
struct ShowOutput<'a> {
    id: &'a str,
    project_path: Option<&'a Path>,
    git_branch: Option<&'a str>,
    total_records: usize,
    records: &'a [Record],
}

#[derive(Serialize)]
struct ErrorOutput {
    error: String,
}

fn show(index: &HistoryIndex, args: &ShowArgs, json: bool) -> Result<()> {
    let session = match index.show_session(&args.id) {
        Ok(session) => session,
        Err(e) if json => return print_json(&ErrorOutput { error: e.to_string() }),
        Err(e) => {
            println!("{}", render::lookup_error(&e));
            return Ok(());
        }
    };

    let shown = &session.records[..session.len().min(args.limit)];
    if json {
        print_json(&ShowOutput {
            id: &session.id,
            project_path: session.project_path.as_deref(),
            git_branch: session.git_branch.as_deref(),
            total_records: session.len(),
            records: shown,
        })
    } else {
        println!("{}", render::session_transcript(session, shown, args.max_chars));
        Ok(())
    }
}

fn show_stats(index: &HistoryIndex, root: &Path, store: &Path, json: bool) -> Result<()> {
    let stats = index.stats();
    if json {
        print_json(&stats)
    } else {
        println!("{}", render::stats(&stats, root, store));
        Ok(())
    }
}
