use std::io;
use std::path::PathBuf;

use anyhow::{Result, anyhow, bail};
use clap::{Parser, Subcommand};

use crate::sources::{
    ClaudeSource, OpencodeDbSource, OpencodeFileSource, TimeRange, export_sessions, find_db_path,
};
use crate::utils::{debug_log, expand_tilde, parse_iso_date};

/// Export coding-assistant sessions as newline-delimited JSON on stdout.
///
/// Records go to stdout, diagnostics to stderr, so output can be piped
/// directly into downstream tooling.
#[derive(Parser)]
#[command(name = "agent-session-export", version, about)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export sessions from Claude Code's file storage
    ClaudeCode(ClaudeCodeArgs),
    /// Export sessions from OpenCode's SQLite or legacy file storage
    Opencode(OpencodeArgs),
}

#[derive(clap::Args)]
struct ClaudeCodeArgs {
    /// Path to the ~/.claude/projects/ directory
    #[arg(long = "claude-dir")]
    claude_dir: String,

    /// Start date (ISO 8601: YYYY-MM-DDTHH:MM:SSZ or YYYY-MM-DD)
    #[arg(long)]
    from: Option<String>,

    /// End date (ISO 8601: YYYY-MM-DDTHH:MM:SSZ or YYYY-MM-DD)
    #[arg(long)]
    to: Option<String>,

    /// Filter to sessions from this project directory path
    #[arg(long = "project-path")]
    project_path: Option<String>,

    /// Print debug info to stderr
    #[arg(long)]
    verbose: bool,
}

#[derive(clap::Args)]
struct OpencodeArgs {
    /// Path to OpenCode storage/ or the data directory containing opencode.db
    #[arg(long = "sessions-dir")]
    sessions_dir: String,

    /// Start date (ISO 8601: YYYY-MM-DDTHH:MM:SSZ or YYYY-MM-DD)
    #[arg(long)]
    from: Option<String>,

    /// End date (ISO 8601: YYYY-MM-DDTHH:MM:SSZ or YYYY-MM-DD)
    #[arg(long)]
    to: Option<String>,

    /// Filter to sessions from this project directory path
    #[arg(long = "project-path")]
    project_path: Option<String>,

    /// Filter to a single project hash (legacy file backend only)
    #[arg(long = "project-hash")]
    project_hash: Option<String>,

    /// Print debug info to stderr
    #[arg(long)]
    verbose: bool,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::ClaudeCode(args) => run_claude_code(args),
        Commands::Opencode(args) => run_opencode(args),
    }
}

/// Resolve `--from`/`--to` into a window. Both flags are required together;
/// anything else is a usage error.
fn resolve_range(from: &Option<String>, to: &Option<String>) -> Result<TimeRange> {
    let (Some(from), Some(to)) = (from, to) else {
        bail!("Both --from and --to required");
    };
    let from = parse_iso_date(from).map_err(|e| anyhow!("Date parse error: {e}"))?;
    let to = parse_iso_date(to).map_err(|e| anyhow!("Date parse error: {e}"))?;
    Ok(TimeRange { from, to })
}

fn report_count(count: usize, from: &Option<String>, to: &Option<String>) {
    if count == 0 {
        eprintln!(
            "No sessions found for [{} .. {}]",
            from.as_deref().unwrap_or_default(),
            to.as_deref().unwrap_or_default()
        );
    }
}

fn run_claude_code(args: ClaudeCodeArgs) -> Result<()> {
    let range = resolve_range(&args.from, &args.to)?;

    let claude_dir = expand_tilde(&args.claude_dir);
    if !claude_dir.is_dir() {
        eprintln!("Claude directory does not exist: {}", claude_dir.display());
        return Ok(());
    }
    debug_log(args.verbose, format!("Claude dir: {}", claude_dir.display()));
    debug_log(
        args.verbose,
        format!(
            "Date range: {} -> {}",
            args.from.as_deref().unwrap_or_default(),
            args.to.as_deref().unwrap_or_default()
        ),
    );

    let mut source =
        ClaudeSource::new(claude_dir, args.project_path.clone(), range, args.verbose);
    let mut out = io::stdout().lock();
    let count = export_sessions(&mut source, &mut out)?;
    report_count(count, &args.from, &args.to);
    Ok(())
}

fn run_opencode(args: OpencodeArgs) -> Result<()> {
    let range = resolve_range(&args.from, &args.to)?;

    let sessions_dir: PathBuf = expand_tilde(&args.sessions_dir);
    let project_path = args.project_path.as_deref().map(|p| {
        expand_tilde(p).to_string_lossy().trim_end_matches('/').to_string()
    });

    debug_log(args.verbose, format!("Sessions dir: {}", sessions_dir.display()));
    debug_log(
        args.verbose,
        format!(
            "Date range: {} -> {}",
            args.from.as_deref().unwrap_or_default(),
            args.to.as_deref().unwrap_or_default()
        ),
    );
    if let Some(filter) = &project_path {
        debug_log(args.verbose, format!("Project path filter: {filter}"));
    }

    let mut out = io::stdout().lock();
    let count = match find_db_path(&sessions_dir) {
        Some(db_path) => {
            debug_log(args.verbose, format!("Using SQLite backend: {}", db_path.display()));
            let mut source =
                OpencodeDbSource::open(&db_path, project_path, range, args.verbose)?;
            export_sessions(&mut source, &mut out)?
        }
        None => {
            if !sessions_dir.is_dir() {
                eprintln!("Sessions directory does not exist: {}", sessions_dir.display());
                return Ok(());
            }
            let mut source = OpencodeFileSource::new(
                sessions_dir,
                args.project_hash.clone(),
                project_path,
                range,
                args.verbose,
            );
            export_sessions(&mut source, &mut out)?
        }
    };
    report_count(count, &args.from, &args.to);
    Ok(())
}
