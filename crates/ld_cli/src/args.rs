// crates/ld_cli/src/args.rs
//
// CLI argument surface: types, value parsers, and post-parse validation.
//
// Rules:
// - Input paths are local files (reject any scheme:// like http/https/file)
// - --entries is required and must exist; --config is optional
// - Output: --out dir (created on demand), --render [csv|json|html]* (default csv)
// - Seed accepts decimal u64 or 0x-hex up to 16 nybbles
// - --override TURN=ID may repeat; turns start at 1
// - --validate-only loads and checks inputs without drawing

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use clap::{ArgAction, Parser};

/// Parsed CLI arguments (raw).
#[derive(Debug, Parser, Clone)]
#[command(
    name = "ld",
    disable_help_subcommand = true,
    about = "Lucky draw: run a prize schedule over an imported entry list"
)]
pub struct Args {
    /// Entries JSON (array of spreadsheet rows).
    #[arg(long)]
    pub entries: PathBuf,

    /// Draw configuration JSON (tiers, overrides, timing, seed). Built-in prize table if omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output directory (default: current directory).
    #[arg(long, default_value = ".")]
    pub out: PathBuf,

    /// Renderer(s) to emit. Repeatable; defaults to csv.
    #[arg(long, value_parser = ["csv", "json", "html"])]
    pub render: Vec<String>,

    /// Stop after this many draws (default: until the schedule or the pool is exhausted).
    #[arg(long)]
    pub draws: Option<u32>,

    /// RNG seed override. Accepts decimal u64 or 0x-hex (≤16 hex digits).
    #[arg(long, value_parser = parse_seed)]
    pub seed: Option<u64>,

    /// Spin duration override (ms).
    #[arg(long)]
    pub spin_ms: Option<u64>,
    /// Candidate resample interval override (ms).
    #[arg(long)]
    pub resample_ms: Option<u64>,
    /// Reveal delay override (ms).
    #[arg(long)]
    pub reveal_ms: Option<u64>,

    /// Force the winner of a turn: TURN=ID. Repeatable.
    #[arg(long = "override", value_name = "TURN=ID", value_parser = parse_override)]
    pub overrides: Vec<(u32, String)>,

    /// Validate inputs only, do not draw.
    #[arg(long)]
    pub validate_only: bool,

    /// Suppress winner lines on stdout.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// More logging (-v debug).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Requested renderers, `csv` when none given. Order kept, duplicates dropped.
    pub fn renders(&self) -> Vec<&str> {
        if self.render.is_empty() {
            return vec!["csv"];
        }
        let mut out: Vec<&str> = Vec::new();
        for r in &self.render {
            if !out.contains(&r.as_str()) {
                out.push(r.as_str());
            }
        }
        out
    }
}

/// Errors surfaced by argument validation.
/// Keep messages short/stable (handy for scripts/tests).
#[derive(Debug)]
pub enum CliError {
    BadCombo(&'static str),
    NonLocalPath(String),
    NotFound(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use CliError::*;
        match self {
            BadCombo(s) => write!(f, "invalid flag combination: {s}"),
            NonLocalPath(p) => write!(f, "path must be local file (no scheme): {p}"),
            NotFound(p) => write!(f, "file not found: {p}"),
        }
    }
}
impl std::error::Error for CliError {}

/// Entry point used by main.rs. Clap usage errors exit with status 2.
pub fn parse_and_validate() -> Result<Args, CliError> {
    validate(Args::parse())
}

/// Post-parse checks and path normalization.
pub fn validate(mut args: Args) -> Result<Args, CliError> {
    for p in [Some(args.entries.as_path()), args.config.as_deref(), Some(args.out.as_path())]
        .into_iter()
        .flatten()
    {
        ensure_local_path(p)?;
    }

    ensure_local_exists(&args.entries, "--entries")?;
    if let Some(c) = &args.config {
        ensure_local_exists(c, "--config")?;
    }
    if args.draws == Some(0) {
        return Err(CliError::BadCombo("--draws must be at least 1"));
    }
    if args.validate_only && (args.draws.is_some() || !args.render.is_empty()) {
        return Err(CliError::BadCombo("--validate-only takes no --draws/--render"));
    }

    args.entries = normalize_path(&args.entries);
    args.config = args.config.take().map(|p| normalize_path(&p));
    args.out = normalize_path(&args.out);
    Ok(args)
}

/// Seed parser: decimal u64 or 0x-hex (1..=16 nybbles).
pub fn parse_seed(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty seed".into());
    }
    if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        if rest.is_empty() || rest.len() > 16 || !rest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err("hex seed must be 1..16 hex digits".into());
        }
        u64::from_str_radix(rest, 16).map_err(|_| "hex seed out of range".into())
    } else {
        s.parse::<u64>().map_err(|_| "decimal seed must be a valid u64".into())
    }
}

/// `TURN=ID`, turn ≥ 1, id non-empty.
pub fn parse_override(s: &str) -> Result<(u32, String), String> {
    let (turn, id) = s.split_once('=').ok_or("expected TURN=ID")?;
    let turn: u32 = turn.trim().parse().map_err(|_| format!("bad turn {turn:?}"))?;
    if turn == 0 {
        return Err("turns start at 1".into());
    }
    let id = id.trim();
    if id.is_empty() {
        return Err("empty entry id".into());
    }
    Ok((turn, id.to_string()))
}

/// Reject any explicit URI scheme (e.g., http://, https://, file://).
#[inline]
fn has_scheme(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    lower.contains("://") || lower.starts_with("http:") || lower.starts_with("https:") || lower.starts_with("file:")
}

#[inline]
fn ensure_local_path(p: &Path) -> Result<(), CliError> {
    if let Some(s) = p.to_str() {
        if has_scheme(s) {
            return Err(CliError::NonLocalPath(s.to_string()));
        }
    }
    Ok(())
}

/// Ensure a path exists as a regular file.
fn ensure_local_exists(p: &Path, label: &'static str) -> Result<(), CliError> {
    let meta = fs::metadata(p).map_err(|_| CliError::NotFound(format!("{label} {}", p.display())))?;
    if !meta.is_file() {
        return Err(CliError::NotFound(format!("{label} {}", p.display())));
    }
    Ok(())
}

/// Best-effort normalization to an absolute path.
/// If canonicalize fails (e.g., path doesn't exist yet), join onto CWD.
fn normalize_path(p: &Path) -> PathBuf {
    fs::canonicalize(p).unwrap_or_else(|_| {
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join(p)
        }
    })
}
