// crates/ld_cli/src/main.rs
//
// Wires up: exit codes, typed error mapping, CLI parsing, logging, the
// validate-only short-circuit, and the full run path
// (load → draw engine → winner lines → exported files).

mod args;

mod exitcodes {
    pub const OK: i32 = 0;
    pub const VALIDATION: i32 = 2;
    pub const IO: i32 = 4;
    /// No draw could be made (empty pool or empty schedule).
    pub const REFUSED: i32 = 5;
}

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use chrono::Utc;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use args::{parse_and_validate as parse_cli, Args};

use ld_algo::PrizeSchedule;
use ld_core::{DrawError, DrawParams};
use ld_engine::{DrawEvent, DrawMachine, DrawSession, Spawned};
use ld_io::{DrawConfig, ImportReport, IoError};
use ld_report::{build_model, render_csv, ReportMeta};

/// Central error type for CLI → exit-code mapping.
#[derive(Debug)]
enum MainError {
    /// Config / entries shape or domain failures
    Validation(String),
    /// Read/write/path errors
    Io(String),
    /// The engine refused to draw at all
    Refused(String),
}

impl std::fmt::Display for MainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MainError::Validation(s) => write!(f, "validation: {s}"),
            MainError::Io(s) => write!(f, "io: {s}"),
            MainError::Refused(s) => write!(f, "draw: {s}"),
        }
    }
}

/// Inputs after loading and validation.
struct Loaded {
    schedule: PrizeSchedule,
    params: DrawParams,
    import: ImportReport,
    entries_sha256: String,
}

fn main() -> ExitCode {
    let args = match parse_cli() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("ld: error: {e}");
            return ExitCode::from(exitcodes::VALIDATION as u8);
        }
    };
    init_tracing(&args);

    let result = if args.validate_only {
        validate_only(&args)
    } else {
        run(&args)
    };

    let rc = match result {
        Ok(()) => exitcodes::OK,
        Err(e) => {
            eprintln!("ld: error: {e}");
            map_error(&e)
        }
    };
    ExitCode::from(rc as u8)
}

/// `RUST_LOG` wins when set; otherwise info, debug with -v, warn with -q.
fn init_tracing(args: &Args) {
    let default = if args.quiet {
        "warn"
    } else if args.verbose > 0 {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

fn map_error(e: &MainError) -> i32 {
    use exitcodes::*;
    match e {
        MainError::Validation(_) => VALIDATION,
        MainError::Io(_) => IO,
        MainError::Refused(_) => REFUSED,
    }
}

fn map_io_err(e: IoError) -> MainError {
    match e {
        IoError::Path(s) => MainError::Io(s),
        other => MainError::Validation(other.to_string()),
    }
}

// ------------------------------------------------------------------
// Loading
// ------------------------------------------------------------------

fn load_inputs(args: &Args) -> Result<Loaded, MainError> {
    let mut cfg = match &args.config {
        Some(path) => ld_io::load_config(path).map_err(map_io_err)?,
        None => DrawConfig::default(),
    };

    if args.seed.is_some() {
        cfg.seed = args.seed;
    }
    if let Some(ms) = args.spin_ms {
        cfg.timing.spin_ms = ms;
    }
    if let Some(ms) = args.resample_ms {
        cfg.timing.resample_ms = ms;
    }
    if let Some(ms) = args.reveal_ms {
        cfg.timing.reveal_ms = ms;
    }
    for (turn, id) in &args.overrides {
        cfg.set_override(*turn, id)
            .map_err(|e| MainError::Validation(e.to_string()))?;
    }

    let schedule = cfg.schedule().map_err(map_io_err)?;
    let params = cfg.params().map_err(map_io_err)?;

    let import = ld_io::load_entries(&args.entries).map_err(map_io_err)?;
    if import.rejected_rows > 0 {
        warn!(rows = import.rejected_rows, "rows skipped: missing id, name, or phone");
    }
    if !import.duplicate_ids.is_empty() {
        let ids: Vec<&str> = import.duplicate_ids.iter().map(|id| id.as_str()).collect();
        warn!(count = ids.len(), ids = ?ids, "duplicate entry ids skipped");
    }
    let entries_sha256 = ld_io::entries_sha256(&import.entries);

    Ok(Loaded {
        schedule,
        params,
        import,
        entries_sha256,
    })
}

fn validate_only(args: &Args) -> Result<(), MainError> {
    let loaded = load_inputs(args)?;
    if !args.quiet {
        println!(
            "entries: {} accepted, {} rejected, {} duplicate",
            loaded.import.accepted(),
            loaded.import.rejected_rows,
            loaded.import.duplicate_ids.len()
        );
        for tier in loaded.schedule.iter() {
            println!("tier: {} ({}) x{}", tier.name, tier.value, tier.quantity);
        }
        println!("entries sha256: {}", loaded.entries_sha256);
    }
    Ok(())
}

// ------------------------------------------------------------------
// Run
// ------------------------------------------------------------------

fn run(args: &Args) -> Result<(), MainError> {
    let loaded = load_inputs(args)?;
    let entries_sha256 = loaded.entries_sha256;
    let pool = loaded
        .import
        .into_pool()
        .map_err(|e| MainError::Validation(e.to_string()))?;
    let session = DrawSession::with_pool(pool, loaded.schedule, loaded.params);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(|e| MainError::Io(format!("runtime: {e}")))?;
    let session = rt.block_on(draw(session, args))?;

    write_outputs(args, &session, entries_sha256)
}

/// Drive the engine until the schedule or the pool runs out, or `--draws` is reached.
async fn draw(session: DrawSession, args: &Args) -> Result<DrawSession, MainError> {
    let Spawned {
        machine,
        mut events,
        task,
    } = DrawMachine::spawn(session);

    let mut made = 0u32;
    let outcome = loop {
        if args.draws.is_some_and(|n| made >= n) {
            break Ok(());
        }
        match machine.start().await {
            Ok(ticket) => debug!(turn = ticket.turn, tier = ticket.tier_index, "spinning"),
            Err(e @ (DrawError::NoEligibleEntries | DrawError::ScheduleExhausted)) => {
                if made == 0 {
                    break Err(MainError::Refused(e.to_string()));
                }
                info!(reason = %e, draws = made, "draw finished");
                break Ok(());
            }
            Err(e) => break Err(MainError::Refused(e.to_string())),
        }

        let revealed = loop {
            match events.recv().await {
                Some(DrawEvent::WinnerReady(w)) => break Some(w),
                Some(DrawEvent::Voided) | None => break None,
                Some(_) => {}
            }
        };
        let Some(w) = revealed else {
            break Err(MainError::Refused("draw ended without a winner".into()));
        };
        made += 1;
        if !args.quiet {
            println!(
                "#{:<3} {:<20} {:<10} {:<24} {}",
                w.turn,
                w.tier_name,
                w.entry.id,
                w.entry.name,
                w.entry.masked_phone()
            );
        }
    };

    drop(machine);
    let session = task
        .await
        .map_err(|e| MainError::Io(format!("draw task: {e}")))?;
    outcome.map(|()| session)
}

// ------------------------------------------------------------------
// Output
// ------------------------------------------------------------------

fn write_outputs(args: &Args, session: &DrawSession, entries_sha256: String) -> Result<(), MainError> {
    let now = Utc::now();
    let winners = session.ledger().as_slice();

    fs::create_dir_all(&args.out)
        .map_err(|e| MainError::Io(format!("{}: {e}", args.out.display())))?;

    let file_name = ld_report::export_file_name(&now);
    let stem = file_name.trim_end_matches(".csv");

    let meta = ReportMeta {
        generated_at: Some(now),
        total_entries: session.pool().len(),
        seed: session.params().seed,
        entries_sha256: Some(entries_sha256),
        winners_sha256: Some(ld_io::winners_sha256(winners)),
    };
    let model = build_model(session.schedule(), winners, &session.tier_quotas(), meta)
        .map_err(|e| MainError::Validation(e.to_string()))?;

    for kind in args.renders() {
        let path = args.out.join(format!("{stem}.{kind}"));
        let body = match kind {
            "csv" => render_csv(winners),
            #[cfg(feature = "report-json")]
            "json" => ld_report::render_json_string(&model)
                .map_err(|e| MainError::Validation(e.to_string()))?,
            #[cfg(feature = "report-html")]
            "html" => ld_report::render_html(&model),
            other => {
                return Err(MainError::Validation(format!(
                    "renderer {other:?} not built into this binary"
                )))
            }
        };
        write_file(&path, body.as_bytes())?;
    }
    Ok(())
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), MainError> {
    ld_io::write_atomic(path, bytes).map_err(|e| MainError::Io(e.to_string()))?;
    info!(path = %path.display(), bytes = bytes.len(), "wrote");
    Ok(())
}
