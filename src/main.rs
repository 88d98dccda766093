//! CLI entry point for the volley_scout tool.
//!
//! Provides subcommands for recording rallies from an operator script,
//! reporting set KPIs, rolling statistics up across matches, exporting the
//! canonical point log and auditing it for incomplete data.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use volley_scout::analyzers::{RollupFilter, compute_rollup, compute_set_kpis, consolidate};
use volley_scout::config::KpiConfig;
use volley_scout::model::{Side, StaticRoster};
use volley_scout::output::{export_rallies, write_json};
use volley_scout::recorder::scan_record;
use volley_scout::script::{Script, replay};
use volley_scout::store::{CsvStore, PointLogStore};

#[derive(Parser)]
#[command(name = "volley_scout")]
#[command(about = "Point-by-point volleyball scouting and KPIs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON script of operator commands into the point log
    Record {
        /// Path to the script file
        #[arg(value_name = "SCRIPT")]
        script: String,

        /// CSV point log to write rallies to
        #[arg(short, long, default_value = "points.csv")]
        log: PathBuf,

        /// Roster JSON used for jersey numbers
        #[arg(short, long)]
        roster: Option<String>,
    },
    /// Compute the KPI report of one set
    Report {
        #[arg(long)]
        match_id: i64,

        #[arg(long)]
        set_no: u8,

        /// CSV point log to read
        #[arg(short, long, default_value = "points.csv")]
        log: PathBuf,

        /// Roster JSON used for player sides and zones
        #[arg(short, long)]
        roster: Option<String>,

        /// KPI thresholds as JSON
        #[arg(short, long)]
        config: Option<String>,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Aggregate statistics across matches
    Rollup {
        /// CSV point log to read
        #[arg(short, long, default_value = "points.csv")]
        log: PathBuf,

        /// Roster JSON listing the players of every match
        #[arg(short, long)]
        roster: Option<String>,

        /// Only include these matches (repeatable)
        #[arg(long = "match-id")]
        match_ids: Vec<i64>,

        /// Only include one side (CASA or FORA)
        #[arg(long, value_parser = parse_side)]
        side: Option<Side>,

        /// KPI thresholds as JSON
        #[arg(short, long)]
        config: Option<String>,

        /// Write the rollup here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Export one canonical CSV row per rally
    Export {
        #[arg(long)]
        match_id: i64,

        /// Restrict the export to one set
        #[arg(long)]
        set_no: Option<u8>,

        /// CSV point log to read
        #[arg(short, long, default_value = "points.csv")]
        log: PathBuf,

        /// Export file
        #[arg(short, long, default_value = "export.csv")]
        output: PathBuf,

        /// Gzip compress the export
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
    /// List stored rallies with incomplete data
    Audit {
        #[arg(long)]
        match_id: i64,

        #[arg(long)]
        set_no: Option<u8>,

        /// CSV point log to read
        #[arg(short, long, default_value = "points.csv")]
        log: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/volley_scout.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("volley_scout.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Record { script, log, roster } => record(&script, &log, roster.as_deref())?,
        Commands::Report {
            match_id,
            set_no,
            log,
            roster,
            config,
            output,
        } => {
            let config = KpiConfig::load_or_default(config.as_deref())?;
            report(
                match_id,
                set_no,
                &log,
                roster.as_deref(),
                &config,
                output.as_deref(),
            )?
        }
        Commands::Rollup {
            log,
            roster,
            match_ids,
            side,
            config,
            output,
        } => {
            let config = KpiConfig::load_or_default(config.as_deref())?;
            let filter = RollupFilter {
                match_ids: (!match_ids.is_empty()).then_some(match_ids),
                side,
            };
            rollup(&log, roster.as_deref(), &filter, &config, output.as_deref())?
        }
        Commands::Export {
            match_id,
            set_no,
            log,
            output,
            gzip,
        } => export(match_id, set_no, &log, &output, gzip)?,
        Commands::Audit {
            match_id,
            set_no,
            log,
        } => audit(match_id, set_no, &log)?,
    }

    Ok(())
}

fn parse_side(value: &str) -> Result<Side, String> {
    match value.to_ascii_uppercase().as_str() {
        "CASA" => Ok(Side::Casa),
        "FORA" => Ok(Side::Fora),
        other => Err(format!("unknown side '{other}', expected CASA or FORA")),
    }
}

fn load_roster(path: Option<&str>) -> Result<StaticRoster> {
    match path {
        Some(path) => StaticRoster::load(path),
        None => {
            warn!("No roster given, player sides are inferred from the rows");
            Ok(StaticRoster::default())
        }
    }
}

/// Replays an operator script into the CSV point log.
#[tracing::instrument(skip(log, roster), fields(log = %log.display()))]
fn record(script: &str, log: &Path, roster: Option<&str>) -> Result<()> {
    let script = Script::load(script)?;
    let roster = load_roster(roster)?;
    let mut store = CsvStore::new(log);

    let summary = replay(&script, &mut store, &roster)?;
    info!(
        committed = summary.committed.len(),
        removed = summary.removed.len(),
        rejected = summary.rejected.len(),
        "Script replayed"
    );
    for rejection in &summary.rejected {
        warn!(index = rejection.index, reason = %rejection.message, "Command rejected");
    }
    Ok(())
}

/// Computes the KPI report of one set, compared with the set before it.
#[tracing::instrument(skip(log, roster, config, output))]
fn report(
    match_id: i64,
    set_no: u8,
    log: &Path,
    roster: Option<&str>,
    config: &KpiConfig,
    output: Option<&Path>,
) -> Result<()> {
    let store = CsvStore::new(log);
    let roster = load_roster(roster)?;
    let rows = store.query(match_id, Some(set_no))?;
    if rows.is_empty() {
        warn!("No rallies stored for this set");
    }

    let previous = match set_no.checked_sub(1).filter(|n| *n > 0) {
        Some(prev) => store.query(match_id, Some(prev))?,
        None => Vec::new(),
    };
    let previous = (!previous.is_empty()).then_some(previous.as_slice());

    let report = compute_set_kpis(&rows, previous, &roster, config);
    info!(
        rallies = report.rallies,
        casa = report.score.casa,
        fora = report.score.fora,
        "Set report ready"
    );
    write_json(output, &report)
}

/// Rolls statistics up across every stored match that passes `filter`.
#[tracing::instrument(skip_all, fields(log = %log.display()))]
fn rollup(
    log: &Path,
    roster: Option<&str>,
    filter: &RollupFilter,
    config: &KpiConfig,
    output: Option<&Path>,
) -> Result<()> {
    let rows = CsvStore::new(log).load_all()?;
    let roster = load_roster(roster)?;
    let stats = compute_rollup(&rows, &roster.players, filter, config);
    write_json(output, &stats)
}

/// Writes the canonical rallies of a match, or of one of its sets.
#[tracing::instrument(skip(log, output), fields(output = %output.display()))]
fn export(match_id: i64, set_no: Option<u8>, log: &Path, output: &Path, gzip: bool) -> Result<()> {
    let rows = CsvStore::new(log).query(match_id, set_no)?;
    let rallies = consolidate(&rows);
    let written = export_rallies(output, &rallies, gzip)
        .with_context(|| format!("export of match {match_id} failed"))?;
    info!(path = %written.display(), "Export complete");
    Ok(())
}

/// Reports every completeness warning found in the stored rallies.
#[tracing::instrument(skip(log))]
fn audit(match_id: i64, set_no: Option<u8>, log: &Path) -> Result<()> {
    let rows = CsvStore::new(log).query(match_id, set_no)?;
    let rallies = consolidate(&rows);

    let mut flagged = 0;
    for rally in &rallies {
        let warnings = scan_record(rally);
        if warnings.is_empty() {
            continue;
        }
        flagged += 1;
        for warning in warnings {
            warn!(
                set_no = rally.set_no,
                rally_no = rally.rally_no,
                action = %warning.action,
                issue = %warning.kind,
                "Incomplete rally data"
            );
        }
    }

    info!(rallies = rallies.len(), flagged, "Audit complete");
    Ok(())
}
