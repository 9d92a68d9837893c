use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::io;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing::{error, warn};

use fatigue_guard::error::ErrorSeverity;
use fatigue_guard::export::{self, ExportFormat};
use fatigue_guard::import::ImportManager;
use fatigue_guard::logging::init_logging;
use fatigue_guard::store::{ConflictPolicy, RecordStore, SqliteRecordStore};
use fatigue_guard::validation::RecordValidator;
use fatigue_guard::{
    evaluate_team_from_store, AppConfig, DailyRecord, FatigueError, FatigueHistoryPoint, FatigueMetricsEngine, FatigueStatus, MetricKind,
    RiskLevel, TeamReport,
};

/// FatigueGuard - training load and fatigue monitoring CLI
///
/// Computes ACWR, resting heart rate drift, wellness and session RPE load for
/// each player from daily self-reports, and combines them into a traffic-light
/// risk level.
#[derive(Parser)]
#[command(name = "fatigue-guard")]
#[command(version)]
#[command(about = "Training load and fatigue monitoring CLI", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Record database (overrides the configured path)
    #[arg(long, value_name = "FILE")]
    database: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import daily records from a CSV/JSON file or a directory of them
    Import {
        /// Input file or directory
        path: PathBuf,

        /// Overwrite records that already exist for a player and date
        #[arg(long)]
        replace: bool,
    },

    /// Show one player's fatigue status
    Status {
        /// Player identifier
        #[arg(short, long)]
        player: String,

        /// Reference date (YYYY-MM-DD, default: today)
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the daily ACWR trend of one player
    History {
        /// Player identifier
        #[arg(short, long)]
        player: String,

        /// Last day of the trend (YYYY-MM-DD, default: today)
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Number of days (default from config)
        #[arg(short = 'n', long)]
        days: Option<u16>,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Triage every player in the database
    Team {
        /// Reference date (YYYY-MM-DD, default: today)
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the reference bands of each metric
    Bands {
        /// Only this metric (acwr, rhr, wellness, srpe)
        metric: Option<MetricKind>,
    },

    /// Inspect or create the configuration file
    Config {
        /// Print the effective configuration
        #[arg(short, long)]
        show: bool,

        /// Write a default configuration file
        #[arg(short, long)]
        init: bool,

        /// Overwrite an existing file with --init
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    /// File format to write, `None` for a table on stdout
    ///
    /// A table requested with `--output` follows the file extension.
    fn export_format(self, output: Option<&Path>) -> Option<ExportFormat> {
        match self {
            OutputFormat::Table => output.and_then(ExportFormat::from_path),
            OutputFormat::Json => Some(ExportFormat::Json),
            OutputFormat::Csv => Some(ExportFormat::Csv),
        }
    }
}

fn main() {
    if let Err(err) = run(Cli::parse()) {
        report_error(&err);
        std::process::exit(1);
    }
}

/// Print library errors with their user-facing message
fn report_error(err: &anyhow::Error) {
    match err.downcast_ref::<FatigueError>() {
        Some(fatigue_error) => {
            match fatigue_error.severity() {
                ErrorSeverity::Warning => warn!(error = %fatigue_error, "Command stopped"),
                ErrorSeverity::Error => error!(error = %fatigue_error, "Command failed"),
            }
            eprintln!("{} {}", "Error:".red().bold(), fatigue_error.user_message());
        }
        None => eprintln!("{} {:#}", "Error:".red().bold(), err),
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path)?,
        None => AppConfig::load_or_default()?,
    };

    let mut log_config = config.logging.clone();
    log_config.level = log_config.level.raised_by(cli.verbose);
    init_logging(&log_config).context("Failed to initialize logging")?;

    let engine = FatigueMetricsEngine::with_config(config.metrics.clone());
    let database = cli
        .database
        .clone()
        .unwrap_or_else(|| config.store.database_path.clone());

    match cli.command {
        Commands::Import { path, replace } => run_import(&path, &database, replace),

        Commands::Status {
            player,
            date,
            format,
            output,
        } => {
            let date = date.unwrap_or_else(today);
            let store = open_store(&database)?;
            let records = store
                .records_between(&player, engine.window_start(date), date)
                .map_err(FatigueError::from)?;
            let status = engine.evaluate(&player, date, &records);

            match format.export_format(output.as_deref()) {
                None => print_status(&status, &engine, &records),
                Some(ExportFormat::Json) => write_json(&status, output.as_deref())?,
                Some(ExportFormat::Csv) => write_csv(output.as_deref(), |w| export::write_status_csv(std::slice::from_ref(&status), w))?,
            }
            Ok(())
        }

        Commands::History {
            player,
            date,
            days,
            format,
            output,
        } => {
            let date = date.unwrap_or_else(today);
            let days = days.unwrap_or(config.history.default_days);
            let store = open_store(&database)?;
            let history = engine.history_from_store(&store, &player, date, days)?;

            match format.export_format(output.as_deref()) {
                None => print_history(&player, &history),
                Some(ExportFormat::Json) => write_json(&history, output.as_deref())?,
                Some(ExportFormat::Csv) => write_csv(output.as_deref(), |w| export::write_history_csv(&history, w))?,
            }
            Ok(())
        }

        Commands::Team { date, format, output } => {
            let date = date.unwrap_or_else(today);
            let store = open_store(&database)?;
            let report = evaluate_team_from_store(&engine, &store, date)?;

            match format.export_format(output.as_deref()) {
                None => print_team(&report),
                Some(ExportFormat::Json) => write_json(&report, output.as_deref())?,
                Some(ExportFormat::Csv) => {
                    let statuses: Vec<FatigueStatus> = report.statuses().cloned().collect();
                    write_csv(output.as_deref(), |w| export::write_status_csv(&statuses, w))?
                }
            }
            Ok(())
        }

        Commands::Bands { metric } => {
            let kinds = metric.map_or_else(|| MetricKind::ALL.to_vec(), |kind| vec![kind]);
            for kind in kinds {
                print_bands(kind);
            }
            Ok(())
        }

        Commands::Config { show, init, force } => {
            let path = cli.config.clone().unwrap_or_else(AppConfig::default_config_path);

            if init {
                if path.exists() && !force {
                    bail!("Config file already exists: {} (use --force to overwrite)", path.display());
                }
                AppConfig::default().save_to_file(&path)?;
                println!("{} {}", "✓ Wrote default configuration to".green(), path.display());
            }

            if show {
                let toml = toml::to_string_pretty(&config).context("Failed to serialize configuration")?;
                println!("{}", toml);
            }

            if !init && !show {
                println!("Config file: {}", path.display());
                println!("Database:    {}", database.display());
            }
            Ok(())
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn open_store(path: &Path) -> Result<SqliteRecordStore> {
    if !path.exists() {
        bail!(
            "No record database at {} (run `fatigue-guard import` first)",
            path.display()
        );
    }
    Ok(SqliteRecordStore::open(path).map_err(FatigueError::from)?)
}

fn run_import(path: &Path, database: &Path, replace: bool) -> Result<()> {
    let manager = ImportManager::new();

    let records = if path.is_dir() {
        let result = manager.import_directory(path).map_err(FatigueError::from)?;
        for (file, error) in &result.failures {
            eprintln!("{} {}: {}", "✗".red(), file.display(), error);
        }
        println!("Read {} file(s)", result.files_read);
        result.records
    } else {
        manager.import_file(path).map_err(FatigueError::from)?
    };

    let (valid, rejected) = RecordValidator::partition(&records);
    for (record, error) in &rejected {
        eprintln!("{} {} {}: {}", "✗".red(), record.player_id, record.record_date, error);
    }

    let valid: Vec<DailyRecord> = valid.into_iter().cloned().collect();
    let policy = if replace { ConflictPolicy::Replace } else { ConflictPolicy::Skip };

    if let Some(parent) = database.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let mut store = SqliteRecordStore::open(database).map_err(FatigueError::from)?;
    let summary = store.insert_many(&valid, policy).map_err(FatigueError::from)?;

    println!(
        "{} {} inserted, {} replaced, {} skipped as duplicates, {} rejected",
        "✓ Import complete:".green().bold(),
        summary.inserted,
        summary.replaced,
        summary.skipped,
        rejected.len()
    );
    Ok(())
}

fn write_json<T: serde::Serialize + ?Sized>(data: &T, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => export::export_json(data, path)?,
        None => export::write_json(data, io::stdout().lock())?,
    }
    Ok(())
}

fn write_csv<F>(output: Option<&Path>, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn io::Write) -> fatigue_guard::Result<()>,
{
    match output {
        Some(path) => {
            let mut file = std::fs::File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
            write(&mut file)?;
        }
        None => write(&mut io::stdout().lock())?,
    }
    Ok(())
}

fn paint_status(status: &str) -> ColoredString {
    match status {
        "green" => status.green(),
        "yellow" => status.yellow(),
        "orange" => status.truecolor(255, 140, 0),
        "red" => status.red(),
        "black" => status.white().on_black().bold(),
        _ => status.dimmed(),
    }
}

fn paint_level(level: RiskLevel) -> ColoredString {
    let label = level.label();
    match level {
        RiskLevel::NoData => label.dimmed(),
        RiskLevel::Low => label.green().bold(),
        RiskLevel::Moderate => label.yellow().bold(),
        RiskLevel::High => label.red().bold(),
    }
}

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Status")]
    status: String,
}

fn print_status(status: &FatigueStatus, engine: &FatigueMetricsEngine, records: &[DailyRecord]) {
    println!(
        "{} {} on {}",
        "Fatigue status:".bold(),
        status.player_id,
        status.date
    );

    let cause = status
        .overall
        .cause
        .map(|kind| format!(" (driven by {})", kind.label()))
        .unwrap_or_default();
    println!("Overall: {}{}", paint_level(status.overall.level), cause);

    let rows: Vec<MetricRow> = status
        .metrics
        .iter()
        .map(|metric| MetricRow {
            metric: metric.kind().full_label().to_string(),
            value: metric.display_value(),
            status: metric.status_name(),
        })
        .collect();
    println!("{}", Table::new(rows).with(Style::rounded()));

    println!(
        "Data completeness: {}/{} ({}%){}",
        status.completeness.filled,
        status.completeness.total,
        status.completeness.percentage(),
        if status.is_rest_day { ", rest day" } else { "" }
    );

    if status.metrics.acwr.acwr.is_some() {
        println!("{} {}", "ACWR:".bold(), status.metrics.acwr.risk_level.recommendation());
    }

    let streak = engine.missing_report_streak(&status.player_id, status.date, records);
    if streak.needs_reminder() {
        println!(
            "{}",
            format!("⚠ No training report for the last {} day(s)", streak.consecutive_days).yellow()
        );
    }
}

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "Date")]
    date: NaiveDate,
    #[tabled(rename = "Acute (AU/day)")]
    acute: String,
    #[tabled(rename = "Chronic (AU/day)")]
    chronic: String,
    #[tabled(rename = "ACWR")]
    acwr: String,
    #[tabled(rename = "Status")]
    status: String,
}

fn print_history(player: &str, history: &[FatigueHistoryPoint]) {
    println!("{} {}", "ACWR trend:".bold(), player);

    let rows: Vec<HistoryRow> = history
        .iter()
        .map(|point| HistoryRow {
            date: point.date,
            acute: point.acute_load.round_dp(1).to_string(),
            chronic: point.chronic_load.round_dp(1).to_string(),
            acwr: point.acwr.map_or_else(|| "-".to_string(), |r| format!("{:.2}", r)),
            status: point.risk_level.to_string(),
        })
        .collect();
    println!("{}", Table::new(rows).with(Style::rounded()));
}

#[derive(Tabled)]
struct TeamRow {
    #[tabled(rename = "Player")]
    player: String,
    #[tabled(rename = "Overall")]
    overall: String,
    #[tabled(rename = "Cause")]
    cause: String,
    #[tabled(rename = "ACWR")]
    acwr: String,
    #[tabled(rename = "RHR")]
    rhr: String,
    #[tabled(rename = "Wellness")]
    wellness: String,
    #[tabled(rename = "sRPE")]
    srpe: String,
}

fn print_team(report: &TeamReport) {
    let summary = &report.summary;
    println!("{} {} ({} players)", "Team status:".bold(), report.date, summary.total());
    println!(
        "ACWR bands: {} green, {} yellow, {} red, {} black, {} no data",
        summary.green.to_string().green(),
        summary.yellow.to_string().yellow(),
        summary.red.to_string().red(),
        summary.black.to_string().bold(),
        summary.gray.to_string().dimmed()
    );

    let rows: Vec<TeamRow> = report
        .priority_order()
        .into_iter()
        .map(|status| {
            let value = |kind: MetricKind| {
                let metric = status.metrics.get(kind);
                format!("{} [{}]", metric.display_value(), metric.status_name())
            };
            TeamRow {
                player: status.player_id.clone(),
                overall: status.overall.level.label().to_string(),
                cause: status.overall.cause.map(|k| k.label().to_string()).unwrap_or_default(),
                acwr: value(MetricKind::Acwr),
                rhr: value(MetricKind::Rhr),
                wellness: value(MetricKind::Wellness),
                srpe: value(MetricKind::Srpe),
            }
        })
        .collect();
    println!("{}", Table::new(rows).with(Style::rounded()));

    let high_risk = report.high_risk_players();
    if !high_risk.is_empty() {
        println!("{}", "High ACWR risk:".red().bold());
        for status in high_risk {
            println!(
                "  {} {} {}",
                paint_status(&status.metrics.acwr.risk_level.to_string()),
                status.player_id,
                status.metrics.get(MetricKind::Acwr).display_value()
            );
        }
    }

    let reminders = report.needs_reminder();
    if !reminders.is_empty() {
        println!("{}", "Missing reports:".yellow().bold());
        for player in reminders {
            println!(
                "  {} ({} day(s))",
                player.status.player_id, player.missing_reports.consecutive_days
            );
        }
    }
}

#[derive(Tabled)]
struct BandRow {
    #[tabled(rename = "Range")]
    range: &'static str,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Meaning")]
    label: &'static str,
    #[tabled(rename = "Advice")]
    advice: &'static str,
}

fn print_bands(kind: MetricKind) {
    let unit = if kind.unit().is_empty() {
        String::new()
    } else {
        format!(" ({})", kind.unit())
    };
    println!("{}{}", kind.full_label().bold(), unit);

    let rows = kind.reference_bands().iter().map(|band| BandRow {
        range: band.range,
        status: band.status,
        label: band.label,
        advice: band.advice,
    });
    println!("{}", Table::new(rows).with(Style::rounded()));
}
