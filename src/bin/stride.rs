//! Stride CLI - Command-line interface for Synheart Stride
//!
//! Commands:
//! - analyze: Turn a Google Fit aggregate response into a health report
//! - assess: Score an already aggregated daily series
//! - request: Print the aggregate request body for a step window
//! - doctor: Diagnose configuration and scoring constants
//! - schema: Describe input and output formats

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::EnvFilter;

use synheart_stride::adapters::{aggregate_request, DEFAULT_WINDOW_DAYS};
use synheart_stride::aggregator::CalendarZone;
use synheart_stride::pipeline::HealthPipeline;
use synheart_stride::risk::{RiskThresholds, RiskWeights};
use synheart_stride::types::{DailySeries, HealthReport};
use synheart_stride::{PRODUCER_NAME, STRIDE_VERSION};

/// Stride - On-device step aggregation and activity risk scoring
#[derive(Parser)]
#[command(name = "stride")]
#[command(author = "Synheart AI Inc")]
#[command(version = STRIDE_VERSION)]
#[command(about = "Aggregate daily steps and score activity risk", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Turn a Google Fit aggregate response into a health report
    Analyze {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Calendar zone for bucket dates: "local", "UTC", or an offset like "+02:00"
        #[arg(long, default_value = "local")]
        utc_offset: String,

        /// Output format
        #[arg(long, default_value = "json")]
        output_format: OutputFormat,

        /// Wrap the report with producer metadata
        #[arg(long)]
        envelope: bool,

        /// Report without data instead of failing on an unreadable payload
        #[arg(long)]
        lenient: bool,
    },

    /// Score an already aggregated daily series
    Assess {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "json")]
        output_format: OutputFormat,

        /// Wrap the report with producer metadata
        #[arg(long)]
        envelope: bool,
    },

    /// Print the aggregate request body for a daily step window
    Request {
        /// Window end (RFC 3339); defaults to now
        #[arg(long)]
        end: Option<String>,

        /// Window length in days
        #[arg(long, default_value_t = DEFAULT_WINDOW_DAYS)]
        days: i64,
    },

    /// Diagnose configuration and scoring constants
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Input schema (Google Fit aggregate response)
    Input,
    /// Output schema (health report)
    Output,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

/// Install a stderr subscriber; stdout is reserved for report output.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}

fn run(cli: Cli) -> Result<(), StrideCliError> {
    match cli.command {
        Commands::Analyze {
            input,
            output,
            utc_offset,
            output_format,
            envelope,
            lenient,
        } => cmd_analyze(&input, &output, &utc_offset, output_format, envelope, lenient),

        Commands::Assess {
            input,
            output,
            output_format,
            envelope,
        } => cmd_assess(&input, &output, output_format, envelope),

        Commands::Request { end, days } => cmd_request(end.as_deref(), days),

        Commands::Doctor { json } => cmd_doctor(json),

        Commands::Schema { schema_type } => cmd_schema(schema_type),
    }
}

fn cmd_analyze(
    input: &Path,
    output: &Path,
    utc_offset: &str,
    output_format: OutputFormat,
    envelope: bool,
    lenient: bool,
) -> Result<(), StrideCliError> {
    let zone = CalendarZone::parse(utc_offset)?;
    let pipeline = HealthPipeline::with_zone(zone);

    let report = match read_input(input) {
        Ok(raw) if lenient => pipeline.process_google_fit_or_empty(&raw),
        Ok(raw) => pipeline.process_google_fit(&raw)?,
        Err(e) if lenient => {
            warn!(error = %e, "input unreadable, reporting without data");
            pipeline.process_series(DailySeries::empty())
        }
        Err(e) => return Err(e.into()),
    };

    info!(
        days = report.fitness_data.len(),
        risk_score = report.health_analysis.risk_score,
        "analysis complete"
    );

    write_report(&pipeline, report, output, &output_format, envelope)
}

fn cmd_assess(
    input: &Path,
    output: &Path,
    output_format: OutputFormat,
    envelope: bool,
) -> Result<(), StrideCliError> {
    let raw = read_input(input)?;
    let series = DailySeries::from_json(&raw)?;
    debug!(days = series.len(), "loaded daily series");

    let pipeline = HealthPipeline::new();
    let report = pipeline.process_series(series);

    write_report(&pipeline, report, output, &output_format, envelope)
}

fn cmd_request(end: Option<&str>, days: i64) -> Result<(), StrideCliError> {
    if days <= 0 {
        return Err(StrideCliError::InvalidArgument(format!(
            "--days must be positive, got {days}"
        )));
    }

    let end = match end {
        Some(text) => DateTime::parse_from_rfc3339(text)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| StrideCliError::InvalidArgument(format!("--end: {e}")))?,
        None => Utc::now(),
    };

    let body = aggregate_request(end, days)
        .map_err(|e| StrideCliError::InvalidArgument(format!("--days: {e}")))?;

    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

fn cmd_doctor(json: bool) -> Result<(), StrideCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "stride_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Stride version {}", STRIDE_VERSION),
    });

    let thresholds = RiskThresholds::default();
    checks.push(DoctorCheck {
        name: "thresholds".to_string(),
        status: CheckStatus::Ok,
        message: format!(
            "sedentary < {} avg steps, inconsistent > {} std dev, inactive day < {} steps, frequent > {} days",
            thresholds.sedentary_avg_steps,
            thresholds.inconsistent_std_dev,
            thresholds.inactive_day_steps,
            thresholds.frequent_inactive_days
        ),
    });

    let weights = RiskWeights::default();
    let total = u16::from(weights.sedentary_lifestyle)
        + u16::from(weights.inconsistent_activity)
        + u16::from(weights.frequent_inactivity);
    checks.push(DoctorCheck {
        name: "weights".to_string(),
        status: if total == 100 {
            CheckStatus::Ok
        } else {
            CheckStatus::Error
        },
        message: format!(
            "weights {}/{}/{} sum to {}",
            weights.sedentary_lifestyle,
            weights.inconsistent_activity,
            weights.frequent_inactivity,
            total
        ),
    });

    let local_offset = chrono::Local::now().offset().to_string();
    checks.push(DoctorCheck {
        name: "local_timezone".to_string(),
        status: CheckStatus::Ok,
        message: format!("Local buckets dated at UTC{}", local_offset),
    });

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (use --input - to read it)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: STRIDE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Stride Doctor Report");
        println!("====================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(StrideCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn cmd_schema(schema_type: SchemaType) -> Result<(), StrideCliError> {
    match schema_type {
        SchemaType::Input => {
            println!("Input: Google Fit users.dataset.aggregate response");
            println!();
            println!("{{");
            println!("  \"bucket\": [{{");
            println!("    \"startTimeMillis\": \"<epoch ms, string or integer>\",");
            println!("    \"dataset\": [{{ \"point\": [{{ \"value\": [{{ \"intVal\": <steps> }}] }}] }}]");
            println!("  }}]");
            println!("}}");
            println!();
            println!("Absent bucket/dataset/point/value lists are treated as empty;");
            println!("absent intVal counts as 0. One daily record is produced per bucket.");
            println!();
            println!("The assess command instead reads the output fitness_data array.");
        }
        SchemaType::Output => {
            println!("Output: health report");
            println!();
            println!("- fitness_data: [{{ date: \"YYYY-MM-DD\", steps: <integer> }}, ...]");
            println!("- health_analysis:");
            println!("  - risk_score: 0-100 (sedentary 40, inconsistent 30, inactive 30)");
            println!("  - risk_factors: {{ sedentary_lifestyle, inconsistent_activity, frequent_inactivity }}");
            println!("    (empty object when there is no data)");
            println!("  - recommendations: [{{ category, suggestion, action_items }}, ...]");
            println!();
            println!("With --envelope: {{ producer: {{ name, version, instance_id }}, computed_at_utc, report }}");
        }
    }

    Ok(())
}

// Helper functions

fn read_input(input: &Path) -> Result<String, io::Error> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        fs::read_to_string(input)
    }
}

fn write_report(
    pipeline: &HealthPipeline,
    report: HealthReport,
    output: &Path,
    format: &OutputFormat,
    envelope: bool,
) -> Result<(), StrideCliError> {
    let data = if envelope {
        format_output(&pipeline.envelope(report), format)?
    } else {
        format_output(&report, format)?
    };

    if output.to_string_lossy() == "-" {
        println!("{}", data);
    } else {
        fs::write(output, data + "\n")?;
    }

    Ok(())
}

fn format_output<T: Serialize>(value: &T, format: &OutputFormat) -> Result<String, StrideCliError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(value)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
    }
}

// Error types

#[derive(Debug)]
enum StrideCliError {
    Io(io::Error),
    Compute(synheart_stride::ComputeError),
    Json(serde_json::Error),
    InvalidArgument(String),
    DoctorFailed,
}

impl From<io::Error> for StrideCliError {
    fn from(e: io::Error) -> Self {
        StrideCliError::Io(e)
    }
}

impl From<synheart_stride::ComputeError> for StrideCliError {
    fn from(e: synheart_stride::ComputeError) -> Self {
        StrideCliError::Compute(e)
    }
}

impl From<serde_json::Error> for StrideCliError {
    fn from(e: serde_json::Error) -> Self {
        StrideCliError::Json(e)
    }
}

#[derive(Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<StrideCliError> for CliError {
    fn from(e: StrideCliError) -> Self {
        match e {
            StrideCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            StrideCliError::Compute(e) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'stride schema input' for the expected format, or pass --lenient".to_string()),
            },
            StrideCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            StrideCliError::InvalidArgument(msg) => CliError {
                code: "INVALID_ARGUMENT".to_string(),
                message: msg,
                hint: Some("See 'stride --help'".to_string()),
            },
            StrideCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(Serialize)]
enum CheckStatus {
    Ok,
    Error,
}
