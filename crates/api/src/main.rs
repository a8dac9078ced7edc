//! `roster` - command line entry point.
//!
//! Runs employee reports against Nexti and inspects the service configuration.

use std::io::Write;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use roster_auth::Role;
use roster_api::app::{ApiKeyGuard, SheetSyncEndpoint};
use roster_infra::{AppConfig, NextiConfig, SheetsConfig};
use roster_nexti::{EmployeeRecord, NextiClient, ReportRequest, ReportService};
use roster_observability::LogFormat;

#[derive(Parser, Debug)]
#[command(name = "roster")]
#[command(about = "HR roster reports on top of the Nexti API")]
#[command(version)]
struct Args {
    /// Log output format (json or pretty). Logs go to stderr.
    #[arg(long, default_value = "json", env = "ROSTER_LOG_FORMAT")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the employee report and print it as JSON on stdout.
    Report {
        /// Window start, `ddmmyyyy`. Needs `--finish`.
        #[arg(long)]
        start: Option<String>,

        /// Window end, `ddmmyyyy`. Needs `--start`.
        #[arg(long)]
        finish: Option<String>,

        /// Pretty-print the JSON output.
        #[arg(long)]
        pretty: bool,
    },

    /// Current-state report for the spreadsheet sync, checked against `FLASK_API_KEY`.
    SheetSync {
        /// Plain key, as sent in the `X-API-KEY` header.
        #[arg(long, env = "ROSTER_API_KEY", hide_env_values = true)]
        api_key: String,
    },

    /// List the roles panel users may hold, highest rank first.
    Roles,

    /// Load the full configuration from the environment and report problems.
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    roster_observability::tracing::init(args.log_format);

    match args.command {
        Command::Report { start, finish, pretty } => run_report(ReportRequest { start, finish }, pretty).await,
        Command::SheetSync { api_key } => run_sheet_sync(&api_key).await,
        Command::Roles => print_roles(),
        Command::CheckConfig => check_config(),
    }
}

async fn run_report(request: ReportRequest, pretty: bool) -> Result<()> {
    let config = NextiConfig::from_env().context("failed to load Nexti configuration")?;
    let client = NextiClient::new(config.settings()).context("failed to build HTTP client")?;
    let service = ReportService::new(client, config.report_settings());

    let records = service.generate(&request).await.context("report failed")?;
    tracing::info!(rows = records.len(), "writing report");

    write_records(&records, pretty)
}

async fn run_sheet_sync(api_key: &str) -> Result<()> {
    let config = NextiConfig::from_env().context("failed to load Nexti configuration")?;
    let client = NextiClient::new(config.settings()).context("failed to build HTTP client")?;
    let endpoint = SheetSyncEndpoint::new(
        ApiKeyGuard::new(&SheetsConfig::from_env()),
        ReportService::new(client, config.report_settings()),
    );

    let records = endpoint.sync(Some(api_key)).await.context("sheet sync failed")?;
    write_records(&records, false)
}

fn write_records(records: &[EmployeeRecord], pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(records)?
    } else {
        serde_json::to_string(records)?
    };

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{json}")?;
    Ok(())
}

fn print_roles() -> Result<()> {
    let mut roles = Role::known();
    roles.sort_by_key(|role| std::cmp::Reverse(roster_auth::level(role)));

    let mut stdout = std::io::stdout().lock();
    for role in roles {
        writeln!(stdout, "{}\t{}", roster_auth::level(&role), role)?;
    }
    Ok(())
}

fn check_config() -> Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::info!(
        nexti = ?config.nexti,
        auth = ?config.auth,
        mail = ?config.mail,
        sheets = ?config.sheets,
        "configuration ok"
    );

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "configuration ok")?;
    Ok(())
}
