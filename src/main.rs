use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use eduxlsx::ai::{Assistant, MistralClient};
use eduxlsx::bot::Dialog;
use eduxlsx::config::BotConfig;
use eduxlsx::telegram::{Poller, TelegramClient};
use eduxlsx::{AiError, HomeworkPeriod, ReportKind, SheetSelector};

#[derive(Parser)]
#[command(name = "eduxlsx", version, about = "Telegram bot for school spreadsheet reports")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true, env = "EDUXLSX_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot with long polling (default)
    Run,

    /// Analyze a spreadsheet locally and print the report
    Report {
        /// schedule, lessons, students, attendance, homework_check or homework_submit
        #[arg(value_parser = parse_kind)]
        kind: ReportKind,

        /// Excel file (.xls or .xlsx)
        file: PathBuf,

        /// Homework check period: month or week
        #[arg(long, default_value = "month", value_parser = parse_period)]
        period: HomeworkPeriod,

        /// Sheet index (0-based) or name
        #[arg(long)]
        sheet: Option<String>,
    },
}

fn parse_kind(s: &str) -> Result<ReportKind, String> {
    s.parse().map_err(|e: eduxlsx::ReportError| e.to_string())
}

fn parse_period(s: &str) -> Result<HomeworkPeriod, String> {
    s.parse().map_err(|e: eduxlsx::ReportError| e.to_string())
}

fn sheet_selector(sheet: &str) -> SheetSelector {
    match sheet.parse::<usize>() {
        Ok(index) => SheetSelector::Index(index),
        Err(_) => SheetSelector::Name(sheet.to_string()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("eduxlsx=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = BotConfig::load(cli.config.as_deref())?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_bot(config).await,
        Commands::Report {
            kind,
            file,
            period,
            sheet,
        } => print_report(&config, kind, &file, period, sheet.as_deref()),
    }
}

async fn run_bot(config: BotConfig) -> Result<()> {
    let poll_timeout = Duration::from_secs(config.poll_timeout_secs);
    let client = Arc::new(TelegramClient::new(
        &config.api_base,
        config.token()?,
        poll_timeout,
        config.max_file_size,
    )?);

    let assistant: Option<Arc<dyn Assistant>> = match MistralClient::from_config(&config.ai) {
        Ok(mistral) => {
            tracing::info!(model = mistral.model(), "AI assistant enabled");
            Some(Arc::new(mistral))
        }
        Err(AiError::NotConfigured) => {
            tracing::warn!("MISTRAL_API_KEY is not set, AI assistant disabled");
            None
        }
        Err(e) => return Err(e.into()),
    };

    let dialog = Arc::new(Dialog::new(client.clone(), assistant, config.analyzer()?));
    let poller = Poller::new(
        client,
        dialog,
        poll_timeout,
        Duration::from_secs(config.retry_delay_secs),
    );
    poller.run().await?;
    Ok(())
}

fn print_report(
    config: &BotConfig,
    kind: ReportKind,
    path: &Path,
    period: HomeworkPeriod,
    sheet: Option<&str>,
) -> Result<()> {
    let mut analyzer = config.analyzer()?.with_homework_period(period);
    if let Some(sheet) = sheet {
        analyzer = analyzer.with_sheet_selector(sheet_selector(sheet));
    }

    let input = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let output = analyzer.analyze(kind, input)?;

    let texts: Vec<&str> = output.messages.iter().map(|m| m.text.as_str()).collect();
    println!("{}", texts.join("\n---\n"));
    Ok(())
}
