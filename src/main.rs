//! Command-line front end for the email-warden verification engine.

use clap::{Parser, ValueEnum};
use email_warden_core::{
    AppError, ConfigBuilder, Disposition, DnsResolver, Engine, Result, RunEvent, SmtpProber,
    Verdict, VerdictStore,
};
use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "email-warden",
    version,
    about = "Verify email address deliverability without sending mail: syntax, DNS, live SMTP probing, catch-all detection, and risk scoring."
)]
struct Cli {
    /// Input file: newline-delimited addresses or a JSON array of strings.
    input: PathBuf,

    /// Write each verdict as a JSON line to this file (stdout otherwise).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Append every verdict to this JSONL history file.
    #[arg(long)]
    history: Option<PathBuf>,

    /// Export a CSV of verdicts to this file after the run.
    #[arg(long)]
    export: Option<PathBuf>,

    /// Restrict the CSV export to one disposition.
    #[arg(long, value_enum, default_value_t = ExportFilter::All)]
    filter: ExportFilter,

    /// Number of concurrent verification workers.
    #[arg(short, long, default_value_t = 4)]
    concurrency: usize,

    /// Path to a TOML configuration file.
    #[arg(long, env = "EMAIL_WARDEN_CONFIG")]
    config: Option<PathBuf>,

    /// Sender address used in the MAIL FROM probe command.
    #[arg(long)]
    sender: Option<String>,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ExportFilter {
    All,
    Valid,
    Risky,
    Invalid,
}

impl ExportFilter {
    fn as_disposition(self) -> Option<Disposition> {
        match self {
            ExportFilter::All => None,
            ExportFilter::Valid => Some(Disposition::Valid),
            ExportFilter::Risky => Some(Disposition::Risky),
            ExportFilter::Invalid => Some(Disposition::Invalid),
        }
    }
}

/// History collaborator: appends one JSON line per verdict. The engine only
/// ever writes through this hook; it never reads back.
struct JsonlStore {
    writer: Mutex<BufWriter<File>>,
}

impl JsonlStore {
    fn open(path: &PathBuf) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
        })
    }
}

impl VerdictStore for JsonlStore {
    fn persist(&self, verdict: &Verdict) {
        let mut writer = self.writer.lock();
        if let Ok(line) = serde_json::to_string(verdict) {
            if let Err(e) = writeln!(writer, "{}", line) {
                tracing::warn!("Failed to append verdict to history: {}", e);
            }
            writer.flush().ok();
        }
    }
}

fn init_tracing(verbosity: u8) {
    let default_directive = match verbosity {
        0 => "email_warden=info,email_warden_core=info",
        1 => "email_warden=debug,email_warden_core=debug",
        _ => "email_warden=trace,email_warden_core=trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut builder = ConfigBuilder::new();
    if let Some(path) = &cli.config {
        builder = builder.with_config_path(path.display().to_string());
    }
    if let Some(sender) = &cli.sender {
        builder = builder.with_smtp_sender_email(sender.clone());
    }
    let config = Arc::new(builder.build()?);
    tracing::debug!("Effective configuration: {:?}", config);

    let candidates = email_warden_core::utils::input::read_candidates(&cli.input)?;

    let resolver = DnsResolver::from_config(&config)?;
    let prober = Arc::new(SmtpProber::new(config.clone()));
    let mut engine = Engine::new(config, resolver, prober);
    if let Some(path) = &cli.history {
        engine = engine.with_store(Arc::new(JsonlStore::open(path)?));
    }

    let mut handle = engine.run(candidates, cli.concurrency);

    let mut out: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(std::io::stdout().lock()),
    };

    let bar = ProgressBar::hidden();
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} verified ({eta})",
        )
        .map_err(|e| AppError::Initialization(format!("Progress bar template: {}", e)))?
        .progress_chars("=> "),
    );

    while let Some(event) = handle.next_event().await {
        match event {
            RunEvent::Progress(stats) => {
                if bar.is_hidden() && stats.total > 0 {
                    bar.set_length(stats.total);
                    bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
                }
                bar.set_position(stats.completed);
            }
            RunEvent::Result(verdict) => {
                writeln!(out, "{}", serde_json::to_string(&verdict)?)?;
            }
        }
    }
    out.flush()?;
    bar.finish_and_clear();

    let verdicts = handle.wait().await;
    let (valid, risky, invalid) = verdicts.iter().fold((0u64, 0u64, 0u64), |acc, v| {
        match v.disposition {
            Disposition::Valid => (acc.0 + 1, acc.1, acc.2),
            Disposition::Risky => (acc.0, acc.1 + 1, acc.2),
            Disposition::Invalid => (acc.0, acc.1, acc.2 + 1),
        }
    });
    tracing::info!(
        "Run complete at {}: {} verified ({} valid, {} risky, {} invalid).",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        verdicts.len(),
        valid,
        risky,
        invalid
    );

    if let Some(path) = &cli.export {
        let csv = email_warden_core::utils::export::to_csv(&verdicts, cli.filter.as_disposition());
        std::fs::write(path, csv)?;
        tracing::info!("Exported CSV to {}", path.display());
    }

    Ok(())
}
