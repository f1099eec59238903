use clap::Parser;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

use datalogger_normalizer::record::ErrorOutput;
use datalogger_normalizer::{NormalizeError, Normalizer, NormalizerConfig, WorkbookLoader};

#[derive(Parser)]
#[command(name = "datalogger-normalizer")]
#[command(about = "Normalize temperature/humidity logger spreadsheets into JSON lines", long_about = None)]
struct Cli {
    /// Spreadsheet export (.xls or .xlsx)
    file: PathBuf,

    /// Only consider this sheet
    sheet: Option<String>,

    /// Print a report of rows with measurements but no timestamp instead of records
    #[arg(long)]
    gaps: bool,

    /// Rows scanned when looking for a shifted header
    #[arg(long, env = "NORMALIZER_HEADER_SCAN_ROWS")]
    header_scan_rows: Option<usize>,

    /// Rows searched above/below a bare time for its date
    #[arg(long, env = "NORMALIZER_NEARBY_DATE_WINDOW")]
    nearby_date_window: Option<usize>,

    /// Maximum samples included in the gap report
    #[arg(long, env = "NORMALIZER_MAX_GAP_SAMPLES")]
    max_gap_samples: Option<usize>,
}

impl Cli {
    fn config(&self) -> NormalizerConfig {
        let mut config = NormalizerConfig::from_env();
        if let Some(rows) = self.header_scan_rows {
            config.header_scan_rows = rows;
        }
        if let Some(window) = self.nearby_date_window {
            config.nearby_date_window = window;
        }
        if let Some(samples) = self.max_gap_samples {
            config.max_gap_samples = samples;
        }
        config
    }
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),
    #[error("Failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let normalizer = Normalizer::new(cli.config());
    let sheets = WorkbookLoader::new(&cli.file).load(cli.sheet.as_deref())?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if cli.gaps {
        let report = normalizer.gap_report(&sheets)?;
        serde_json::to_writer_pretty(&mut out, &report)?;
        writeln!(out)?;
    } else {
        let normalized = normalizer.normalize(&sheets)?;
        for record in &normalized.records {
            writeln!(out, "{}", record.to_json_line()?)?;
        }
    }

    out.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // stdout carries JSON lines only
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Normalize(e)) => {
            error!("{}: {}", cli.file.display(), e);
            let output = ErrorOutput {
                error: e.to_string(),
            };
            if let Ok(line) = serde_json::to_string(&output) {
                println!("{line}");
            }
            ExitCode::from(e.exit_code())
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
