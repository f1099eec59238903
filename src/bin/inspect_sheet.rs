use clap::Parser;
use datalogger_normalizer::diagnostics::{CandidateCounts, SheetInspection};
use datalogger_normalizer::{Normalizer, NormalizerConfig, WorkbookLoader};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "inspect-sheet")]
#[command(about = "Show how each sheet of a logger export is read and scored", long_about = None)]
struct Cli {
    /// Spreadsheet export (.xls or .xlsx)
    file: PathBuf,

    /// Only inspect this sheet
    sheet: Option<String>,

    /// Emit the inspection as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn print_counts(title: &str, counts: &CandidateCounts) {
    println!(
        "  {title:<18} {:?} via {}: {} rows, {} timestamps, {} temperatures, {} humidities",
        counts.origin,
        counts.strategy,
        counts.rows,
        counts.timestamps,
        counts.temperatures,
        counts.humidities
    );
}

fn print_inspection(inspection: &SheetInspection) {
    println!("\nSheet: {}", inspection.sheet);
    println!("{}", "=".repeat(100));
    println!(
        "Dimensions: {} rows x {} columns",
        inspection.grid_rows, inspection.grid_columns
    );

    print_counts("as given", &inspection.as_given);
    match &inspection.header_autodetect {
        Some(counts) => print_counts("header autodetect", counts),
        None => println!("  header autodetect  no header-like row"),
    }
    print_counts("chosen", &inspection.chosen);

    println!("\nColumns:");
    for column in &inspection.labels {
        let role = column
            .role
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("  {:3}: {:<30} {}", column.column, column.label, role);
    }

    if !inspection.date_columns.is_empty() {
        println!("\nDate-bearing columns:");
        for date in &inspection.date_columns {
            let order = date
                .order
                .map(|o| format!("{o:?}"))
                .unwrap_or_else(|| "serial".to_string());
            println!(
                "  {:3}: {:<30} {:<10} order {:<11} {} resolved",
                date.column, date.label, date.role, order, date.resolved
            );
        }
    }

    if !inspection.unresolved_samples.is_empty() {
        println!("\nUnresolved rows (first {}):", inspection.unresolved_samples.len());
        for sample in &inspection.unresolved_samples {
            print!("  Row {:5}: ", sample.row);
            for cell in &sample.cells {
                if cell.is_empty() {
                    print!("[empty] ");
                } else {
                    print!("[{cell}] ");
                }
            }
            println!();
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let sheets = WorkbookLoader::new(&cli.file).load(cli.sheet.as_deref())?;
    let normalizer = Normalizer::new(NormalizerConfig::from_env());
    let inspections = normalizer.inspect(&sheets);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&inspections)?);
        return Ok(());
    }

    println!("File: {}", cli.file.display());
    println!(
        "Sheets: {}",
        sheets
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    for inspection in &inspections {
        print_inspection(inspection);
    }

    match normalizer.choose_candidate(&sheets) {
        Ok(best) => println!(
            "\nSelected: sheet '{}' ({:?}), {} timestamps, {} temperatures",
            best.sheet_name, best.origin, best.timestamp_count, best.temperature_count
        ),
        Err(e) => println!("\nSelected: none ({e})"),
    }

    Ok(())
}
