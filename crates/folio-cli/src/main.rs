//! folio CLI - inspect, dump and re-encode XLSX files

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use folio::prelude::*;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "folio")]
#[command(author, version, about = "Inspect, dump and re-encode XLSX spreadsheets")]
struct Cli {
    /// Log more (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a workbook
    Info {
        /// Input XLSX file
        input: PathBuf,
    },

    /// List all sheets in a workbook
    Sheets {
        /// Input XLSX file
        input: PathBuf,
    },

    /// Print rows as tab-separated values, one row at a time
    Dump {
        /// Input XLSX file
        input: PathBuf,

        /// Only dump this sheet
        #[arg(short, long)]
        sheet: Option<String>,

        /// Stop after this many rows
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Read a workbook and write it back out
    Convert {
        /// Input XLSX file
        input: PathBuf,

        /// Output XLSX file
        output: PathBuf,

        /// Store parts without compression
        #[arg(long, conflicts_with = "level")]
        stored: bool,

        /// Deflate level
        #[arg(short, long)]
        level: Option<i64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Info { input } => show_info(&input),
        Commands::Sheets { input } => list_sheets(&input),
        Commands::Dump {
            input,
            sheet,
            limit,
        } => dump(&input, sheet.as_deref(), limit),
        Commands::Convert {
            input,
            output,
            stored,
            level,
        } => convert(&input, &output, stored, level),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .init();
}

fn open(input: &Path) -> Result<Workbook> {
    Workbook::open(input).with_context(|| format!("Failed to open '{}'", input.display()))
}

fn show_info(input: &Path) -> Result<()> {
    let workbook = open(input)?;

    println!("File: {}", input.display());
    println!("Name: {}", workbook.name());
    if let Some(metadata) = workbook.metadata() {
        if let Some(creator) = &metadata.creator {
            println!("Creator: {}", creator);
        }
        if let Some(created) = metadata.created {
            println!("Created: {}", created);
        }
        if let Some(modified) = metadata.modified {
            println!("Modified: {}", modified);
        }
        for (key, value) in &metadata.custom {
            println!("Property {}: {}", key, value);
        }
    }
    println!("Sheets: {}", workbook.sheet_count());

    for (i, sheet) in workbook.sheets().iter().enumerate() {
        let columns = sheet.rows().iter().map(Row::len).max().unwrap_or(0);
        println!();
        println!("  Sheet {}: \"{}\"", i, sheet.name());
        if sheet.row_count() == 0 {
            println!("    Used range: empty");
        } else {
            println!(
                "    Used range: {} rows x {} columns",
                sheet.row_count(),
                columns
            );
        }
        println!("    Merged ranges: {}", sheet.merged_cells().len());
        println!("    Column widths: {}", sheet.column_widths().len());
    }

    Ok(())
}

fn list_sheets(input: &Path) -> Result<()> {
    let workbook = open(input)?;

    for (i, sheet) in workbook.sheets().iter().enumerate() {
        println!("{}\t{}", i, sheet.name());
    }

    Ok(())
}

fn dump(input: &Path, sheet: Option<&str>, limit: Option<usize>) -> Result<()> {
    let bytes =
        std::fs::read(input).with_context(|| format!("Failed to read '{}'", input.display()))?;
    let reader = StreamingReader::open(&bytes)
        .with_context(|| format!("Failed to open '{}'", input.display()))?;

    if let Some(name) = sheet {
        if !reader.sheet_names().iter().any(|s| s.eq_ignore_ascii_case(name)) {
            bail!("Sheet '{}' not found in '{}'", name, input.display());
        }
    }

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut written = 0;

    for record in reader {
        let record = record.with_context(|| format!("Failed to read '{}'", input.display()))?;
        if sheet.map_or(false, |name| !record.sheet_name.eq_ignore_ascii_case(name)) {
            continue;
        }
        if limit.map_or(false, |limit| written >= limit) {
            break;
        }

        let fields: Vec<String> = record
            .row
            .cells()
            .iter()
            .map(|cell| tsv_field(&cell.value))
            .collect();
        writeln!(
            out,
            "{}\t{}\t{}",
            record.sheet_name,
            record.row_index + 1,
            fields.join("\t")
        )
        .context("Failed to write to stdout")?;
        written += 1;
    }

    out.flush().context("Failed to write to stdout")?;
    tracing::debug!(rows = written, "dump finished");
    Ok(())
}

/// Render a value as a single TSV field
fn tsv_field(value: &CellValue) -> String {
    let text = match value {
        CellValue::Empty => String::new(),
        CellValue::Number(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{}", n)
            }
        }
        CellValue::String(s) => s.clone(),
        CellValue::Boolean(true) => "TRUE".to_string(),
        CellValue::Boolean(false) => "FALSE".to_string(),
        CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
    };
    text.replace('\t', " ").replace(['\r', '\n'], " ")
}

fn convert(input: &Path, output: &Path, stored: bool, level: Option<i64>) -> Result<()> {
    let workbook = open(input)?;

    let mut options = XlsxWriteOptions::default();
    if stored {
        options = options.with_compression(Compression::Stored);
    }
    if let Some(level) = level {
        options = options.with_compression_level(level);
    }

    let bytes = XlsxWriter::write_with_options(&workbook, &options)
        .with_context(|| format!("Failed to encode '{}'", input.display()))?;
    std::fs::write(output, &bytes)
        .with_context(|| format!("Failed to write '{}'", output.display()))?;

    tracing::debug!(bytes = bytes.len(), "converted");
    eprintln!(
        "Wrote {} sheets to '{}' ({} bytes)",
        workbook.sheet_count(),
        output.display(),
        bytes.len()
    );
    Ok(())
}
