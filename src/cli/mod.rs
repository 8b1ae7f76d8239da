pub mod export;
pub mod init;
pub mod report;
pub mod rules;
pub mod sync;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use pocketbook::analysis::{analyze, AnalysisResult};
use pocketbook::categorizer::CategoryTable;
use pocketbook::error::{PocketbookError, Result};
use pocketbook::importer::parse_file;
use pocketbook::models::ParseOutcome;
use pocketbook::settings::{shellexpand_path, Settings};

/// One month's export, parsed and analysed.
pub(crate) struct LoadedMonth {
    pub source: PathBuf,
    pub outcome: ParseOutcome,
    pub result: AnalysisResult,
    pub table: CategoryTable,
}

impl LoadedMonth {
    /// Earliest transaction date, used to order months in the workbook.
    pub fn period_start(&self) -> Option<String> {
        self.outcome
            .transactions
            .iter()
            .map(|t| t.date)
            .min()
            .map(|d| d.to_string())
    }
}

fn period_label(month: Option<&str>, source: &std::path::Path) -> String {
    match month {
        Some(m) => m.trim().to_lowercase(),
        None => source
            .file_stem()
            .and_then(|s| s.to_str())
            .map(|s| s.strip_prefix("hsbc_").unwrap_or(s).to_lowercase())
            .unwrap_or_else(|| "unknown".to_string()),
    }
}

/// Resolve the source for a month (or an explicit file), parse it and run the
/// analysis. A source without a single valid transaction is an error.
pub(crate) fn load_month(
    settings: &Settings,
    month: Option<&str>,
    file: Option<&str>,
) -> Result<LoadedMonth> {
    let source = match (file, month) {
        (Some(f), _) => PathBuf::from(shellexpand_path(f)),
        (None, Some(m)) => settings.source_for_month(m),
        (None, None) => {
            return Err(PocketbookError::Other(
                "a month or --file is required".to_string(),
            ))
        }
    };
    let table = settings.category_table()?;
    let outcome = parse_file(&source, &table)?;
    if outcome.transactions.is_empty() {
        return Err(PocketbookError::NoTransactions {
            origin: source.display().to_string(),
            skipped: outcome.skipped.len(),
        });
    }
    let period = period_label(month, &source);
    let result = analyze(
        &outcome.transactions,
        &outcome.daily,
        &period,
        &settings.norms,
        settings.period_days,
    );
    Ok(LoadedMonth {
        source,
        outcome,
        result,
        table,
    })
}

#[derive(Parser)]
#[command(
    name = "pocketbook",
    about = "Monthly spending reports from bank CSV exports.",
    after_help = "Run without a command to be prompted for a month."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write settings and create the data directory and workbook.
    Init {
        /// Directory holding the monthly exports (default: ~/Documents/pocketbook)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Print the spending report for a month.
    Report {
        /// Month name, e.g. march (reads hsbc_march.csv from the data directory)
        month: Option<String>,
        /// Read this CSV instead of the data directory file
        #[arg(long)]
        file: Option<String>,
        /// Show per-day spending
        #[arg(long)]
        daily: bool,
        /// List every parsed transaction
        #[arg(long)]
        transactions: bool,
        /// List the lines that could not be parsed
        #[arg(long = "show-skipped")]
        show_skipped: bool,
    },
    /// Export the month's summary sheet as CSV.
    Export {
        /// Month name, e.g. march
        month: Option<String>,
        #[arg(long)]
        file: Option<String>,
        /// Output path (default: <data_dir>/exports/<month>_summary.csv)
        #[arg(long)]
        output: Option<String>,
    },
    /// Write the month's sheet and SUMMARY line into the workbook.
    Sync {
        /// Month name, e.g. march
        month: Option<String>,
        #[arg(long)]
        file: Option<String>,
        /// Rewrite even if the source file has not changed
        #[arg(long)]
        force: bool,
    },
    /// Show the cross-month SUMMARY from the workbook.
    Summary {
        /// Show this month's stored sheet instead
        #[arg(long)]
        month: Option<String>,
    },
    /// Show the category keyword table and daily norms.
    Rules,
}
