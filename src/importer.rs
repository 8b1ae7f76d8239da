use std::io::BufRead;
use std::path::Path;

use chrono::NaiveDate;
use log::{debug, info, warn};

use crate::categorizer::{categorize, CategoryTable};
use crate::error::{PocketbookError, Result};
use crate::models::{ParseOutcome, SkipReason, SkippedLine, Transaction, TxnKind};

/// date, description, amount, currency, type flag
pub const MIN_FIELDS: usize = 5;

pub const DATE_FORMAT: &str = "%d %b %Y";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse an amount field into its magnitude. The sign lives in the type flag,
/// so `-25.00`, `(25.00)` and `25.00` all read as 25.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let s = raw.replace(',', "").replace('"', "");
    let s = s.trim();
    let s = s
        .strip_prefix('(')
        .and_then(|v| v.strip_suffix(')'))
        .unwrap_or(s)
        .trim();
    let s = s.strip_prefix('-').unwrap_or(s);
    let s = s.trim_start_matches(|c: char| matches!(c, '£' | '$' | '€')).trim();
    let value: f64 = s.parse().ok()?;
    value.is_finite().then_some(value.abs())
}

pub fn parse_date_dmy(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

fn record_to_transaction(
    record: &csv::StringRecord,
    table: &CategoryTable,
) -> std::result::Result<Transaction, SkipReason> {
    if record.len() < MIN_FIELDS {
        return Err(SkipReason::TooFewFields(record.len()));
    }
    let amount =
        parse_amount(&record[2]).ok_or_else(|| SkipReason::BadAmount(record[2].to_string()))?;
    let date = parse_date_dmy(&record[0]).ok_or_else(|| SkipReason::BadDate(record[0].to_string()))?;
    let description = record[1].trim().to_string();
    let category = categorize(&description, table).to_string();
    Ok(Transaction {
        date,
        description,
        amount,
        kind: TxnKind::from_flag(&record[4]),
        category,
    })
}

/// Read one physical line as a CSV record. `None` for a blank line.
fn read_record(bytes: &[u8]) -> std::result::Result<Option<csv::StringRecord>, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);
    let mut record = csv::StringRecord::new();
    Ok(rdr.read_record(&mut record)?.then_some(record))
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a comma-delimited export. Each physical line is read on its own, so a
/// stray quote spoils that line only. Bad lines never abort the run; they are
/// returned in `skipped` with the reason.
pub fn parse_reader<R: BufRead>(reader: R, table: &CategoryTable) -> ParseOutcome {
    let mut outcome = ParseOutcome::default();

    for (idx, chunk) in reader.split(b'\n').enumerate() {
        let line = idx as u64 + 1;
        let bytes = match chunk {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("stopped reading at line {line}: {e}");
                outcome.skipped.push(SkippedLine {
                    line,
                    raw: String::new(),
                    reason: SkipReason::Unreadable(e.to_string()),
                });
                break;
            }
        };
        let raw = String::from_utf8_lossy(&bytes).trim_end().to_string();

        let parsed = match read_record(&bytes) {
            Ok(None) => continue,
            Ok(Some(record)) if record.iter().all(|f| f.trim().is_empty()) => continue,
            Ok(Some(record)) => record_to_transaction(&record, table),
            Err(e) => Err(SkipReason::Unreadable(e.to_string())),
        };
        match parsed {
            Ok(txn) => {
                if txn.kind == TxnKind::Expense {
                    outcome.daily.add(txn.date, &txn.category, txn.amount);
                }
                outcome.transactions.push(txn);
            }
            Err(reason) => {
                debug!("skipping line {line}: {reason}");
                outcome.skipped.push(SkippedLine { line, raw, reason });
            }
        }
    }

    info!(
        "parsed {} transactions, skipped {} lines",
        outcome.transactions.len(),
        outcome.skipped.len()
    );
    outcome
}

pub fn parse_lines<I, S>(lines: I, table: &CategoryTable) -> ParseOutcome
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut buf = String::new();
    for line in lines {
        buf.push_str(line.as_ref());
        buf.push('\n');
    }
    parse_reader(buf.as_bytes(), table)
}

pub fn parse_file(file_path: &Path, table: &CategoryTable) -> Result<ParseOutcome> {
    if !file_path.is_file() {
        return Err(PocketbookError::SourceNotFound(file_path.to_path_buf()));
    }
    let file = std::fs::File::open(file_path)?;
    Ok(parse_reader(std::io::BufReader::new(file), table))
}
