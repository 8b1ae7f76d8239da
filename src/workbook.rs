use std::path::Path;

use log::info;
use rusqlite::{Connection, OptionalExtension};
use sha2::{Digest, Sha256};

use crate::analysis::{AnalysisResult, DailyNorms};
use crate::categorizer::CategoryTable;
use crate::error::Result;
use crate::recommend::savings_rate;
use crate::reports::SummaryRow;

/// A month "tab" is its rows in `month_rows`; the SUMMARY tab is `months`.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS months (
    month TEXT PRIMARY KEY,
    period_start TEXT,
    sync_checksum TEXT,
    total_income REAL NOT NULL,
    total_expenses REAL NOT NULL,
    savings REAL NOT NULL,
    savings_rate REAL,
    synced_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS month_rows (
    month TEXT NOT NULL,
    position INTEGER NOT NULL,
    label TEXT NOT NULL,
    amount REAL,
    fraction REAL,
    PRIMARY KEY (month, position),
    FOREIGN KEY (month) REFERENCES months(month) ON DELETE CASCADE
);
";

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    conn.busy_timeout(std::time::Duration::from_secs(5))?;
    Ok(conn)
}

pub fn init_workbook(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

pub fn open_workbook(db_path: &Path) -> Result<Connection> {
    if let Some(dir) = db_path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let conn = get_connection(db_path)?;
    init_workbook(&conn)?;
    Ok(conn)
}

pub fn compute_checksum(file_path: &Path) -> Result<String> {
    let data = std::fs::read(file_path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

/// Fingerprint of everything a month tab is derived from: the source bytes
/// (as their checksum), the category table, the norms and the divisor.
pub fn sync_checksum(
    source_checksum: &str,
    table: &CategoryTable,
    norms: &DailyNorms,
    period_days: u32,
) -> Result<String> {
    let mut hasher = Sha256::new();
    hasher.update(source_checksum.as_bytes());
    hasher.update(serde_json::to_vec(table)?);
    hasher.update(serde_json::to_vec(norms)?);
    hasher.update(period_days.to_le_bytes());
    Ok(hex::encode(hasher.finalize()))
}

fn month_key(period: &str) -> String {
    period.trim().to_lowercase()
}

pub fn stored_checksum(conn: &Connection, month: &str) -> Result<Option<String>> {
    let checksum = conn
        .query_row(
            "SELECT sync_checksum FROM months WHERE month = ?1",
            [month_key(month)],
            |r| r.get::<_, Option<String>>(0),
        )
        .optional()?;
    Ok(checksum.flatten())
}

pub struct SyncResult {
    pub rows_written: usize,
    pub already_synced: bool,
}

/// Replace the month's tab and its SUMMARY line in one transaction. A source
/// whose `sync_checksum` is unchanged is left alone unless `force` is set.
pub fn sync_month(
    conn: &mut Connection,
    result: &AnalysisResult,
    rows: &[SummaryRow],
    period_start: Option<&str>,
    checksum: Option<&str>,
    force: bool,
) -> Result<SyncResult> {
    let month = month_key(&result.period);

    if !force {
        if let (Some(new), Some(old)) = (checksum, stored_checksum(conn, &month)?) {
            if new == old {
                return Ok(SyncResult {
                    rows_written: 0,
                    already_synced: true,
                });
            }
        }
    }

    let tx = conn.transaction()?;
    tx.execute("DELETE FROM month_rows WHERE month = ?1", [&month])?;
    tx.execute(
        "INSERT INTO months (month, period_start, sync_checksum, total_income, total_expenses, savings, savings_rate, synced_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, datetime('now')) \
         ON CONFLICT(month) DO UPDATE SET period_start = excluded.period_start, \
         sync_checksum = excluded.sync_checksum, total_income = excluded.total_income, \
         total_expenses = excluded.total_expenses, savings = excluded.savings, \
         savings_rate = excluded.savings_rate, synced_at = excluded.synced_at",
        rusqlite::params![
            month,
            period_start,
            checksum,
            result.total_income,
            result.total_expenses,
            result.savings,
            savings_rate(result),
        ],
    )?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO month_rows (month, position, label, amount, fraction) VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for (position, row) in rows.iter().enumerate() {
            stmt.execute(rusqlite::params![
                month,
                position as i64,
                row.label,
                row.amount,
                row.fraction
            ])?;
        }
    }
    tx.commit()?;

    info!("synced {} rows for {month}", rows.len());
    Ok(SyncResult {
        rows_written: rows.len(),
        already_synced: false,
    })
}

pub fn get_month_rows(conn: &Connection, month: &str) -> Result<Vec<SummaryRow>> {
    let mut stmt = conn.prepare(
        "SELECT label, amount, fraction FROM month_rows WHERE month = ?1 ORDER BY position",
    )?;
    let rows = stmt
        .query_map([month_key(month)], |row| {
            Ok(SummaryRow {
                label: row.get(0)?,
                amount: row.get(1)?,
                fraction: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub struct MonthSummary {
    pub month: String,
    pub period_start: Option<String>,
    pub total_income: f64,
    pub total_expenses: f64,
    pub savings: f64,
    pub savings_rate: Option<f64>,
    pub synced_at: String,
}

pub fn get_summary(conn: &Connection) -> Result<Vec<MonthSummary>> {
    let mut stmt = conn.prepare(
        "SELECT month, period_start, total_income, total_expenses, savings, savings_rate, synced_at \
         FROM months ORDER BY period_start IS NULL, period_start, month",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(MonthSummary {
                month: row.get(0)?,
                period_start: row.get(1)?,
                total_income: row.get(2)?,
                total_expenses: row.get(3)?,
                savings: row.get(4)?,
                savings_rate: row.get(5)?,
                synced_at: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{analyze, DailyNorms, DEFAULT_PERIOD_DAYS};
    use crate::categorizer::CategoryTable;
    use crate::importer::parse_lines;
    use crate::reports::build_summary_rows;

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = open_workbook(&dir.path().join("workbook.db")).unwrap();
        (dir, conn)
    }

    fn analysed(period: &str, lines: &[&str]) -> (AnalysisResult, Vec<SummaryRow>) {
        let table = CategoryTable::default();
        let out = parse_lines(lines, &table);
        let result = analyze(
            &out.transactions,
            &out.daily,
            period,
            &DailyNorms::default(),
            DEFAULT_PERIOD_DAYS,
        );
        let rows = build_summary_rows(&result, &out.transactions, &table);
        (result, rows)
    }

    #[test]
    fn test_init_creates_tables() {
        let (_dir, conn) = test_db();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        for expected in &["months", "month_rows"] {
            assert!(tables.contains(&expected.to_string()), "missing table: {expected}");
        }
        init_workbook(&conn).unwrap();
    }

    #[test]
    fn test_sync_writes_month_tab() {
        let (_dir, mut conn) = test_db();
        let (result, rows) = analysed(
            "March",
            &[
                "01 Mar 2025,Monthly Rent,1200.00,GBP,Debit",
                "02 Mar 2025,Salary Deposit,3000.00,GBP,Credit",
            ],
        );
        let sync = sync_month(&mut conn, &result, &rows, Some("2025-03-01"), Some("abc"), false)
            .unwrap();
        assert_eq!(sync.rows_written, rows.len());
        assert!(!sync.already_synced);

        let stored = get_month_rows(&conn, "march").unwrap();
        assert_eq!(stored, rows);
        assert_eq!(stored[3].amount, None);
    }

    #[test]
    fn test_unchanged_source_is_skipped() {
        let (_dir, mut conn) = test_db();
        let (result, rows) = analysed("april", &["01 Apr 2025,Taxi,10.00,GBP,Debit"]);
        sync_month(&mut conn, &result, &rows, None, Some("same"), false).unwrap();
        let again = sync_month(&mut conn, &result, &rows, None, Some("same"), false).unwrap();
        assert!(again.already_synced);
        let forced = sync_month(&mut conn, &result, &rows, None, Some("same"), true).unwrap();
        assert!(!forced.already_synced);
        assert_eq!(get_month_rows(&conn, "april").unwrap().len(), rows.len());
    }

    #[test]
    fn test_resync_replaces_rows_and_summary() {
        let (_dir, mut conn) = test_db();
        let (first, rows) = analysed("may", &["01 May 2025,Salary,1000.00,GBP,Credit"]);
        sync_month(&mut conn, &first, &rows, Some("2025-05-01"), Some("one"), false).unwrap();
        let (second, rows) = analysed("may", &["01 May 2025,Salary,2000.00,GBP,Credit"]);
        sync_month(&mut conn, &second, &rows, Some("2025-05-01"), Some("two"), false).unwrap();

        let summary = get_summary(&conn).unwrap();
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].total_income, 2000.0);
        assert_eq!(summary[0].savings_rate, Some(100.0));
        assert_eq!(get_month_rows(&conn, "may").unwrap()[0].amount, Some(2000.0));
    }

    #[test]
    fn test_summary_is_ordered_by_period_start() {
        let (_dir, mut conn) = test_db();
        let (may, rows) = analysed("may", &["01 May 2025,Taxi,10.00,GBP,Debit"]);
        sync_month(&mut conn, &may, &rows, Some("2025-05-01"), None, false).unwrap();
        let (march, rows) = analysed("march", &["01 Mar 2025,Taxi,10.00,GBP,Debit"]);
        sync_month(&mut conn, &march, &rows, Some("2025-03-01"), None, false).unwrap();
        let (empty, rows) = analysed("june", &[]);
        sync_month(&mut conn, &empty, &rows, None, None, false).unwrap();

        let months: Vec<String> = get_summary(&conn).unwrap().into_iter().map(|m| m.month).collect();
        assert_eq!(months, vec!["march", "may", "june"]);
    }

    #[test]
    fn test_sync_checksum_tracks_analysis_inputs() {
        let table = CategoryTable::default();
        let norms = DailyNorms::default();
        let base = sync_checksum("abc", &table, &norms, 30).unwrap();
        assert_eq!(base, sync_checksum("abc", &table, &norms, 30).unwrap());

        assert_ne!(base, sync_checksum("abd", &table, &norms, 30).unwrap());
        assert_ne!(base, sync_checksum("abc", &table, &norms, 31).unwrap());

        let mut tighter = norms.clone();
        tighter.0.insert("Dining".to_string(), 5.0);
        assert_ne!(base, sync_checksum("abc", &table, &tighter, 30).unwrap());

        let mut widened = table.clone();
        widened.rules[5].keywords.push("cab".to_string());
        assert_ne!(base, sync_checksum("abc", &widened, &norms, 30).unwrap());
    }

    #[test]
    fn test_changed_rules_force_a_rewrite() {
        let (_dir, mut conn) = test_db();
        let (result, rows) = analysed("march", &["01 Mar 2025,Taxi,10.00,GBP,Debit"]);
        let table = CategoryTable::default();
        let norms = DailyNorms::default();
        let first = sync_checksum("same-file", &table, &norms, 30).unwrap();
        sync_month(&mut conn, &result, &rows, None, Some(&first), false).unwrap();

        let mut edited = table.clone();
        edited.version = "local".to_string();
        let second = sync_checksum("same-file", &edited, &norms, 30).unwrap();
        let again = sync_month(&mut conn, &result, &rows, None, Some(&second), false).unwrap();
        assert!(!again.already_synced);
        assert_eq!(stored_checksum(&conn, "march").unwrap(), Some(second));
    }

    #[test]
    fn test_compute_checksum() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.csv");
        std::fs::write(&path, "abc").unwrap();
        assert_eq!(
            compute_checksum(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
