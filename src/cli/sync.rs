use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::load_month;
use pocketbook::error::Result;
use pocketbook::error::PocketbookError;
use pocketbook::fmt::{money, percent};
use pocketbook::reports::{build_summary_rows, SummaryRow};
use pocketbook::settings::load_settings;
use pocketbook::workbook::{
    compute_checksum, get_month_rows, get_summary, open_workbook, sync_checksum, sync_month,
    MonthSummary,
};

pub fn run(month: Option<String>, file: Option<String>, force: bool) -> Result<()> {
    let settings = load_settings();
    let loaded = load_month(&settings, month.as_deref(), file.as_deref())?;
    let rows = build_summary_rows(&loaded.result, &loaded.outcome.transactions, &loaded.table);
    let checksum = sync_checksum(
        &compute_checksum(&loaded.source)?,
        &loaded.table,
        &settings.norms,
        loaded.result.period_days,
    )?;

    let mut conn = open_workbook(&settings.workbook_path())?;
    let result = sync_month(
        &mut conn,
        &loaded.result,
        &rows,
        loaded.period_start().as_deref(),
        Some(&checksum),
        force,
    )?;

    if result.already_synced {
        println!(
            "{} is already in the workbook (unchanged source and settings). Use --force to rewrite.",
            loaded.result.period
        );
        return Ok(());
    }
    println!(
        "{} {} rows written for {}",
        "Synced:".green(),
        result.rows_written,
        loaded.result.period
    );
    Ok(())
}

pub fn summary(month: Option<String>) -> Result<()> {
    let settings = load_settings();
    let conn = open_workbook(&settings.workbook_path())?;
    match month {
        Some(m) => {
            let rows = get_month_rows(&conn, &m)?;
            if rows.is_empty() {
                return Err(PocketbookError::Other(format!(
                    "{} has not been synced",
                    m.trim().to_lowercase()
                )));
            }
            println!("{}", format_month_tab(&m, &rows, &settings.currency));
        }
        None => {
            let months = get_summary(&conn)?;
            println!("{}", format_summary(&months, &settings.currency));
        }
    }
    Ok(())
}

/// One month's stored sheet, as it was written by the last sync.
pub(crate) fn format_month_tab(month: &str, rows: &[SummaryRow], cur: &str) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Category", "Amount", "%"]);
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.label),
            Cell::new(row.amount.map(|a| money(a, cur)).unwrap_or_default()),
            Cell::new(row.fraction.map(percent).unwrap_or_default()),
        ]);
    }
    format!("{}\n{table}", month.trim().to_lowercase())
}

pub(crate) fn format_summary(months: &[MonthSummary], cur: &str) -> String {
    if months.is_empty() {
        return "No months synced yet. Run `pocketbook sync <month>` first.".to_string();
    }

    let mut table = Table::new();
    table.set_header(vec!["Month", "From", "Income", "Expenses", "Savings", "Rate", "Synced"]);
    let (mut income, mut expenses, mut savings) = (0.0, 0.0, 0.0);
    for m in months {
        let savings_str = if m.savings >= 0.0 {
            money(m.savings, cur).green().to_string()
        } else {
            money(m.savings, cur).red().to_string()
        };
        table.add_row(vec![
            Cell::new(&m.month),
            Cell::new(m.period_start.as_deref().unwrap_or("")),
            Cell::new(money(m.total_income, cur)),
            Cell::new(money(m.total_expenses, cur)),
            Cell::new(savings_str),
            Cell::new(
                m.savings_rate
                    .map(|r| format!("{r:.1}%"))
                    .unwrap_or_else(|| "n/a".to_string()),
            ),
            Cell::new(&m.synced_at),
        ]);
        income += m.total_income;
        expenses += m.total_expenses;
        savings += m.savings;
    }
    table.add_row(vec![
        Cell::new("Total".bold()),
        Cell::new(""),
        Cell::new(money(income, cur)),
        Cell::new(money(expenses, cur)),
        Cell::new(money(savings, cur)),
        Cell::new(""),
        Cell::new(""),
    ]);
    format!("SUMMARY\n{table}")
}
