use colored::Colorize;
use comfy_table::{Cell, Table};
use dialoguer::Input;

use crate::cli::{load_month, LoadedMonth};
use pocketbook::error::Result;
use pocketbook::fmt::{money, percent};
use pocketbook::recommend::{recommendations, savings_rate};
use pocketbook::reports::daily_breakdown;
use pocketbook::settings::{load_settings, Settings};

#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    pub daily: bool,
    pub transactions: bool,
    pub show_skipped: bool,
}

pub fn run(month: Option<String>, file: Option<String>, opts: ReportOptions) -> Result<()> {
    let settings = load_settings();
    if month.is_none() && file.is_none() {
        return interactive(&settings, opts);
    }
    let loaded = load_month(&settings, month.as_deref(), file.as_deref())?;
    println!("{}", format_report(&loaded, &settings, opts));
    Ok(())
}

/// Prompt for months until the user quits. Errors are reported and the prompt
/// comes back.
fn interactive(settings: &Settings, opts: ReportOptions) -> Result<()> {
    loop {
        let month: String = Input::new()
            .with_prompt("Enter the month (e.g. March, April, May; q to quit)")
            .allow_empty(true)
            .interact_text()?;
        let month = month.trim();
        if month.is_empty() || month.eq_ignore_ascii_case("q") {
            return Ok(());
        }
        match load_month(settings, Some(month), None) {
            Ok(loaded) => println!("{}", format_report(&loaded, settings, opts)),
            Err(e) => eprintln!("{}", format!("Error: {e}").red()),
        }
    }
}

// ---------------------------------------------------------------------------
// Pure formatting (loaded month -> String)
// ---------------------------------------------------------------------------

pub(crate) fn format_report(loaded: &LoadedMonth, settings: &Settings, opts: ReportOptions) -> String {
    let cur = settings.currency.as_str();
    let result = &loaded.result;
    let mut out = String::new();

    out.push_str(&format!(
        "{}\n{} transactions from {}",
        format!("Spending report: {}", result.period).bold(),
        result.transaction_count,
        loaded.source.display()
    ));
    if !loaded.outcome.skipped.is_empty() {
        out.push_str(&format!(
            " ({} lines skipped)",
            loaded.outcome.skipped.len()
        ));
    }
    out.push('\n');

    // Overview
    let mut overview = Table::new();
    overview.set_header(vec!["", "Amount"]);
    overview.add_row(vec![
        Cell::new("Total Income".green().bold()),
        Cell::new(money(result.total_income, cur)),
    ]);
    overview.add_row(vec![
        Cell::new("Total Expenses".red().bold()),
        Cell::new(money(result.total_expenses, cur)),
    ]);
    let savings = if result.savings >= 0.0 {
        money(result.savings, cur).green().to_string()
    } else {
        money(result.savings, cur).red().to_string()
    };
    overview.add_row(vec![Cell::new("Savings".bold()), Cell::new(savings)]);
    let rate = savings_rate(result)
        .map(|r| format!("{r:.1}%"))
        .unwrap_or_else(|| "n/a".to_string());
    overview.add_row(vec![Cell::new("Savings rate"), Cell::new(rate)]);
    out.push_str(&format!("\n{overview}\n"));

    // Expenses by category
    if !result.category_totals.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Category", "Amount", "%", "Per day", "Norm"]);
        for (category, total) in result.category_totals.iter() {
            let avg = result.daily_averages.get(category).unwrap_or(0.0);
            let norm = settings.norms.get(category);
            let avg_str = money(avg, cur);
            let avg_cell = match norm {
                Some(n) if avg > n * pocketbook::analysis::NORM_TOLERANCE => avg_str.red().to_string(),
                _ => avg_str,
            };
            let share = if result.total_expenses > 0.0 {
                total / result.total_expenses
            } else {
                0.0
            };
            table.add_row(vec![
                Cell::new(category),
                Cell::new(money(total, cur)),
                Cell::new(percent(share)),
                Cell::new(avg_cell),
                Cell::new(norm.map(|n| money(n, cur)).unwrap_or_default()),
            ]);
        }
        out.push_str(&format!(
            "\nExpenses by category (averaged over {} days)\n{table}\n",
            result.period_days
        ));
    }

    // Income by category
    if !result.income_category_totals.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Category", "Amount"]);
        for (category, total) in result.income_category_totals.iter() {
            table.add_row(vec![Cell::new(category), Cell::new(money(total, cur))]);
        }
        out.push_str(&format!("\nIncome by category\n{table}\n"));
    }

    if opts.daily {
        out.push_str(&format_daily(loaded, cur));
    }

    if opts.transactions {
        out.push_str(&format_transactions(loaded, cur));
    }

    if !result.norm_violations.is_empty() {
        out.push_str(&format!("\n{}\n", "Over daily norm".red().bold()));
        for violation in &result.norm_violations {
            out.push_str(&format!("  - {violation}\n"));
        }
    }

    out.push_str(&format!("\n{}\n", "Recommendations".bold()));
    for (i, rec) in recommendations(result).iter().enumerate() {
        out.push_str(&format!("  {}. {rec}\n", i + 1));
    }

    if opts.show_skipped && !loaded.outcome.skipped.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Line", "Reason", "Content"]);
        for skipped in &loaded.outcome.skipped {
            table.add_row(vec![
                Cell::new(skipped.line),
                Cell::new(skipped.reason.to_string()),
                Cell::new(pocketbook::models::truncate_chars(&skipped.raw, 40)),
            ]);
        }
        out.push_str(&format!("\nSkipped lines\n{table}\n"));
    }

    out
}

fn format_daily(loaded: &LoadedMonth, cur: &str) -> String {
    let rows = daily_breakdown(&loaded.outcome.daily);
    if rows.is_empty() {
        return "\nNo spending recorded.\n".to_string();
    }
    let mut table = Table::new();
    table.set_header(vec!["Date", "Spent", "Top category"]);
    for row in &rows {
        table.add_row(vec![
            Cell::new(row.date.to_string()),
            Cell::new(money(row.total, cur)),
            Cell::new(&row.top_category),
        ]);
    }
    format!("\nDaily spending ({} days)\n{table}\n", rows.len())
}

fn format_transactions(loaded: &LoadedMonth, cur: &str) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Date", "Description", "Amount", "Category"]);
    for txn in &loaded.outcome.transactions {
        let amount = if txn.is_income() {
            money(txn.amount, cur).green().to_string()
        } else {
            money(txn.amount, cur).red().to_string()
        };
        table.add_row(vec![
            Cell::new(txn.date.format("%d %b").to_string()),
            Cell::new(txn.short_description()),
            Cell::new(amount),
            Cell::new(&txn.category),
        ]);
    }
    format!("\nTransactions\n{table}\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(dir: &std::path::Path, content: &str) -> (LoadedMonth, Settings) {
        std::fs::write(dir.join("hsbc_march.csv"), content).unwrap();
        let settings = Settings {
            data_dir: dir.to_string_lossy().to_string(),
            ..Settings::default()
        };
        (load_month(&settings, Some("march"), None).unwrap(), settings)
    }

    #[test]
    fn test_format_report_sections() {
        let dir = tempfile::tempdir().unwrap();
        let (month, settings) = loaded(
            dir.path(),
            "01 Mar 2025,Monthly Rent,1200.00,GBP,Debit\n\
             02 Mar 2025,Salary Deposit,3000.00,GBP,Credit\n\
             03 Mar 2025,Pizza place,900.00,GBP,Debit\n\
             bad,line\n",
        );
        let text = format_report(&month, &settings, ReportOptions::default());
        assert!(text.contains("Spending report: march"));
        assert!(text.contains("(1 lines skipped)"));
        assert!(text.contains("Expenses by category (averaged over 30 days)"));
        assert!(text.contains("£1,200.00"));
        assert!(text.contains("Over daily norm"));
        assert!(text.contains("Dining: 30.00/day vs norm 10.00/day"));
        assert!(text.contains("Recommendations"));
        assert!(!text.contains("Daily spending"));
        assert!(!text.contains("Skipped lines"));
    }

    #[test]
    fn test_format_report_optional_sections() {
        let dir = tempfile::tempdir().unwrap();
        let (month, settings) = loaded(
            dir.path(),
            "01 Mar 2025,A very long description that goes on and on,12.00,GBP,Debit\n\
             Date,Description,Amount,Currency,Type\n",
        );
        let opts = ReportOptions {
            daily: true,
            transactions: true,
            show_skipped: true,
        };
        let text = format_report(&month, &settings, opts);
        assert!(text.contains("Daily spending (1 days)"));
        assert!(text.contains("2025-03-01"));
        assert!(text.contains("A very long description that g"));
        assert!(!text.contains("goes on and on"));
        assert!(text.contains("Skipped lines"));
        assert!(text.contains("unparsable amount"));
        assert!(text.contains("n/a"));
    }
}
