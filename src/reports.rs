use chrono::NaiveDate;

use crate::analysis::AnalysisResult;
use crate::categorizer::{CategoryTable, OTHER_CATEGORY};
use crate::models::{DailyCategoryTotals, Transaction};

const SALARY_MARKERS: &[&str] = &["salary", "income", "wages"];
const BONUS_MARKERS: &[&str] = &["bonus"];

// ---------------------------------------------------------------------------
// Summary sheet
// ---------------------------------------------------------------------------

/// One row of the summary sheet. Header and spacer rows have neither amount nor
/// fraction, which is different from a zero row.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub label: String,
    pub amount: Option<f64>,
    pub fraction: Option<f64>,
}

impl SummaryRow {
    fn value(label: &str, amount: f64, fraction: f64) -> Self {
        Self {
            label: label.to_string(),
            amount: Some(amount),
            fraction: Some(fraction),
        }
    }

    fn header(label: &str) -> Self {
        Self {
            label: label.to_string(),
            amount: None,
            fraction: None,
        }
    }

    fn blank() -> Self {
        Self::header("")
    }
}

fn share(amount: f64, total: f64) -> f64 {
    if total > 0.0 {
        amount / total
    } else {
        0.0
    }
}

fn mentions(txn: &Transaction, markers: &[&str]) -> bool {
    let category = txn.category.to_lowercase();
    let description = txn.description.to_lowercase();
    markers
        .iter()
        .any(|m| category.contains(m) || description.contains(m))
}

/// Split income into (salary, bonus, other). Salary is any income whose
/// category or description mentions salary/income/wages; bonus is checked on
/// what is left.
fn income_split(transactions: &[Transaction]) -> (f64, f64, f64) {
    let mut salary = 0.0;
    let mut bonus = 0.0;
    let mut other = 0.0;
    for txn in transactions.iter().filter(|t| t.is_income()) {
        if mentions(txn, SALARY_MARKERS) {
            salary += txn.amount;
        } else if mentions(txn, BONUS_MARKERS) {
            bonus += txn.amount;
        } else {
            other += txn.amount;
        }
    }
    (salary, bonus, other)
}

/// Build the fixed-shape summary sheet. The row count depends only on the
/// category table, never on the data.
pub fn build_summary_rows(
    result: &AnalysisResult,
    transactions: &[Transaction],
    table: &CategoryTable,
) -> Vec<SummaryRow> {
    let income = result.total_income;
    let expenses = result.total_expenses;
    let (salary, bonus, other_income) = income_split(transactions);

    let mut rows = Vec::with_capacity(summary_row_count(table));
    rows.extend([
        SummaryRow::value("Total Income", income, 1.0),
        SummaryRow::value("Total Expenses", expenses, share(expenses, income)),
        SummaryRow::value("Savings", result.savings, share(result.savings, income)),
        SummaryRow::blank(),
        SummaryRow::header("Income Categories"),
        SummaryRow::value("Salary", salary, share(salary, income)),
        SummaryRow::value("Bonus", bonus, share(bonus, income)),
        SummaryRow::value("Other Income", other_income, share(other_income, income)),
        SummaryRow::blank(),
        SummaryRow::header("Expense Categories"),
    ]);

    let listed = table.expense_categories();
    for category in &listed {
        let amount = result.category_totals.get(category).unwrap_or(0.0);
        rows.push(SummaryRow::value(category, amount, share(amount, expenses)));
    }
    // Everything the listed rows do not cover, including "Other" itself
    let other = result
        .category_totals
        .iter()
        .filter(|(name, _)| !listed.contains(name))
        .fold(0.0, |acc, (_, amount)| acc + amount);
    rows.push(SummaryRow::value(OTHER_CATEGORY, other, share(other, expenses)));
    rows
}

pub fn summary_row_count(table: &CategoryTable) -> usize {
    11 + table.expense_categories().len()
}

// ---------------------------------------------------------------------------
// Daily breakdown
// ---------------------------------------------------------------------------

pub struct DailyRow {
    pub date: NaiveDate,
    pub total: f64,
    /// Category with the largest spend that day.
    pub top_category: String,
}

pub fn daily_breakdown(daily: &DailyCategoryTotals) -> Vec<DailyRow> {
    daily
        .days()
        .map(|(date, totals)| {
            let top_category = totals
                .iter()
                .fold(None::<(&str, f64)>, |best, (name, amount)| match best {
                    Some((_, top)) if top >= amount => best,
                    _ => Some((name, amount)),
                })
                .map(|(name, _)| name.to_string())
                .unwrap_or_default();
            DailyRow {
                date,
                total: totals.sum(),
                top_category,
            }
        })
        .collect()
}
