use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{CategoryTotals, DailyCategoryTotals, Transaction, TxnKind};

/// Averages are taken over a fixed-length period, not the days actually seen.
pub const DEFAULT_PERIOD_DAYS: u32 = 30;

/// A category is flagged once its daily average exceeds the norm by more than 10%.
pub const NORM_TOLERANCE: f64 = 1.1;

/// Per-day spending thresholds keyed by category label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DailyNorms(pub BTreeMap<String, f64>);

impl Default for DailyNorms {
    fn default() -> Self {
        let norms = [
            ("Rent", 50.0),
            ("Groceries", 15.0),
            ("Dining", 10.0),
            ("Transport", 8.0),
            ("Utilities", 6.0),
            ("Entertainment", 5.0),
            ("Shopping", 10.0),
            ("Health", 3.0),
        ];
        Self(norms.iter().map(|(k, v)| (k.to_string(), *v)).collect())
    }
}

impl DailyNorms {
    pub fn get(&self, category: &str) -> Option<f64> {
        self.0.get(category).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub period: String,
    pub total_income: f64,
    pub total_expenses: f64,
    pub savings: f64,
    pub category_totals: CategoryTotals,
    pub income_category_totals: CategoryTotals,
    pub daily_averages: CategoryTotals,
    pub norm_violations: Vec<String>,
    pub period_days: u32,
    /// Distinct days with at least one expense. Informational only.
    pub active_days: usize,
    pub transaction_count: usize,
}

pub fn analyze(
    transactions: &[Transaction],
    daily: &DailyCategoryTotals,
    period: &str,
    norms: &DailyNorms,
    period_days: u32,
) -> AnalysisResult {
    let period_days = period_days.max(1);

    let mut total_income = 0.0;
    let mut total_expenses = 0.0;
    let mut category_totals = CategoryTotals::new();
    let mut income_category_totals = CategoryTotals::new();

    for txn in transactions {
        match txn.kind {
            TxnKind::Income => {
                total_income += txn.amount;
                income_category_totals.add(&txn.category, txn.amount);
            }
            TxnKind::Expense => {
                total_expenses += txn.amount;
                category_totals.add(&txn.category, txn.amount);
            }
        }
    }

    let mut daily_averages = CategoryTotals::new();
    for (category, total) in category_totals.iter() {
        daily_averages.add(category, total / f64::from(period_days));
    }

    let mut norm_violations = Vec::new();
    for (category, avg) in daily_averages.iter() {
        let Some(norm) = norms.get(category) else {
            continue;
        };
        if avg > norm * NORM_TOLERANCE {
            let over = if norm > 0.0 { (avg / norm - 1.0) * 100.0 } else { 100.0 };
            norm_violations.push(format!(
                "{category}: {avg:.2}/day vs norm {norm:.2}/day ({over:.0}% over)"
            ));
        }
    }

    AnalysisResult {
        period: period.to_string(),
        total_income,
        total_expenses,
        savings: total_income - total_expenses,
        category_totals,
        income_category_totals,
        daily_averages,
        norm_violations,
        period_days,
        active_days: daily.len(),
        transaction_count: transactions.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categorizer::CategoryTable;
    use crate::importer::parse_lines;

    fn run(lines: &[&str], norms: &DailyNorms) -> AnalysisResult {
        let out = parse_lines(lines, &CategoryTable::default());
        analyze(&out.transactions, &out.daily, "march", norms, DEFAULT_PERIOD_DAYS)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_rent_and_salary_scenario() {
        let result = run(
            &[
                "01 Mar 2025,Monthly Rent,1200.00,EUR,Debit",
                "02 Mar 2025,Salary Deposit,3000.00,EUR,Credit",
            ],
            &DailyNorms::default(),
        );
        assert_eq!(result.transaction_count, 2);
        assert!(approx(result.total_income, 3000.0));
        assert!(approx(result.total_expenses, 1200.0));
        assert!(approx(result.savings, 1800.0));
        assert_eq!(result.category_totals.get("Rent"), Some(1200.0));
        assert!(approx(result.daily_averages.get("Rent").unwrap(), 40.0));
        assert!(result.norm_violations.is_empty());
        assert_eq!(result.active_days, 1);
        assert_eq!(result.period, "march");
    }

    #[test]
    fn test_empty_input() {
        let result = analyze(
            &[],
            &DailyCategoryTotals::new(),
            "april",
            &DailyNorms::default(),
            DEFAULT_PERIOD_DAYS,
        );
        assert_eq!(result.total_income, 0.0);
        assert_eq!(result.total_expenses, 0.0);
        assert_eq!(result.savings, 0.0);
        assert!(result.category_totals.is_empty());
        assert!(result.income_category_totals.is_empty());
        assert!(result.daily_averages.is_empty());
        assert!(result.norm_violations.is_empty());
    }

    #[test]
    fn test_additivity_and_negative_savings() {
        let result = run(
            &[
                "01 Mar 2025,Monthly Rent,1500.00,GBP,Debit",
                "02 Mar 2025,Salary,1000.00,GBP,Credit",
                "03 Mar 2025,Tesco,80.25,GBP,Debit",
                "04 Mar 2025,Mystery shop,19.75,GBP,Debit",
                "05 Mar 2025,Annual bonus,250.00,GBP,Credit",
                "06 Mar 2025,Gift from gran,40.00,GBP,Credit",
            ],
            &DailyNorms::default(),
        );
        assert!(approx(result.total_expenses, result.category_totals.sum()));
        assert!(approx(result.total_income, result.income_category_totals.sum()));
        assert!(approx(result.total_income, 1290.0));
        assert!(approx(result.savings, 1290.0 - 1600.0));
        assert!(result.savings < 0.0);
    }

    #[test]
    fn test_violation_above_tolerance() {
        // 330 / 30 = 11.0/day, norm 10 -> exactly at 10% tolerance, not flagged
        let at_edge = run(&["01 Mar 2025,Pizza place,330.00,GBP,Debit"], &DailyNorms::default());
        assert!(at_edge.norm_violations.is_empty());

        // 360 / 30 = 12.0/day, 20% over
        let over = run(&["01 Mar 2025,Pizza place,360.00,GBP,Debit"], &DailyNorms::default());
        assert_eq!(
            over.norm_violations,
            vec!["Dining: 12.00/day vs norm 10.00/day (20% over)".to_string()]
        );
    }

    #[test]
    fn test_violations_follow_first_appearance_order() {
        let result = run(
            &[
                "01 Mar 2025,Taxi,600.00,GBP,Debit",
                "02 Mar 2025,Amazon,900.00,GBP,Debit",
                "03 Mar 2025,Coffee,600.00,GBP,Debit",
            ],
            &DailyNorms::default(),
        );
        let cats: Vec<&str> = result
            .norm_violations
            .iter()
            .map(|v| v.split(':').next().unwrap())
            .collect();
        assert_eq!(cats, vec!["Transport", "Shopping", "Dining"]);
    }

    #[test]
    fn test_categories_without_norm_are_never_flagged() {
        let result = run(&["01 Mar 2025,Mystery,99999.00,GBP,Debit"], &DailyNorms::default());
        assert!(result.norm_violations.is_empty());
        assert_eq!(result.category_totals.get("Other"), Some(99999.0));
    }

    #[test]
    fn test_period_days_is_configurable() {
        let out = parse_lines(
            ["01 Mar 2025,Monthly Rent,1240.00,GBP,Debit"],
            &CategoryTable::default(),
        );
        let thirty = analyze(&out.transactions, &out.daily, "march", &DailyNorms::default(), 30);
        let thirty_one = analyze(&out.transactions, &out.daily, "march", &DailyNorms::default(), 31);
        assert!(approx(thirty_one.daily_averages.get("Rent").unwrap(), 40.0));
        assert!(thirty.daily_averages.get("Rent").unwrap() > 41.0);

        let zero = analyze(&out.transactions, &out.daily, "march", &DailyNorms::default(), 0);
        assert_eq!(zero.period_days, 1);
    }

    #[test]
    fn test_norms_deserialize_from_map() {
        let norms: DailyNorms = serde_json::from_str(r#"{"Rent": 45.5, "Dining": 7}"#).unwrap();
        assert_eq!(norms.get("Rent"), Some(45.5));
        assert_eq!(norms.get("Dining"), Some(7.0));
        assert_eq!(norms.get("Groceries"), None);
    }
}
