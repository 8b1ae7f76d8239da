use crate::analysis::AnalysisResult;

pub const MAX_RECOMMENDATIONS: usize = 3;

pub const TARGET_SAVINGS_RATE: f64 = 20.0;

pub const NO_INCOME_MESSAGE: &str =
    "No income data for this period, so a savings rate cannot be calculated.";

const FILLER_ADVICE: &[&str] = &[
    "Review recurring subscriptions and cancel the ones you no longer use.",
    "Set up an automatic transfer to savings on payday.",
    "Plan meals for the week to cut down on takeaways and impulse buys.",
];

/// Savings as a percentage of income, or `None` when there is no income.
pub fn savings_rate(result: &AnalysisResult) -> Option<f64> {
    (result.total_income > 0.0).then(|| result.savings / result.total_income * 100.0)
}

pub fn recommendations(result: &AnalysisResult) -> Vec<String> {
    let Some(rate) = savings_rate(result) else {
        return vec![NO_INCOME_MESSAGE.to_string()];
    };

    let mut recs = Vec::new();
    if rate < TARGET_SAVINGS_RATE {
        recs.push(format!(
            "Your savings rate is {rate:.1}%. Aim to save at least {TARGET_SAVINGS_RATE:.0}% of your income."
        ));
        for violation in result.norm_violations.iter().take(MAX_RECOMMENDATIONS) {
            recs.push(format!("Cut back on {violation}"));
        }
    }

    for advice in FILLER_ADVICE {
        if recs.len() >= MAX_RECOMMENDATIONS {
            break;
        }
        if !recs.iter().any(|r| r == advice) {
            recs.push(advice.to_string());
        }
    }

    recs.truncate(MAX_RECOMMENDATIONS);
    recs
}
