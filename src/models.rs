use chrono::NaiveDate;

/// Maximum description length shown in tables. Categorization always sees the
/// full text.
pub const DESCRIPTION_DISPLAY_LEN: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnKind {
    Income,
    Expense,
}

impl TxnKind {
    /// Derive the kind from the export's type-flag column. Only "Credit" marks income.
    pub fn from_flag(flag: &str) -> Self {
        if flag.trim().eq_ignore_ascii_case("credit") {
            Self::Income
        } else {
            Self::Expense
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub kind: TxnKind,
    pub category: String,
}

impl Transaction {
    pub fn is_income(&self) -> bool {
        self.kind == TxnKind::Income
    }

    pub fn short_description(&self) -> String {
        truncate_chars(&self.description, DESCRIPTION_DISPLAY_LEN)
    }
}

pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// Category -> amount, kept in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryTotals(Vec<(String, f64)>);

impl CategoryTotals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, category: &str, amount: f64) {
        match self.0.iter_mut().find(|(name, _)| name == category) {
            Some((_, total)) => *total += amount,
            None => self.0.push((category.to_string(), amount)),
        }
    }

    pub fn get(&self, category: &str) -> Option<f64> {
        self.0
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, total)| *total)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(name, total)| (name.as_str(), *total))
    }

    pub fn sum(&self) -> f64 {
        self.0.iter().map(|(_, total)| total).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Per-day expense buckets, each split by category. Income never lands here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyCategoryTotals {
    days: Vec<(NaiveDate, CategoryTotals)>,
}

impl DailyCategoryTotals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, date: NaiveDate, category: &str, amount: f64) {
        match self.days.iter_mut().find(|(d, _)| *d == date) {
            Some((_, totals)) => totals.add(category, amount),
            None => {
                let mut totals = CategoryTotals::new();
                totals.add(category, amount);
                self.days.push((date, totals));
            }
        }
    }

    pub fn get(&self, date: NaiveDate) -> Option<&CategoryTotals> {
        self.days.iter().find(|(d, _)| *d == date).map(|(_, t)| t)
    }

    pub fn days(&self) -> impl Iterator<Item = (NaiveDate, &CategoryTotals)> {
        self.days.iter().map(|(d, t)| (*d, t))
    }

    pub fn day_total(&self, date: NaiveDate) -> f64 {
        self.get(date).map(CategoryTotals::sum).unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    TooFewFields(usize),
    BadAmount(String),
    BadDate(String),
    Unreadable(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooFewFields(n) => write!(f, "expected at least 5 fields, found {n}"),
            Self::BadAmount(raw) => write!(f, "unparsable amount {raw:?}"),
            Self::BadDate(raw) => write!(f, "unparsable date {raw:?}"),
            Self::Unreadable(msg) => write!(f, "unreadable record: {msg}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedLine {
    pub line: u64,
    pub raw: String,
    pub reason: SkipReason,
}

/// Everything one pass of the parser produced, including what it refused.
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub transactions: Vec<Transaction>,
    pub daily: DailyCategoryTotals,
    pub skipped: Vec<SkippedLine>,
}
