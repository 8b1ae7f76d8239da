use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Label given to anything no rule claims.
pub const OTHER_CATEGORY: &str = "Other";

pub const DEFAULT_TABLE_VERSION: &str = "2025-05";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub name: String,
    pub keywords: Vec<String>,
    /// Income-side categories show up under "Income Categories" in the summary.
    #[serde(default)]
    pub income: bool,
}

impl CategoryRule {
    fn new(name: &str, income: bool, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            income,
        }
    }

    fn matches(&self, desc_lower: &str) -> bool {
        self.keywords.iter().any(|k| desc_lower.contains(k.as_str()))
    }
}

/// Ordered keyword rules. Declaration order is the tie-break: the first rule
/// with a matching keyword wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTable {
    pub version: String,
    pub rules: Vec<CategoryRule>,
}

// (name, income, keywords)
const DEFAULT_RULES: &[(&str, bool, &[&str])] = &[
    ("Salary", true, &["salary", "payroll", "wages"]),
    ("Bonus", true, &["bonus"]),
    ("Rent", false, &["rent", "landlord", "letting"]),
    (
        "Groceries",
        false,
        &["tesco", "sainsbury", "aldi", "lidl", "asda", "morrisons", "grocery", "supermarket"],
    ),
    (
        "Dining",
        false,
        &["restaurant", "cafe", "coffee", "pizza", "deliveroo", "uber eats", "just eat", "mcdonald"],
    ),
    (
        "Transport",
        false,
        &["taxi", "uber", "tfl", "train", "bus fare", "fuel", "petrol", "parking"],
    ),
    (
        "Utilities",
        false,
        &["electric", "water", "council tax", "broadband", "mobile", "energy"],
    ),
    (
        "Entertainment",
        false,
        &["netflix", "spotify", "cinema", "theatre", "steam", "disney"],
    ),
    ("Shopping", false, &["amazon", "ebay", "primark", "argos", "clothing"]),
    ("Health", false, &["pharmacy", "gym", "dentist", "doctor", "boots"]),
];

impl Default for CategoryTable {
    fn default() -> Self {
        Self {
            version: DEFAULT_TABLE_VERSION.to_string(),
            rules: DEFAULT_RULES
                .iter()
                .map(|(name, income, keywords)| CategoryRule::new(name, *income, keywords))
                .collect(),
        }
    }
}

impl CategoryTable {
    /// Load a table from JSON. Keywords are lower-cased so matching stays
    /// case-insensitive whatever the file says.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let table: Self = serde_json::from_str(&content)?;
        Ok(table.normalized())
    }

    fn normalized(mut self) -> Self {
        for rule in &mut self.rules {
            for keyword in &mut rule.keywords {
                *keyword = keyword.to_lowercase();
            }
            rule.keywords.retain(|k| !k.is_empty());
        }
        self
    }

    /// Expense labels in declared order, without the implicit "Other".
    pub fn expense_categories(&self) -> Vec<&str> {
        self.rules
            .iter()
            .filter(|r| !r.income && r.name != OTHER_CATEGORY)
            .map(|r| r.name.as_str())
            .collect()
    }
}

pub fn categorize<'a>(description: &str, table: &'a CategoryTable) -> &'a str {
    let desc_lower = description.to_lowercase();
    table
        .rules
        .iter()
        .find(|rule| rule.matches(&desc_lower))
        .map(|rule| rule.name.as_str())
        .unwrap_or(OTHER_CATEGORY)
}
