use comfy_table::{Cell, Table};

use pocketbook::analysis::DailyNorms;
use pocketbook::categorizer::{CategoryTable, OTHER_CATEGORY};
use pocketbook::error::Result;
use pocketbook::fmt::money;
use pocketbook::settings::load_settings;

pub fn list() -> Result<()> {
    let settings = load_settings();
    let table = settings.category_table()?;
    println!("{}", format_rules(&table, &settings.norms, &settings.currency));
    Ok(())
}

pub(crate) fn format_rules(table: &CategoryTable, norms: &DailyNorms, cur: &str) -> String {
    let mut rules = Table::new();
    rules.set_header(vec!["#", "Category", "Side", "Keywords", "Daily norm"]);
    for (i, rule) in table.rules.iter().enumerate() {
        rules.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&rule.name),
            Cell::new(if rule.income { "income" } else { "expense" }),
            Cell::new(rule.keywords.join(", ")),
            Cell::new(norms.get(&rule.name).map(|n| money(n, cur)).unwrap_or_default()),
        ]);
    }
    rules.add_row(vec![
        Cell::new(""),
        Cell::new(OTHER_CATEGORY),
        Cell::new("either"),
        Cell::new("(no match)"),
        Cell::new(""),
    ]);

    let orphaned: Vec<&str> = norms
        .iter()
        .map(|(name, _)| name)
        .filter(|name| !table.rules.iter().any(|r| r.name == *name))
        .collect();

    let mut out = format!("Category rules (version {}, first match wins)\n{rules}", table.version);
    if !orphaned.is_empty() {
        out.push_str(&format!(
            "\nNorms with no matching category: {}",
            orphaned.join(", ")
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_rules_lists_table_in_order() {
        let text = format_rules(&CategoryTable::default(), &DailyNorms::default(), "£");
        assert!(text.starts_with("Category rules (version 2025-05"));
        let salary = text.find("Salary").unwrap();
        let health = text.find("Health").unwrap();
        assert!(salary < health);
        assert!(text.contains("£50.00"));
        assert!(!text.contains("Norms with no matching category"));
    }

    #[test]
    fn test_format_rules_flags_orphaned_norms() {
        let mut norms = DailyNorms::default();
        norms.0.insert("Pets".to_string(), 2.0);
        let text = format_rules(&CategoryTable::default(), &norms, "£");
        assert!(text.contains("Norms with no matching category: Pets"));
    }
}
