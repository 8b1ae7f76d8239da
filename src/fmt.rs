/// Format an amount with thousands separators: £1,234.56
pub fn money(val: f64, symbol: &str) -> String {
    let negative = val < 0.0 && format!("{:.2}", val.abs()) != "0.00";
    let abs = val.abs();
    let cents = format!("{:.2}", abs);
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if negative {
        format!("-{symbol}{with_commas}.{dec_part}")
    } else {
        format!("{symbol}{with_commas}.{dec_part}")
    }
}

/// Format a 0..1 fraction as a percentage: 0.256 -> 25.6%
pub fn percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(1234.56, "£"), "£1,234.56");
        assert_eq!(money(-500.00, "£"), "-£500.00");
        assert_eq!(money(0.0, "$"), "$0.00");
        assert_eq!(money(1000000.99, "€"), "€1,000,000.99");
        assert_eq!(money(42.10, ""), "42.10");
        assert_eq!(money(-0.001, "£"), "£0.00");
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(1.0), "100.0%");
        assert_eq!(percent(0.256), "25.6%");
        assert_eq!(percent(0.0), "0.0%");
    }
}
