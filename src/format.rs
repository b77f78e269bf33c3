// Display formatting helpers shared by the chart legend, table headers,
// and table cells.

use serde_json::Value;

/// Turns a raw field name into a display label: underscores become spaces,
/// a space is inserted before each internal capital, and every word is
/// title-cased.
///
/// `avg_price` -> `Avg Price`, `pricePerSqft` -> `Price Per Sqft`.
pub fn display_label(key: &str) -> String {
    let mut spaced = String::with_capacity(key.len() + 4);
    for (i, ch) in key.chars().enumerate() {
        if ch == '_' {
            spaced.push(' ');
        } else {
            if ch.is_uppercase() && i > 0 {
                spaced.push(' ');
            }
            spaced.push(ch);
        }
    }

    spaced
        .split(' ')
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

/// Formats a float with thousands separators and at most three fraction
/// digits, trailing zeros dropped. Mirrors how the backend's numbers read
/// in a locale-aware UI: `1234567.8912` -> `1,234,567.891`.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rounded = (value * 1000.0).round() / 1000.0;
    let text = rounded.to_string();
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };
    let grouped = group_digits(int_part);
    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Formats an exact integer count with thousands separators.
pub fn format_count(value: u64) -> String {
    group_digits(&value.to_string())
}

/// Renders a JSON value for a table cell. Numbers get separators, strings
/// pass through verbatim, null renders empty.
pub fn format_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => format_json_number(n),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

fn format_json_number(n: &serde_json::Number) -> String {
    if let Some(u) = n.as_u64() {
        format_count(u)
    } else if let Some(i) = n.as_i64() {
        format!("-{}", format_count(i.unsigned_abs()))
    } else {
        format_number(n.as_f64().unwrap_or(0.0))
    }
}

fn group_digits(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    let offset = digits.len() % 3;
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && i % 3 == offset {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_label_replaces_underscores_and_title_cases() {
        assert_eq!(display_label("avg_price"), "Avg Price");
        assert_eq!(display_label("price"), "Price");
        assert_eq!(display_label("total_sales_2024"), "Total Sales 2024");
    }

    #[test]
    fn test_label_splits_camel_case() {
        assert_eq!(display_label("pricePerSqft"), "Price Per Sqft");
        assert_eq!(display_label("demandScore"), "Demand Score");
    }

    #[test]
    fn test_label_handles_leading_capital() {
        assert_eq!(display_label("Locality"), "Locality");
        assert_eq!(display_label("AvgPrice"), "Avg Price");
    }

    #[test]
    fn test_numbers_get_thousands_separators() {
        assert_eq!(format_number(1234567.0), "1,234,567");
        assert_eq!(format_number(1000.0), "1,000");
        assert_eq!(format_number(999.0), "999");
        assert_eq!(format_count(7_654_321), "7,654,321");
    }

    #[test]
    fn test_numbers_keep_at_most_three_fraction_digits() {
        assert_eq!(format_number(1234.5), "1,234.5");
        assert_eq!(format_number(0.12345), "0.123");
        assert_eq!(format_number(12.0), "12");
    }

    #[test]
    fn test_negative_numbers_keep_the_sign() {
        assert_eq!(format_number(-9876.543), "-9,876.543");
        assert_eq!(format_cell(&json!(-1200)), "-1,200");
    }

    #[test]
    fn test_cells_render_by_value_kind() {
        assert_eq!(format_cell(&json!("Wakad")), "Wakad");
        assert_eq!(format_cell(&json!(145000)), "145,000");
        assert_eq!(format_cell(&json!(null)), "");
        assert_eq!(format_cell(&json!(true)), "true");
    }
}
