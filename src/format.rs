const SI_PREFIXES: [&str; 17] = [
    "y", "z", "a", "f", "p", "n", "µ", "m", "", "k", "M", "G", "T", "P", "E", "Z", "Y",
];

/// Format with an SI prefix and `precision` significant digits, trailing
/// zeros trimmed and the integer part grouped by thousands.
///
/// `format_si(1050.0, 4)` is `"1.05k"`.
pub fn format_si(value: f64, precision: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let precision = precision.max(1);
    let sign = if value < 0.0 { "-" } else { "" };
    let abs = value.abs();

    // Exponent after rounding to the requested significant digits
    let sci = format!("{:.*e}", precision - 1, abs);
    let exponent: i32 = sci
        .split_once('e')
        .and_then(|(_, e)| e.parse().ok())
        .unwrap_or(0);
    let prefix_exponent = exponent.div_euclid(3).clamp(-8, 8) * 3;
    let decimals = (precision as i32 - 1 - (exponent - prefix_exponent)).max(0) as usize;

    let scaled = format!("{:.*}", decimals, abs / 10f64.powi(prefix_exponent));
    let trimmed = if scaled.contains('.') {
        scaled.trim_end_matches('0').trim_end_matches('.')
    } else {
        scaled.as_str()
    };

    let prefix = SI_PREFIXES[(prefix_exponent / 3 + 8) as usize];
    format!("{sign}{}{prefix}", group_thousands(trimmed))
}

fn group_thousands(number: &str) -> String {
    let (int, frac) = match number.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (number, None),
    };
    let mut grouped = String::with_capacity(int.len() + int.len() / 3);
    for (i, ch) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}

/// Share of a total as a percentage with one decimal
pub fn format_share(share: f64) -> String {
    if share < 0.001 {
        "<0.1%".to_string()
    } else {
        format!("{:.1}%", share * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_si() {
        assert_eq!(format_si(1050.0, 4), "1.05k");
        assert_eq!(format_si(800.0, 4), "800");
        assert_eq!(format_si(1_234_567.0, 4), "1.235M");
        assert_eq!(format_si(0.5, 4), "500m");
        assert_eq!(format_si(0.0, 4), "0");
        assert_eq!(format_si(5e6, 6), "5M");
        assert_eq!(format_si(2.5e9, 4), "2.5G");
        assert_eq!(format_si(999.95, 4), "1k");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("1234567.5"), "1,234,567.5");
        assert_eq!(group_thousands("123"), "123");
    }

    #[test]
    fn test_format_share() {
        assert_eq!(format_share(0.0005), "<0.1%");
        assert_eq!(format_share(0.7619), "76.2%");
        assert_eq!(format_share(1.0), "100.0%");
    }
}
