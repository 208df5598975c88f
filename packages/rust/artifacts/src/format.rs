//! Number formatting for report tables.

/// `$4.20B`, `$950.00M`, or `$12,345` below a million.
pub fn format_currency(value: u64) -> String {
    const BILLION: u64 = 1_000_000_000;
    const MILLION: u64 = 1_000_000;

    if value >= BILLION {
        format!("${:.2}B", value as f64 / BILLION as f64)
    } else if value >= MILLION {
        format!("${:.2}M", value as f64 / MILLION as f64)
    } else {
        format!("${}", format_thousands(value))
    }
}

/// A fraction as a percentage with one decimal: `0.082` → `8.2%`.
pub fn format_percentage(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_scales() {
        assert_eq!(format_currency(4_200_000_000), "$4.20B");
        assert_eq!(format_currency(25_000_000_000), "$25.00B");
        assert_eq!(format_currency(950_000_000), "$950.00M");
        assert_eq!(format_currency(1_000_000), "$1.00M");
        assert_eq!(format_currency(999_999), "$999,999");
        assert_eq!(format_currency(0), "$0");
    }

    #[test]
    fn percentage_one_decimal() {
        assert_eq!(format_percentage(0.082), "8.2%");
        assert_eq!(format_percentage(-0.035), "-3.5%");
        assert_eq!(format_percentage(1.0), "100.0%");
    }

    #[test]
    fn thousands_separators() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1_000), "1,000");
        assert_eq!(format_thousands(27_700), "27,700");
        assert_eq!(format_thousands(1_234_567), "1,234,567");
    }
}
