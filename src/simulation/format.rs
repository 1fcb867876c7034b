//! Compact number formatting for log lines.

const ABBREVIATIONS: [(f64, &str); 6] = [
    (1e18, "E"),
    (1e15, "P"),
    (1e12, "T"),
    (1e9, "B"),
    (1e6, "M"),
    (1e3, "K"),
];

/// `1234.5` -> `"1.23K"`, infinity -> `"MAX"`. Trailing zeros after abbreviation are trimmed.
pub fn format_number(value: f64, decimals: usize) -> String {
    if value.is_infinite() {
        return "MAX".to_string();
    }
    if value.is_nan() {
        return "NaN".to_string();
    }
    let magnitude = value.abs();
    if magnitude < 1e-9 {
        return format!("{:.*}", decimals, 0.0);
    }
    match ABBREVIATIONS.iter().find(|(threshold, _)| magnitude >= *threshold) {
        Some((threshold, symbol)) => {
            let scaled = format!("{:.*}", decimals, value / threshold);
            let trimmed = if scaled.contains('.') {
                scaled.trim_end_matches('0').trim_end_matches('.')
            } else {
                scaled.as_str()
            };
            format!("{trimmed}{symbol}")
        }
        None => format!("{:.*}", decimals, value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn small_values_keep_decimals() {
        assert_eq!(format_number(12.5, 2), "12.50");
        assert_eq!(format_number(0.0, 2), "0.00");
        assert_eq!(format_number(-3.25, 2), "-3.25");
    }

    #[test]
    fn large_values_are_abbreviated() {
        assert_eq!(format_number(1_234.0, 2), "1.23K");
        assert_eq!(format_number(2_000_000.0, 2), "2M");
        assert_eq!(format_number(1.5e9, 2), "1.5B");
        assert_eq!(format_number(-4_500.0, 2), "-4.5K");
    }

    #[test]
    fn infinity_is_max() {
        assert_eq!(format_number(f64::INFINITY, 2), "MAX");
    }

    proptest! {
        #[test]
        fn prop_format_number_no_panic(n in -1e20f64..1e20) {
            let _ = format_number(n, 2);
        }

        #[test]
        fn prop_nonnegative_has_no_minus(n in 0.0f64..1e20) {
            let s = format_number(n, 2);
            prop_assert!(!s.starts_with('-'), "got: {}", s);
        }
    }
}
