//! Display formatting for report figures.

use rust_decimal::{Decimal, RoundingStrategy};

/// Currency totals: whole shillings with thousands separators, e.g. `UGX 1,250,000`
pub fn format_ugx(amount: Decimal) -> String {
    let rounded = whole_shillings(amount);
    let digits = group_thousands(&rounded.abs().trunc().to_string());
    if rounded < Decimal::ZERO {
        format!("-UGX {digits}")
    } else {
        format!("UGX {digits}")
    }
}

/// Round half away from zero to whole shillings, e.g. `1234.5` to `1235`
pub fn whole_shillings(amount: Decimal) -> Decimal {
    amount
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}

/// Volumes: one decimal place, e.g. `12,500.0 L`
pub fn format_liters(liters: f64) -> String {
    format!("{} L", format_number(liters, 1))
}

/// Percentages: two decimal places, e.g. `-0.92%`
pub fn format_percent(pct: f64) -> String {
    format!("{}%", format_number(pct, 2))
}

/// Fixed precision with thousands separators; non-finite values print as zero
pub fn format_number(value: f64, decimals: usize) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut out = String::new();
    // -0.00 prints without a sign
    if value < 0.0 && formatted.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn ugx_has_no_decimals() {
        assert_eq!(format_ugx(dec!(0)), "UGX 0");
        assert_eq!(format_ugx(dec!(999)), "UGX 999");
        assert_eq!(format_ugx(dec!(1250000)), "UGX 1,250,000");
        assert_eq!(format_ugx(dec!(1234.5)), "UGX 1,235");
        assert_eq!(format_ugx(dec!(-45000.4)), "-UGX 45,000");
    }

    #[test]
    fn whole_shillings_round_half_away_from_zero() {
        assert_eq!(whole_shillings(dec!(1234.5)).to_string(), "1235");
        assert_eq!(whole_shillings(dec!(1234.9)).to_string(), "1235");
        assert_eq!(whole_shillings(dec!(1234.4)).to_string(), "1234");
        assert_eq!(whole_shillings(dec!(-2.5)).to_string(), "-3");
        assert_eq!(whole_shillings(dec!(-0.4)).to_string(), "0");
        assert_eq!(whole_shillings(dec!(300.00)).to_string(), "300");
    }

    #[test]
    fn liters_have_one_decimal() {
        assert_eq!(format_liters(0.0), "0.0 L");
        assert_eq!(format_liters(12500.04), "12,500.0 L");
        assert_eq!(format_liters(450.56), "450.6 L");
    }

    #[test]
    fn percent_has_two_decimals() {
        assert_eq!(format_percent(25.0), "25.00%");
        assert_eq!(format_percent(-0.923), "-0.92%");
        assert_eq!(format_percent(-0.001), "0.00%");
    }

    #[test]
    fn non_finite_prints_as_zero() {
        assert_eq!(format_percent(f64::NAN), "0.00%");
        assert_eq!(format_liters(f64::INFINITY), "0.0 L");
    }
}
