use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::errors::{FinanceError, Result};

/// Number of fractional digits amounts are stored with.
pub const MINOR_UNITS: u32 = 2;

/// Locale-aware formatting preferences.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocaleConfig {
    pub language_tag: String,
    pub currency: String,
    pub decimal_separator: char,
    pub grouping_separator: char,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self::for_tag("pt-BR", "BRL")
    }
}

impl LocaleConfig {
    pub fn for_tag(language_tag: &str, currency: &str) -> Self {
        let (decimal_separator, grouping_separator) = match language_tag {
            "en-US" | "en-GB" => ('.', ','),
            _ => (',', '.'),
        };
        Self {
            language_tag: language_tag.to_string(),
            currency: currency.to_uppercase(),
            decimal_separator,
            grouping_separator,
        }
    }
}

/// Checks that an amount is positive and representable in minor units, and
/// returns it rescaled to exactly two fractional digits.
pub fn validate_amount(amount: Decimal) -> Result<Decimal> {
    if amount <= Decimal::ZERO {
        return Err(FinanceError::validation(format!(
            "amount must be greater than zero, got {amount}"
        )));
    }
    if amount.normalize().scale() > MINOR_UNITS {
        return Err(FinanceError::validation(format!(
            "amount {amount} has more than {MINOR_UNITS} decimal places"
        )));
    }
    let mut scaled = amount;
    scaled.rescale(MINOR_UNITS);
    Ok(scaled)
}

/// Interprets typed digits as cents: "12345" is 123.45. Non-digits are ignored,
/// an input without digits yields `None`.
pub fn parse_cents_input(input: &str) -> Option<Decimal> {
    let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let cents: i64 = digits.parse().ok()?;
    Some(Decimal::new(cents, MINOR_UNITS))
}

/// Parses a user-typed amount such as "150", "150.5" or "1.234,56".
pub fn parse_amount(input: &str, locale: &LocaleConfig) -> Result<Decimal> {
    let trimmed = input.trim();
    let normalized: String = if trimmed.contains(locale.decimal_separator) {
        trimmed
            .chars()
            .filter(|c| *c != locale.grouping_separator)
            .map(|c| if c == locale.decimal_separator { '.' } else { c })
            .collect()
    } else if is_grouped_integer(trimmed, locale.grouping_separator) {
        // "1.500" in pt-BR is fifteen hundred, not one and a half.
        trimmed
            .chars()
            .filter(|c| *c != locale.grouping_separator)
            .collect()
    } else {
        trimmed.to_string()
    };
    normalized
        .parse::<Decimal>()
        .map_err(|_| FinanceError::validation(format!("`{input}` is not a valid amount")))
}

/// True for digits split into a leading group of 1-3 and trailing groups of exactly 3.
fn is_grouped_integer(value: &str, separator: char) -> bool {
    let digits = value.strip_prefix('-').unwrap_or(value);
    let mut groups = digits.split(separator);
    let leading_ok = groups.next().is_some_and(|group| {
        (1..=3).contains(&group.len()) && group.chars().all(|c| c.is_ascii_digit())
    });
    let mut trailing = 0;
    let trailing_ok = groups.all(|group| {
        trailing += 1;
        group.len() == 3 && group.chars().all(|c| c.is_ascii_digit())
    });
    leading_ok && trailing_ok && trailing > 0
}

pub fn symbol_for(code: &str) -> String {
    match code {
        "BRL" => "R$".into(),
        "USD" => "$".into(),
        "EUR" => "€".into(),
        "GBP" => "£".into(),
        _ => code.into(),
    }
}

pub fn format_number(locale: &LocaleConfig, value: Decimal) -> String {
    let rounded = value
        .abs()
        .round_dp_with_strategy(MINOR_UNITS, RoundingStrategy::MidpointAwayFromZero);
    let body = format!("{:.*}", MINOR_UNITS as usize, rounded);
    let (int_part, frac_part) = body.split_once('.').unwrap_or((body.as_str(), ""));
    let mut out = group_digits(int_part, locale.grouping_separator);
    if !frac_part.is_empty() {
        out.push(locale.decimal_separator);
        out.push_str(frac_part);
    }
    out
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::new();
    for (count, ch) in digits.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, separator);
        }
        grouped.insert(0, ch);
    }
    grouped
}

/// Renders an amount as `R$ 1.234,56` (`R$ -1.234,56` for negatives).
pub fn format_currency(amount: Decimal, locale: &LocaleConfig) -> String {
    let body = format_number(locale, amount);
    let sign = if amount < Decimal::ZERO { "-" } else { "" };
    format!("{} {}{}", symbol_for(&locale.currency), sign, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn validate_amount_rescales_to_cents() {
        assert_eq!(validate_amount(dec!(150)).unwrap().to_string(), "150.00");
        assert_eq!(validate_amount(dec!(9.9)).unwrap().to_string(), "9.90");
        assert_eq!(validate_amount(dec!(1.500)).unwrap().to_string(), "1.50");
    }

    #[test]
    fn validate_amount_rejects_bad_values() {
        assert!(validate_amount(dec!(0)).is_err());
        assert!(validate_amount(dec!(-1)).is_err());
        assert!(validate_amount(dec!(0.001)).is_err());
    }

    #[test]
    fn cents_input_matches_entry_form() {
        assert_eq!(parse_cents_input("12345"), Some(dec!(123.45)));
        assert_eq!(parse_cents_input("R$ 1,50"), Some(dec!(1.50)));
        assert_eq!(parse_cents_input("abc"), None);
    }

    #[test]
    fn parse_amount_handles_locale_separators() {
        let br = LocaleConfig::default();
        assert_eq!(parse_amount("1.234,56", &br).unwrap(), dec!(1234.56));
        assert_eq!(parse_amount("150", &br).unwrap(), dec!(150));
        let us = LocaleConfig::for_tag("en-US", "USD");
        assert_eq!(parse_amount("1,234.56", &us).unwrap(), dec!(1234.56));
        assert!(parse_amount("ten", &us).is_err());
    }

    #[test]
    fn parse_amount_reads_thousands_without_decimals() {
        let br = LocaleConfig::default();
        assert_eq!(parse_amount("1.500", &br).unwrap(), dec!(1500));
        assert_eq!(parse_amount("12.345.678", &br).unwrap(), dec!(12345678));
        assert_eq!(parse_amount("1.234", &br).unwrap(), dec!(1234));
        assert_eq!(validate_amount(parse_amount("1.500", &br).unwrap()).unwrap().to_string(), "1500.00");
        let us = LocaleConfig::for_tag("en-US", "USD");
        assert_eq!(parse_amount("1,500", &us).unwrap(), dec!(1500));
        assert_eq!(parse_amount("1.5", &us).unwrap(), dec!(1.5));
    }

    #[test]
    fn formats_brazilian_currency() {
        let locale = LocaleConfig::default();
        assert_eq!(format_currency(dec!(1234.5), &locale), "R$ 1.234,50");
        assert_eq!(format_currency(dec!(-0.5), &locale), "R$ -0,50");
        assert_eq!(format_currency(dec!(1000000), &locale), "R$ 1.000.000,00");
    }
}
