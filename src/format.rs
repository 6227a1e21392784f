use once_cell::sync::Lazy;
use regex::{Captures, NoExpand, Regex};

use crate::geometry::{DEFAULT_PRECISION, round};

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{0(?::([A-Za-z])(\d*))?\}").unwrap());

const DEFAULT_DECIMALS: usize = 2;

/// Formats a plain number the way labels show it when no format is set:
/// at most six decimals, no trailing zeros, no negative zero.
pub fn format_number(value: f64) -> String {
    let value = round(value, DEFAULT_PRECISION);
    if value == 0.0 {
        return "0".to_string();
    }
    let text = format!("{value:.6}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    text.to_string()
}

/// Expands `{0}` style placeholders in `template` with `value`.
///
/// Supported specifiers are `N`/`n` (grouped digits), `F`/`f` (fixed) and
/// `P`/`p` (percent), each with an optional decimal count.
pub fn format_value(template: &str, value: f64) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures<'_>| {
            let decimals = caps
                .get(2)
                .and_then(|m| m.as_str().parse::<usize>().ok())
                .unwrap_or(DEFAULT_DECIMALS);
            match caps.get(1).map(|m| m.as_str().to_ascii_lowercase()) {
                Some(spec) if spec == "n" => grouped(value, decimals),
                Some(spec) if spec == "f" => fixed(value, decimals),
                Some(spec) if spec == "p" => format!("{}%", fixed(value * 100.0, decimals)),
                _ => format_number(value),
            }
        })
        .into_owned()
}

/// Expands placeholders with a text value; numeric specifiers are ignored.
pub fn format_text(template: &str, text: &str) -> String {
    PLACEHOLDER_RE
        .replace_all(template, NoExpand(text))
        .into_owned()
}

fn fixed(value: f64, decimals: usize) -> String {
    let text = format!("{value:.decimals$}");
    if text.starts_with('-') && text[1..].chars().all(|ch| ch == '0' || ch == '.') {
        return text[1..].to_string();
    }
    text
}

fn grouped(value: f64, decimals: usize) -> String {
    let text = fixed(value, decimals);
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (integer, fraction) = match digits.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (digits, None),
    };

    let mut out = String::with_capacity(text.len() + integer.len() / 3);
    out.push_str(sign);
    for (idx, ch) in integer.chars().enumerate() {
        if idx > 0 && (integer.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_numbers_drop_trailing_zeros() {
        assert_eq!(format_number(5.0), "5");
        assert_eq!(format_number(0.30000000000000004), "0.3");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(-12.5), "-12.5");
    }

    #[test]
    fn grouped_and_fixed_specifiers() {
        assert_eq!(format_value("{0:N1} GWh", 1234567.26), "1,234,567.3 GWh");
        assert_eq!(format_value("{0:n0}", -1000.0), "-1,000");
        assert_eq!(format_value("{0:F3}", 2.0), "2.000");
        assert_eq!(format_value("{0:N}", 999.0), "999.00");
    }

    #[test]
    fn percent_specifier_scales() {
        assert_eq!(format_value("{0:P0}", 0.25), "25%");
        assert_eq!(format_value("{0:p1}", 0.125), "12.5%");
    }

    #[test]
    fn unknown_specifier_falls_back_to_plain() {
        assert_eq!(format_value("{0:X4}", 7.5), "7.5");
        assert_eq!(format_value("Total: {0}", 7.0), "Total: 7");
        assert_eq!(format_value("no placeholder", 1.0), "no placeholder");
    }

    #[test]
    fn text_values_ignore_specifiers() {
        assert_eq!(format_text("[{0}]", "Q1"), "[Q1]");
        assert_eq!(format_text("{0:N2}!", "Q1"), "Q1!");
        assert_eq!(format_text("{0}", "$1"), "$1");
    }
}
