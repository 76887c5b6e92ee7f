//! Parsing and formatting of amounts held as integer cents.

/// Largest price accepted for an item, ten billion in whole units. Keeps
/// household totals far away from `i64` limits.
pub const MAX_PRICE_CENTS: i64 = 1_000_000_000_000;

/// Parses free-form money input ("$1,234.50", "99,90 €", "12") into cents.
/// Returns `None` when no digits survive cleaning.
pub fn parse_amount_cents(input: &str) -> Option<i64> {
    let cleaned = clean_amount(input);
    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    let value: f64 = cleaned.parse().ok()?;
    Some((value * 100.0).round() as i64)
}

fn clean_amount(amount: &str) -> String {
    // The last '.' or ',' is the decimal separator; the other one groups thousands.
    let last_dot = amount.rfind('.');
    let last_comma = amount.rfind(',');

    let decimal_char = match (last_dot, last_comma) {
        (Some(d), Some(c)) => {
            if d > c {
                Some('.')
            } else {
                Some(',')
            }
        }
        (Some(_), None) => Some('.'),
        (None, Some(c)) => {
            // "1,234" groups thousands, "12,5" is a decimal comma.
            let decimals = amount[c + 1..].chars().filter(|ch| ch.is_ascii_digit()).count();
            let has_integer_part = amount[..c].chars().any(|ch| ch.is_ascii_digit());
            if decimals == 3 && has_integer_part {
                None
            } else {
                Some(',')
            }
        }
        (None, None) => None,
    };

    let mut result = String::new();
    let mut has_decimal = false;

    for c in amount.chars() {
        if c.is_ascii_digit() {
            result.push(c);
        } else if Some(c) == decimal_char && !has_decimal {
            result.push('.');
            has_decimal = true;
        } else if c == '-' && result.is_empty() {
            result.push(c);
        }
    }

    result
}

pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.abs();
    format!("{}{}.{:02}", sign, abs_cents / 100, abs_cents % 100)
}
