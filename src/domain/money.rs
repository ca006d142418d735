use thiserror::Error;

/// Amounts are integer cents, so 500.00 is stored as 50000.
pub type Cents = i64;

/// Format cents as a two-decimal string.
/// Example: 50000 -> "500.00", -1 -> "-0.01"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseAmountError {
    #[error("amount is empty")]
    Empty,

    #[error("invalid amount '{0}'")]
    InvalidFormat(String),

    #[error("amount '{0}' has more than two decimal places")]
    TooPrecise(String),

    #[error("amount '{0}' is too large")]
    Overflow(String),
}

/// Parse a decimal string into cents.
///
/// Accepts a comma as decimal separator ("12,50"). Fractions of a cent are
/// rejected instead of truncated, so a user never moves less than they typed.
pub fn parse_cents(input: &str) -> Result<Cents, ParseAmountError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ParseAmountError::Empty);
    }

    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let normalized = digits.replace(',', ".");
    let invalid = || ParseAmountError::InvalidFormat(trimmed.to_string());

    let (units, fraction) = match normalized.split_once('.') {
        Some((units, fraction)) => (units, fraction),
        None => (normalized.as_str(), ""),
    };
    if units.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if !units.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return Err(invalid());
    }
    if fraction.len() > 2 {
        return Err(ParseAmountError::TooPrecise(trimmed.to_string()));
    }

    let overflow = || ParseAmountError::Overflow(trimmed.to_string());
    let units: Cents = if units.is_empty() {
        0
    } else {
        units.parse().map_err(|_| overflow())?
    };
    let fraction: Cents = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<Cents>().map_err(|_| invalid())? * 10,
        _ => fraction.parse().map_err(|_| invalid())?,
    };

    let cents = units
        .checked_mul(100)
        .and_then(|c| c.checked_add(fraction))
        .ok_or_else(overflow)?;
    Ok(if negative { -cents } else { cents })
}
