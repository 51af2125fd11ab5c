use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// Signed money amount represented as integer **minor units**.
///
/// Use this type for **all** monetary values in the engine (balances,
/// rewards, transfer amounts) to avoid floating-point drift. The scale of a
/// value (how many decimal digits one unit is split into) is *not* carried
/// here; it is owned by the [`Currency`](crate::Currency) the value is
/// denominated in (`fraction_digits`).
///
/// Scale adjustment happens in exactly one place, [`Money::from_decimal_str`],
/// and always truncates toward zero. Once a value is in minor units, every
/// arithmetic op is exact integer arithmetic.
///
/// # Examples
///
/// ```rust
/// use engine::Money;
///
/// let amount = Money::from_decimal_str("12.34", 2).unwrap();
/// assert_eq!(amount.minor(), 1234);
/// assert_eq!(amount.format(2), "12.34");
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Creates a new amount from integer minor units.
    #[must_use]
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Returns the raw value in minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the amount is positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }

    /// Parses a decimal string into minor units at the given scale.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading
    /// `+`/`-`. Fractional digits beyond `fraction_digits` are truncated
    /// toward zero; missing digits are padded with zeros.
    ///
    /// ```rust
    /// use engine::Money;
    ///
    /// assert_eq!(Money::from_decimal_str("10", 2).unwrap().minor(), 1000);
    /// assert_eq!(Money::from_decimal_str("10,5", 2).unwrap().minor(), 1050);
    /// assert_eq!(Money::from_decimal_str("12.345", 2).unwrap().minor(), 1234);
    /// assert_eq!(Money::from_decimal_str("7.99", 0).unwrap().minor(), 7);
    /// ```
    pub fn from_decimal_str(s: &str, fraction_digits: u32) -> ResultEngine<Self> {
        let empty = || EngineError::InvalidAmount("empty amount".to_string());
        let invalid = || EngineError::InvalidAmount("invalid amount".to_string());
        let overflow = || EngineError::InvalidAmount("amount too large".to_string());

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(empty());
        }

        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(stripped) => (true, stripped),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        if rest.is_empty() {
            return Err(empty());
        }

        let rest = rest.replace(',', ".");
        let mut parts = rest.split('.');
        let whole_str = parts.next().ok_or_else(invalid)?;
        let frac_str = parts.next().unwrap_or("");
        if parts.next().is_some() {
            return Err(invalid());
        }

        if whole_str.is_empty() || !whole_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        if !frac_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        // Truncate (round-down) beyond the currency scale, pad below it.
        let digits = fraction_digits as usize;
        let mut frac: String = frac_str.chars().take(digits).collect();
        while frac.len() < digits {
            frac.push('0');
        }

        let whole: i64 = whole_str.parse().map_err(|_| overflow())?;
        let frac_value: i64 = if frac.is_empty() {
            0
        } else {
            frac.parse().map_err(|_| overflow())?
        };

        let scale = 10_i64.checked_pow(fraction_digits).ok_or_else(overflow)?;
        let minor = whole
            .checked_mul(scale)
            .and_then(|v| v.checked_add(frac_value))
            .ok_or_else(overflow)?;

        Ok(Money(if negative { -minor } else { minor }))
    }

    /// Formats the amount as a plain decimal string at the given scale.
    #[must_use]
    pub fn format(self, fraction_digits: u32) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        if fraction_digits == 0 {
            return format!("{sign}{abs}");
        }
        let scale = 10_u64.pow(fraction_digits);
        let whole = abs / scale;
        let frac = abs % scale;
        format!("{sign}{whole}.{frac:0width$}", width = fraction_digits as usize)
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Money> for i64 {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        Money(-self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_at_scale() {
        assert_eq!(Money::from_minor(0).format(2), "0.00");
        assert_eq!(Money::from_minor(1).format(2), "0.01");
        assert_eq!(Money::from_minor(25).format(2), "0.25");
        assert_eq!(Money::from_minor(1050).format(2), "10.50");
        assert_eq!(Money::from_minor(-1050).format(2), "-10.50");
        assert_eq!(Money::from_minor(7).format(0), "7");
    }

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!(Money::from_decimal_str("10", 2).unwrap().minor(), 1000);
        assert_eq!(Money::from_decimal_str("10.5", 2).unwrap().minor(), 1050);
        assert_eq!(Money::from_decimal_str("10,50", 2).unwrap().minor(), 1050);
        assert_eq!(Money::from_decimal_str("-0.01", 2).unwrap().minor(), -1);
        assert_eq!(Money::from_decimal_str("+1.00", 2).unwrap().minor(), 100);
        assert_eq!(Money::from_decimal_str("  2.30 ", 2).unwrap().minor(), 230);
    }

    #[test]
    fn parse_truncates_excess_decimals() {
        assert_eq!(Money::from_decimal_str("12.345", 2).unwrap().minor(), 1234);
        assert_eq!(Money::from_decimal_str("0.009", 2).unwrap().minor(), 0);
        assert_eq!(Money::from_decimal_str("3.99", 0).unwrap().minor(), 3);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(Money::from_decimal_str("", 2).is_err());
        assert!(Money::from_decimal_str("abc", 2).is_err());
        assert!(Money::from_decimal_str("1.2.3", 2).is_err());
        assert!(Money::from_decimal_str(".5", 2).is_err());
        assert!(Money::from_decimal_str("99999999999999999999", 2).is_err());
    }

    #[test]
    fn checked_arithmetic_guards_overflow() {
        let max = Money::from_minor(i64::MAX);
        assert!(max.checked_add(Money::from_minor(1)).is_none());
        assert_eq!(
            Money::from_minor(60).checked_sub(Money::from_minor(40)),
            Some(Money::from_minor(20))
        );
    }
}
