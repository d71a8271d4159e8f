use std::iter::Sum;
use std::ops::{Add, AddAssign};

use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Amount of money held as an integer count of cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(pub i64);

impl Money {
    pub const SCALE: i64 = 100; // 2 decimal places
    pub const TARGET_DECIMALS: u32 = 2;

    pub fn zero() -> Self {
        Self(0)
    }

    pub fn from_minor(cents: i64) -> Self {
        Self(cents)
    }

    pub fn as_minor(&self) -> i64 {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, Self::TARGET_DECIMALS)
    }

    /// Lossy view used only when serializing to JSON numbers.
    pub fn to_f64(&self) -> f64 {
        self.0 as f64 / Self::SCALE as f64
    }

    pub fn from_scaled_i128(value: i128, scale: u32) -> Option<Self> {
        if scale == Self::TARGET_DECIMALS {
            return i64::try_from(value).ok().map(Self);
        }
        if scale < Self::TARGET_DECIMALS {
            let factor = 10i128.pow(Self::TARGET_DECIMALS - scale);
            let widened = value.checked_mul(factor)?;
            return i64::try_from(widened).ok().map(Self);
        }
        // scale > TARGET_DECIMALS: round half away from zero
        let factor = 10i128.checked_pow(scale - Self::TARGET_DECIMALS)?;
        let div = value / factor; // truncated toward zero
        let rem = value % factor;
        let mut adjusted = div;
        if rem.abs() * 2 >= factor {
            adjusted += if value.is_negative() { -1 } else { 1 };
        }
        i64::try_from(adjusted).ok().map(Self)
    }

    /// Parses a plain decimal string (`"10"`, `"10.5"`, `"-3.14159"`) into cents
    /// without going through binary floating point.
    pub fn from_decimal_str(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        let neg = s.starts_with('-');
        let body = s.strip_prefix('-').unwrap_or(s);
        let (int_part, frac_part) = match body.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (body, ""),
        };
        if int_part.is_empty() || !is_digits(int_part) || !is_digits(frac_part) {
            return None;
        }
        let int_val: i128 = int_part.parse().ok()?;
        let (raw, scale) = if frac_part.is_empty() {
            (int_val, 0)
        } else {
            let scale = u32::try_from(frac_part.len()).ok()?;
            let frac_val: i128 = frac_part.parse().ok()?;
            let shifted = int_val.checked_mul(10i128.checked_pow(scale)?)?;
            (shifted.checked_add(frac_val)?, scale)
        };
        let signed = if neg { -raw } else { raw };
        Money::from_scaled_i128(signed, scale)
    }

    /// Converts a float through its shortest round-trip decimal rendering,
    /// so `10.01` becomes exactly 1001 cents.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        Money::from_decimal_str(&format!("{}", value))
    }
}

fn is_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let minor = self.0;
        let abs = minor.unsigned_abs();
        let int_part = abs / Self::SCALE as u64;
        let frac_part = abs % Self::SCALE as u64;
        if minor < 0 {
            write!(f, "-{}.{:02}", int_part, frac_part)
        } else {
            write!(f, "{}.{:02}", int_part, frac_part)
        }
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.to_f64())
    }
}

struct MoneyVisitor;

impl<'de> Visitor<'de> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("a decimal amount as a number or string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        Money::from_scaled_i128(i128::from(v), 0)
            .ok_or_else(|| E::custom(format!("Amount out of range: {}", v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        Money::from_scaled_i128(i128::from(v), 0)
            .ok_or_else(|| E::custom(format!("Amount out of range: {}", v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        Money::from_f64(v).ok_or_else(|| E::custom(format!("Invalid Money value: {}", v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
        Money::from_decimal_str(v).ok_or_else(|| E::custom(format!("Invalid Money format: {}", v)))
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::Money;

    #[test]
    fn parses_plain_decimal_strings() {
        assert_eq!(Money::from_decimal_str("10"), Some(Money(1000)));
        assert_eq!(Money::from_decimal_str("10.5"), Some(Money(1050)));
        assert_eq!(Money::from_decimal_str("10.01"), Some(Money(1001)));
        assert_eq!(Money::from_decimal_str(" 0.07 "), Some(Money(7)));
        assert_eq!(Money::from_decimal_str("-2.30"), Some(Money(-230)));
        assert_eq!(Money::from_decimal_str("3."), Some(Money(300)));
    }

    #[test]
    fn rejects_malformed_strings() {
        for input in ["", "abc", ".5", "1.2.3", "1.-5", "+3", "1e3", "--1"] {
            assert_eq!(Money::from_decimal_str(input), None, "input {:?}", input);
        }
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(Money::from_decimal_str("10.005"), Some(Money(1001)));
        assert_eq!(Money::from_decimal_str("10.0049"), Some(Money(1000)));
        assert_eq!(Money::from_decimal_str("0.125"), Some(Money(13)));
        assert_eq!(Money::from_decimal_str("-0.125"), Some(Money(-13)));
        assert_eq!(Money::from_decimal_str("1.994"), Some(Money(199)));
    }

    #[test]
    fn float_input_goes_through_decimal_text() {
        assert_eq!(Money::from_f64(10.01), Some(Money(1001)));
        assert_eq!(Money::from_f64(150.5), Some(Money(15050)));
        assert_eq!(Money::from_f64(0.1 + 0.2), Some(Money(30)));
        assert_eq!(Money::from_f64(f64::NAN), None);
        assert_eq!(Money::from_f64(f64::INFINITY), None);
    }

    #[test]
    fn overflow_is_rejected() {
        assert_eq!(Money::from_decimal_str("999999999999999999999999"), None);
    }

    #[test]
    fn displays_two_decimals() {
        assert_eq!(Money(334).to_string(), "3.34");
        assert_eq!(Money(5).to_string(), "0.05");
        assert_eq!(Money(-1050).to_string(), "-10.50");
        assert_eq!(Money(500000).to_string(), "5000.00");
    }

    #[test]
    fn serde_accepts_numbers_and_strings() {
        let from_number: Money = serde_json::from_str("10.01").unwrap();
        let from_int: Money = serde_json::from_str("1000").unwrap();
        let from_string: Money = serde_json::from_str("\"3.34\"").unwrap();
        assert_eq!(from_number, Money(1001));
        assert_eq!(from_int, Money(100000));
        assert_eq!(from_string, Money(334));
        assert_eq!(serde_json::to_string(&Money(334)).unwrap(), "3.34");
    }
}
