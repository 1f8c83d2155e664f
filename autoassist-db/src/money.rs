// Currency amounts are kept in cents everywhere below the API surface. Clients send and receive plain
// decimal numbers (or numeric strings, which older admin forms still produce).

use rust_decimal::{prelude::*, Decimal};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    pub fn as_decimal(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    pub fn from_decimal(d: Decimal) -> Result<Self, String> {
        if d.is_sign_negative() && !d.is_zero() {
            return Err(format!("amount {} must not be negative", d));
        }
        if d.round_dp(2) != d {
            return Err(format!("amount {} has more than two decimal places", d));
        }
        d.checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.to_i64())
            .map(Self)
            .ok_or_else(|| format!("amount {} is out of range", d))
    }

    pub fn checked_mul(&self, quantity: i32) -> Option<Self> {
        self.0.checked_mul(quantity as i64).map(Self)
    }

    pub fn checked_add(&self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.as_decimal())
    }
}

impl FromStr for Money {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let d = Decimal::from_str(s.trim()).map_err(|e| format!("invalid amount {:?}: {}", s, e))?;
        Self::from_decimal(d)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_cents(&self.0, serializer)
    }
}

struct MoneyVisitor;

impl<'de> de::Visitor<'de> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a non-negative amount with at most two decimal places")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        Money::from_decimal(Decimal::from(v)).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        Money::from_decimal(Decimal::from(v)).map_err(E::custom)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        // The shortest round-trip representation is what the client typed
        v.to_string().parse().map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
        v.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

/// Serialize a cents column as a decimal JSON number.
pub fn serialize_cents<S: Serializer>(cents: &i64, serializer: S) -> Result<S::Ok, S::Error> {
    let value = Decimal::new(*cents, 2)
        .to_f64()
        .ok_or_else(|| serde::ser::Error::custom("amount cannot be represented"))?;
    serializer.serialize_f64(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_client_amounts() {
        assert_eq!(serde_json::from_str::<Money>("370").unwrap().cents(), 37000);
        assert_eq!(serde_json::from_str::<Money>("370.00").unwrap().cents(), 37000);
        assert_eq!(serde_json::from_str::<Money>("185.5").unwrap().cents(), 18550);
        assert_eq!(serde_json::from_str::<Money>(r#""220.00""#).unwrap().cents(), 22000);
        assert_eq!(serde_json::from_str::<Money>("0.1").unwrap().cents(), 10);
    }

    #[test]
    fn reject_bad_amounts() {
        assert!(serde_json::from_str::<Money>("-1").is_err());
        assert!(serde_json::from_str::<Money>("1.005").is_err());
        assert!(serde_json::from_str::<Money>(r#""abc""#).is_err());
        assert!(serde_json::from_str::<Money>("true").is_err());
    }

    #[test]
    fn reject_huge_amounts() {
        assert!(serde_json::from_str::<Money>(r#""1000000000000000000000000000""#).is_err());
        assert!(serde_json::from_str::<Money>("1e27").is_err());
        assert!("92233720368547758.08".parse::<Money>().is_err());
    }

    #[test]
    fn serialize_as_number() {
        assert_eq!(serde_json::to_string(&Money::from_cents(37000)).unwrap(), "370.0");
        assert_eq!(serde_json::to_string(&Money::from_cents(1550)).unwrap(), "15.5");
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
    }
}
