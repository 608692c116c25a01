use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Largest accepted price in cents (five digits, two after the point).
const MAX_CENTS: i64 = 99_999;

/// A non-negative monetary amount with two fraction digits, stored in cents.
///
/// Serializes as a string (`"2.10"`). Deserializes from a string or a JSON
/// number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Price(i64);

impl Price {
    pub fn from_cents(cents: i64) -> Result<Self, String> {
        if !(0..=MAX_CENTS).contains(&cents) {
            return Err(format!(
                "Price must be between 0.00 and {}.{:02}",
                MAX_CENTS / 100,
                MAX_CENTS % 100
            ));
        }
        Ok(Price(cents))
    }

    pub fn cents(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl FromStr for Price {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("Invalid price '{}'", s);
        let s = s.trim();

        let (whole, frac) = match s.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (s, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }
        if frac.len() > 2 {
            return Err(format!(
                "Invalid price '{}': at most 2 decimal places allowed",
                s
            ));
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let frac: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => frac.parse().map_err(|_| invalid())?,
        };

        let cents = whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac))
            .ok_or_else(invalid)?;
        Price::from_cents(cents)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Integer(i64),
            Float(f64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
            Raw::Integer(n) => n
                .checked_mul(100)
                .ok_or_else(|| format!("Invalid price '{}'", n))
                .and_then(Price::from_cents)
                .map_err(serde::de::Error::custom),
            Raw::Float(f) => {
                let scaled = f * 100.0;
                let cents = scaled.round();
                if !f.is_finite() || (scaled - cents).abs() > 1e-6 {
                    return Err(serde::de::Error::custom(format!(
                        "Invalid price '{}': at most 2 decimal places allowed",
                        f
                    )));
                }
                Price::from_cents(cents as i64).map_err(serde::de::Error::custom)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_prices() {
        assert_eq!(Price::from_str("2.10").unwrap().cents(), 210);
        assert_eq!(Price::from_str("5").unwrap().cents(), 500);
        assert_eq!(Price::from_str("5.5").unwrap().cents(), 550);
        assert_eq!(Price::from_str(".99").unwrap().cents(), 99);
        assert_eq!(Price::from_str("999.99").unwrap().cents(), 99_999);
    }

    #[test]
    fn test_parse_invalid_prices() {
        assert!(Price::from_str("1.234").is_err());
        assert!(Price::from_str("-1").is_err());
        assert!(Price::from_str("1000").is_err());
        assert!(Price::from_str("abc").is_err());
        assert!(Price::from_str(".").is_err());
        assert!(Price::from_str("").is_err());
    }

    #[test]
    fn test_display_has_two_fraction_digits() {
        assert_eq!(Price::from_cents(210).unwrap().to_string(), "2.10");
        assert_eq!(Price::from_cents(5).unwrap().to_string(), "0.05");
        assert_eq!(Price::from_cents(500).unwrap().to_string(), "5.00");
    }

    #[test]
    fn test_deserialize_string_and_number() {
        let p: Price = serde_json::from_str("\"1.20\"").unwrap();
        assert_eq!(p.cents(), 120);

        let p: Price = serde_json::from_str("5").unwrap();
        assert_eq!(p.cents(), 500);

        let p: Price = serde_json::from_str("5.25").unwrap();
        assert_eq!(p.cents(), 525);

        assert!(serde_json::from_str::<Price>("5.255").is_err());
        assert!(serde_json::from_str::<Price>("-2").is_err());
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&Price::from_cents(210).unwrap()).unwrap();
        assert_eq!(json, "\"2.10\"");
    }
}
