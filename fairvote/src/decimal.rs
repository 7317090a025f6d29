//! Serde adapters writing big integers as decimal strings.
//!
//! Use with `#[serde(with = "decimal")]`. The values exceed every native integer width, so the
//! wire format is always text.

use crate::Error;
use num_bigint::BigUint;
use serde::de::{self, Deserializer};
use serde::Serializer;

pub fn serialize<S>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_str_radix(10))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<BigUint, D::Error>
where
    D: Deserializer<'de>,
{
    let s: String = serde::Deserialize::deserialize(deserializer)?;
    parse(&s).map_err(de::Error::custom)
}

/// Parse a decimal string. Signs, whitespace and empty strings are rejected.
pub fn parse(s: &str) -> Result<BigUint, Error> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::MalformedNumber(s.to_owned()));
    }
    BigUint::parse_bytes(s.as_bytes(), 10).ok_or_else(|| Error::MalformedNumber(s.to_owned()))
}

/// Vote counts, written as decimal strings like the group elements they sit next to
pub mod count {
    use serde::de::{self, Deserializer};
    use serde::Serializer;

    pub fn serialize<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = serde::Deserialize::deserialize(deserializer)?;
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(de::Error::custom(crate::Error::MalformedNumber(s)));
        }
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Wrapped {
        #[serde(with = "crate::decimal")]
        n: BigUint,
    }

    #[test]
    fn decimal_strings_on_the_wire() {
        let n = BigUint::parse_bytes(b"61329566248342901292543872769978950870633559608669337131139375508370458778917", 10).unwrap();
        let json = serde_json::to_string(&Wrapped { n: n.clone() }).unwrap();
        assert_eq!(
            json,
            r#"{"n":"61329566248342901292543872769978950870633559608669337131139375508370458778917"}"#
        );

        let back: Wrapped = serde_json::from_str(&json).unwrap();
        assert_eq!(back.n, n);
    }

    #[test]
    fn malformed_numbers() {
        assert!(parse("").is_err());
        assert!(parse("-1").is_err());
        assert!(parse("12a").is_err());
        assert!(parse(" 12").is_err());
        assert!(parse("0x10").is_err());
        assert_eq!(parse("0042").unwrap(), BigUint::from(42u32));

        // Native JSON numbers are not accepted either
        assert!(serde_json::from_str::<Wrapped>(r#"{"n":12}"#).is_err());
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Counted {
        #[serde(with = "crate::decimal::count")]
        votes: u64,
    }

    #[test]
    fn counts() {
        let json = serde_json::to_string(&Counted { votes: 4_999_999 }).unwrap();
        assert_eq!(json, r#"{"votes":"4999999"}"#);
        assert_eq!(
            serde_json::from_str::<Counted>(&json).unwrap(),
            Counted { votes: 4_999_999 }
        );

        assert!(serde_json::from_str::<Counted>(r#"{"votes":"+3"}"#).is_err());
        assert!(serde_json::from_str::<Counted>(r#"{"votes":"99999999999999999999999"}"#).is_err());
        assert!(serde_json::from_str::<Counted>(r#"{"votes":3}"#).is_err());
    }
}
