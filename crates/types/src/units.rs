//! Fractional ownership units
//!
//! Every certificate is split into exactly [`TOTAL_UNITS`] fractions. Unit
//! counts are plain unsigned integers; all arithmetic on them is integer-exact.

use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};
use std::fmt;

/// Integer count of fractional ownership units.
///
/// The on-chain type is `uint256`; every reachable value is bounded by
/// [`TOTAL_UNITS`], so 128 bits leave ample headroom.
pub type Units = u128;

/// Full fractional supply of one certificate.
pub const TOTAL_UNITS: Units = 100_000_000;

/// Serde adapter that writes units as decimal strings and reads either a
/// decimal string or a non-negative JSON integer.
///
/// JSON consumers routinely parse numbers as doubles, so large unit counts
/// travel as strings.
pub mod units_serde {
    use super::*;

    pub fn serialize<S>(units: &Units, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&units.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Units, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(UnitsVisitor)
    }

    struct UnitsVisitor;

    impl<'de> Visitor<'de> for UnitsVisitor {
        type Value = Units;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a non-negative integer or decimal string")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Units, E> {
            Ok(v as Units)
        }

        fn visit_u128<E: de::Error>(self, v: u128) -> Result<Units, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Units, E> {
            Units::try_from(v).map_err(|_| E::custom(format!("units must be non-negative, got {v}")))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Units, E> {
            v.trim()
                .parse::<Units>()
                .map_err(|err| E::custom(format!("invalid unit count {v:?}: {err}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Holder {
        #[serde(with = "units_serde")]
        units: Units,
    }

    #[test]
    fn writes_decimal_string() {
        let json = serde_json::to_string(&Holder { units: TOTAL_UNITS }).unwrap();
        assert_eq!(json, r#"{"units":"100000000"}"#);
    }

    #[test]
    fn reads_string_and_number() {
        let from_str: Holder = serde_json::from_str(r#"{"units":"42"}"#).unwrap();
        let from_num: Holder = serde_json::from_str(r#"{"units":42}"#).unwrap();
        assert_eq!(from_str, from_num);
    }

    #[test]
    fn rejects_negative_and_garbage() {
        assert!(serde_json::from_str::<Holder>(r#"{"units":-1}"#).is_err());
        assert!(serde_json::from_str::<Holder>(r#"{"units":"1.5"}"#).is_err());
        assert!(serde_json::from_str::<Holder>(r#"{"units":"abc"}"#).is_err());
    }
}
