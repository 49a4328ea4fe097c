//! Serde adapters that keep `Option` fields compatible with the on-disk
//! format, where "could not be extracted" is written in-band as `-1` or
//! `"Unknown"`.

use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};
use std::fmt::Display;
use std::str::FromStr;

/// In-band marker for a missing text field.
pub const UNKNOWN: &str = "Unknown";

/// In-band marker for a missing numeric field.
pub const MISSING_NUMBER: i64 = -1;

/// Integers: `None` <-> `-1`.
pub mod int {
    use super::*;

    pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(v) => v.serialize(serializer),
            None => serializer.serialize_i64(MISSING_NUMBER),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: Deserialize<'de> + PartialEq + From<i8>,
        D: Deserializer<'de>,
    {
        let value = T::deserialize(deserializer)?;
        if value == T::from(-1) {
            Ok(None)
        } else {
            Ok(Some(value))
        }
    }
}

/// Floats: `None` is written as the integer `-1`; `-1` and `-1.0` read back as `None`.
pub mod float {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_f64(*v),
            None => serializer.serialize_i64(MISSING_NUMBER),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        let value = f64::deserialize(deserializer)?;
        if value == MISSING_NUMBER as f64 {
            Ok(None)
        } else {
            Ok(Some(value))
        }
    }
}

/// Labels: `None` <-> `"Unknown"`, any other string goes through `FromStr`.
pub mod label {
    use super::*;

    pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        match value {
            Some(v) => serializer.collect_str(v),
            None => serializer.serialize_str(UNKNOWN),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if raw == UNKNOWN {
            return Ok(None);
        }
        raw.parse().map(Some).map_err(de::Error::custom)
    }
}
