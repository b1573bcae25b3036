//! Human-readable byte sizes for configuration and log output

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid size format: {0}")]
    InvalidFormat(String),

    #[error("Invalid number: {0}")]
    InvalidNumber(#[from] std::num::ParseIntError),

    #[error("Invalid unit: {0}")]
    InvalidUnit(String),

    #[error("Size overflows 64 bits: {0}")]
    Overflow(String),
}

const KIB: u64 = 1024;
const UNITS: &[(&str, u64)] = &[
    ("TB", KIB * KIB * KIB * KIB),
    ("GB", KIB * KIB * KIB),
    ("MB", KIB * KIB),
    ("KB", KIB),
];

/// A number of bytes, parsed from `"4GB"`-style strings or plain integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ByteSize(pub u64);

impl ByteSize {
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Largest unit that divides into at least one, with one decimal place
    /// when the value is not a whole multiple.
    pub fn to_human_readable(&self) -> String {
        for &(unit, divisor) in UNITS {
            if self.0 >= divisor {
                let whole = self.0 / divisor;
                let tenths = (self.0 % divisor) * 10 / divisor;
                return if tenths == 0 {
                    format!("{}{}", whole, unit)
                } else {
                    format!("{}.{}{}", whole, tenths, unit)
                };
            }
        }

        format!("{}B", self.0)
    }
}

impl From<u64> for ByteSize {
    fn from(bytes: u64) -> Self {
        ByteSize(bytes)
    }
}

impl<'de> Deserialize<'de> for ByteSize {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct ByteSizeVisitor;

        impl serde::de::Visitor<'_> for ByteSizeVisitor {
            type Value = ByteSize;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a byte size as string (e.g., \"512MB\", \"4GB\") or integer")
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(ByteSize(v))
            }

            // The config crate hands integers over as i64.
            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                u64::try_from(v)
                    .map(ByteSize)
                    .map_err(|_| E::custom(format!("byte size must not be negative: {}", v)))
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                v.parse::<ByteSize>().map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_any(ByteSizeVisitor)
    }
}

impl FromStr for ByteSize {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_uppercase();

        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(s.len());
        let (digits, unit) = s.split_at(split);

        if digits.is_empty() {
            return Err(ParseError::InvalidFormat(s.clone()));
        }

        let num: u64 = digits.parse()?;

        let multiplier = match unit.trim() {
            "" | "B" => 1,
            "K" | "KB" | "KIB" => KIB,
            "M" | "MB" | "MIB" => KIB * KIB,
            "G" | "GB" | "GIB" => KIB * KIB * KIB,
            "T" | "TB" | "TIB" => KIB * KIB * KIB * KIB,
            other => return Err(ParseError::InvalidUnit(other.to_string())),
        };

        num.checked_mul(multiplier)
            .map(ByteSize)
            .ok_or(ParseError::Overflow(s))
    }
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_human_readable())
    }
}
