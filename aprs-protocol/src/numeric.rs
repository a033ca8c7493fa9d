use std::fmt;
use std::str::FromStr;

use crate::error::{ProtocolError, Result};

/// A number carried in filter text, rendered exactly as the caller supplied it.
///
/// Integers render without a decimal point (`50`), decimals always carry one
/// (`50.0`, `35.25`). Decimals use the shortest representation that parses
/// back to the same `f64`, so no precision is lost and no locale applies.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Numeric {
    Integer(i64),
    Decimal(f64),
}

impl Numeric {
    /// Returns the value as `f64`.
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Integer(i) => i as f64,
            Self::Decimal(d) => d,
        }
    }
}

/// Writes `value` the way filter text expects a decimal: integral values keep
/// a trailing `.0`.
pub(crate) fn write_decimal(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if value.is_finite() && value.fract() == 0.0 {
        write!(f, "{value:.1}")
    } else {
        write!(f, "{value}")
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{i}"),
            Self::Decimal(d) => write_decimal(f, *d),
        }
    }
}

impl FromStr for Numeric {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ProtocolError::InvalidNumber(s.to_owned());
        if s.is_empty() {
            return Err(invalid());
        }
        if s.bytes().all(|b| b.is_ascii_digit() || b == b'-' || b == b'+') {
            if let Ok(i) = s.parse::<i64>() {
                return Ok(Self::Integer(i));
            }
        }
        s.parse::<f64>().map(Self::Decimal).map_err(|_| invalid())
    }
}

macro_rules! numeric_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Numeric {
                fn from(value: $t) -> Self {
                    Self::Integer(i64::from(value))
                }
            }
        )*
    };
}

numeric_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f64> for Numeric {
    fn from(value: f64) -> Self {
        Self::Decimal(value)
    }
}

impl From<f32> for Numeric {
    fn from(value: f32) -> Self {
        Self::Decimal(f64::from(value))
    }
}

impl TryFrom<u64> for Numeric {
    type Error = ProtocolError;

    fn try_from(value: u64) -> Result<Self> {
        i64::try_from(value)
            .map(Self::Integer)
            .map_err(|_| ProtocolError::InvalidNumber(value.to_string()))
    }
}

impl TryFrom<usize> for Numeric {
    type Error = ProtocolError;

    fn try_from(value: usize) -> Result<Self> {
        i64::try_from(value)
            .map(Self::Integer)
            .map_err(|_| ProtocolError::InvalidNumber(value.to_string()))
    }
}
