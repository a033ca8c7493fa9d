use std::fmt;

use crate::error::{ProtocolError, Result};
use crate::numeric::write_decimal;

/// A latitude/longitude pair in decimal degrees.
///
/// Values are not range-checked; they pass into filter text verbatim.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Point {
    pub latitude: f64,
    pub longitude: f64,
}

impl Point {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Parse the `lat` and `lon` fields of a filter token.
    pub(crate) fn parse_fields(latitude: &str, longitude: &str) -> Result<Self> {
        let parse = |s: &str| {
            s.parse::<f64>()
                .map_err(|_| ProtocolError::InvalidNumber(s.to_owned()))
        };
        Ok(Self::new(parse(latitude)?, parse(longitude)?))
    }
}

/// Renders as `<lat>/<lon>`, the form every filter embeds.
impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_decimal(f, self.latitude)?;
        f.write_str("/")?;
        write_decimal(f, self.longitude)
    }
}
