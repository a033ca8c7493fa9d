//! Server-side filter expressions.
//!
//! See <http://www.aprs-is.net/javAPRSFilter.aspx> for the server's view of
//! the grammar. Each [`Filter`] renders to one space-free token; a login
//! directive joins several with single spaces.

use std::fmt;
use std::ops::Not;
use std::str::FromStr;

use crate::error::{ProtocolError, Result};
use crate::numeric::Numeric;
use crate::packet_type::PacketType;
use crate::point::Point;

/// The predicate a filter applies.
#[derive(Clone, Debug, PartialEq)]
pub enum FilterKind {
    /// `r/lat/lon/dist`: packets within `radius` km of `point`.
    Range { point: Point, radius: Numeric },
    /// `p/aa/bb`: source callsign starts with any prefix.
    Prefix(Vec<String>),
    /// `b/call1/call2`: exact source callsigns (wildcards allowed by the server).
    Budlist(Vec<String>),
    /// `o/obj1/obj2`: object and item names.
    Object(Vec<String>),
    /// `os/obj1/obj2`: object and item names, matched strictly.
    StrictObject(Vec<String>),
    /// `t/poimqstunw[/call/km]`: packet types, optionally near a station.
    Type {
        types: Vec<PacketType>,
        call: Option<String>,
        radius: Option<Numeric>,
    },
    /// `a/latN/lonW/latS/lonE`: packets inside a box.
    Area { nw: Point, se: Point },
}

impl FilterKind {
    fn code(&self) -> &'static str {
        match self {
            Self::Range { .. } => "r",
            Self::Prefix(_) => "p",
            Self::Budlist(_) => "b",
            Self::Object(_) => "o",
            Self::StrictObject(_) => "os",
            Self::Type { .. } => "t",
            Self::Area { .. } => "a",
        }
    }
}

/// A single filter predicate plus its inversion flag.
///
/// Inversion is a consuming transformation: the value returned by
/// [`invert`](Self::invert) (or `!filter`) is a new inverted filter, and
/// inverting it again changes nothing.
///
/// ```
/// use aprs_is_protocol::{Filter, Point};
///
/// let range = Filter::range(Point::new(35.0, -97.0), 50);
/// assert_eq!(range.to_string(), "r/35.0/-97.0/50");
/// assert_eq!((!range).to_string(), "-r/35.0/-97.0/50");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Filter {
    kind: FilterKind,
    inverted: bool,
}

impl Filter {
    pub fn new(kind: FilterKind) -> Self {
        Self {
            kind,
            inverted: false,
        }
    }

    pub fn range(point: Point, radius: impl Into<Numeric>) -> Self {
        Self::new(FilterKind::Range {
            point,
            radius: radius.into(),
        })
    }

    pub fn prefix<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(FilterKind::Prefix(collect_items(items)))
    }

    pub fn budlist<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(FilterKind::Budlist(collect_items(items)))
    }

    pub fn object<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(FilterKind::Object(collect_items(items)))
    }

    pub fn strict_object<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(FilterKind::StrictObject(collect_items(items)))
    }

    /// Type filter over the whole feed.
    pub fn types(types: impl IntoIterator<Item = PacketType>) -> Self {
        Self::new(FilterKind::Type {
            types: types.into_iter().collect(),
            call: None,
            radius: None,
        })
    }

    /// Type filter restricted to `radius` km around the station `call`.
    pub fn types_near(
        types: impl IntoIterator<Item = PacketType>,
        call: impl Into<String>,
        radius: impl Into<Numeric>,
    ) -> Self {
        Self::new(FilterKind::Type {
            types: types.into_iter().collect(),
            call: Some(call.into()),
            radius: Some(radius.into()),
        })
    }

    pub fn area(nw: Point, se: Point) -> Self {
        Self::new(FilterKind::Area { nw, se })
    }

    /// Returns this filter with the inversion flag set.
    pub fn invert(self) -> Self {
        Self {
            inverted: true,
            ..self
        }
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    pub fn kind(&self) -> &FilterKind {
        &self.kind
    }

    /// Check that this filter renders to a token that parses back to it.
    ///
    /// List filters need at least one item. Items and the type filter's call
    /// must be non-empty and free of `/` and whitespace. A type filter radius
    /// needs a call, and every coordinate and radius must be finite.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| ProtocolError::InvalidFilter(format!("{self}: {reason}"));

        match &self.kind {
            FilterKind::Range { point, radius } => {
                if !point_is_finite(point) || !radius.as_f64().is_finite() {
                    return Err(invalid("coordinates and radius must be finite"));
                }
            }
            FilterKind::Prefix(items)
            | FilterKind::Budlist(items)
            | FilterKind::Object(items)
            | FilterKind::StrictObject(items) => {
                if items.is_empty() {
                    return Err(invalid("list filter needs at least one item"));
                }
                if !items.iter().all(|item| is_field(item)) {
                    return Err(invalid("list items must be non-empty, without '/' or spaces"));
                }
            }
            FilterKind::Type { call, radius, .. } => {
                match call.as_deref() {
                    Some(call) if !is_field(call) => {
                        return Err(invalid("call must be non-empty, without '/' or spaces"));
                    }
                    None if radius.is_some() => return Err(invalid("radius needs a call")),
                    _ => {}
                }
                if radius.is_some_and(|r| !r.as_f64().is_finite()) {
                    return Err(invalid("radius must be finite"));
                }
            }
            FilterKind::Area { nw, se } => {
                if !point_is_finite(nw) || !point_is_finite(se) {
                    return Err(invalid("coordinates must be finite"));
                }
            }
        }
        Ok(())
    }
}

fn is_field(s: &str) -> bool {
    !s.is_empty() && !s.contains(|c: char| c == '/' || c.is_whitespace())
}

fn point_is_finite(point: &Point) -> bool {
    point.latitude.is_finite() && point.longitude.is_finite()
}

fn collect_items<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}

impl Not for Filter {
    type Output = Self;

    fn not(self) -> Self {
        self.invert()
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.inverted {
            f.write_str("-")?;
        }
        f.write_str(self.kind.code())?;
        match &self.kind {
            FilterKind::Range { point, radius } => write!(f, "/{point}/{radius}"),
            FilterKind::Prefix(items)
            | FilterKind::Budlist(items)
            | FilterKind::Object(items)
            | FilterKind::StrictObject(items) => write!(f, "/{}", items.join("/")),
            FilterKind::Type {
                types,
                call,
                radius,
            } => {
                f.write_str("/")?;
                for t in types {
                    write!(f, "{}", t.as_char())?;
                }
                // The radius is positional after the call; without a call it has no slot.
                if let Some(call) = call.as_deref().filter(|c| !c.is_empty()) {
                    write!(f, "/{call}")?;
                    if let Some(radius) = radius {
                        write!(f, "/{radius}")?;
                    }
                }
                Ok(())
            }
            FilterKind::Area { nw, se } => write!(f, "/{nw}/{se}"),
        }
    }
}

impl FromStr for Filter {
    type Err = ProtocolError;

    /// Parse one filter token as produced by the `Display` impl.
    fn from_str(token: &str) -> Result<Self> {
        let invalid = |reason: &str| ProtocolError::InvalidFilter(format!("{token:?}: {reason}"));

        let (inverted, body) = match token.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, token),
        };
        if body.is_empty() || body.contains(char::is_whitespace) {
            return Err(invalid("expected a single non-empty token"));
        }

        let mut parts = body.split('/');
        let code = parts.next().unwrap_or_default();
        let fields: Vec<&str> = parts.collect();

        let kind = match code {
            "r" => match fields.as_slice() {
                [lat, lon, radius] => FilterKind::Range {
                    point: Point::parse_fields(lat, lon)?,
                    radius: radius.parse()?,
                },
                _ => return Err(invalid("range takes lat/lon/radius")),
            },
            "p" | "b" | "o" | "os" => {
                if fields.is_empty() || fields.iter().any(|item| item.is_empty()) {
                    return Err(invalid("list filter needs non-empty items"));
                }
                let items = fields.iter().map(|s| (*s).to_owned()).collect();
                match code {
                    "p" => FilterKind::Prefix(items),
                    "b" => FilterKind::Budlist(items),
                    "o" => FilterKind::Object(items),
                    _ => FilterKind::StrictObject(items),
                }
            }
            "t" => {
                let (chars, call, radius) = match fields.as_slice() {
                    [chars] => (*chars, None, None),
                    [chars, call] => (*chars, Some(*call), None),
                    [chars, call, radius] => (*chars, Some(*call), Some(*radius)),
                    _ => return Err(invalid("type takes types[/call[/radius]]")),
                };
                if call.is_some_and(str::is_empty) {
                    return Err(invalid("empty call"));
                }
                FilterKind::Type {
                    types: chars
                        .chars()
                        .map(PacketType::from_char)
                        .collect::<Result<_>>()?,
                    call: call.map(str::to_owned),
                    radius: radius.map(str::parse).transpose()?,
                }
            }
            "a" => match fields.as_slice() {
                [nw_lat, nw_lon, se_lat, se_lon] => FilterKind::Area {
                    nw: Point::parse_fields(nw_lat, nw_lon)?,
                    se: Point::parse_fields(se_lat, se_lon)?,
                },
                _ => return Err(invalid("area takes four coordinates")),
            },
            _ => return Err(invalid("unknown filter kind")),
        };

        let filter = Self { kind, inverted };
        filter.validate()?;
        Ok(filter)
    }
}

/// Parse a space-separated filter expression into filters, in order.
pub fn parse_filters(expr: &str) -> Result<Vec<Filter>> {
    expr.split_whitespace().map(str::parse).collect()
}

/// Space-join rendered filters, preserving their order.
pub fn join(filters: &[Filter]) -> String {
    filters
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_kinds() -> Vec<Filter> {
        vec![
            Filter::range(Point::new(35.0, -97.0), 50),
            Filter::prefix(["KD0", "W1"]),
            Filter::budlist(["N0CALL", "N0CALL-9"]),
            Filter::object(["SHELTER"]),
            Filter::strict_object(["EOC1", "EOC2"]),
            Filter::types([PacketType::Position, PacketType::Weather]),
            Filter::types_near([PacketType::Message], "KD0VTE", 25.5),
            Filter::area(Point::new(39.0, -99.0), Point::new(36.5, -94.5)),
        ]
    }

    #[test]
    fn render_range() {
        let f = Filter::range(Point::new(123.0, -123.0), 15);
        assert_eq!(f.to_string(), "r/123.0/-123.0/15");
        let f = Filter::range(Point::new(47.6062, -122.3321), 100.5);
        assert_eq!(f.to_string(), "r/47.6062/-122.3321/100.5");
    }

    #[test]
    fn render_lists() {
        assert_eq!(Filter::prefix(["KD0", "W1"]).to_string(), "p/KD0/W1");
        assert_eq!(Filter::budlist(["N0CALL"]).to_string(), "b/N0CALL");
        assert_eq!(Filter::object(["A", "B", "C"]).to_string(), "o/A/B/C");
        assert_eq!(Filter::strict_object(["EOC"]).to_string(), "os/EOC");
    }

    #[test]
    fn render_type() {
        let all = Filter::types(PacketType::ALL);
        assert_eq!(all.to_string(), "t/imnopqstuw");

        let near = Filter::types_near([PacketType::Position, PacketType::Objects], "KD0VTE", 50);
        assert_eq!(near.to_string(), "t/po/KD0VTE/50");
    }

    #[test]
    fn render_type_call_without_radius() {
        let f = Filter::new(FilterKind::Type {
            types: vec![PacketType::Status],
            call: Some("N0CALL".into()),
            radius: None,
        });
        assert_eq!(f.to_string(), "t/s/N0CALL");
    }

    #[test]
    fn render_type_radius_needs_call() {
        let f = Filter::new(FilterKind::Type {
            types: vec![PacketType::Status],
            call: None,
            radius: Some(Numeric::Integer(10)),
        });
        assert_eq!(f.to_string(), "t/s");
        assert!(f.validate().is_err());

        let f = Filter::new(FilterKind::Type {
            types: vec![PacketType::Status],
            call: Some(String::new()),
            radius: Some(Numeric::Integer(10)),
        });
        assert_eq!(f.to_string(), "t/s");
        assert!(f.validate().is_err());
    }

    #[test]
    fn validate_accepts_constructed_filters() {
        for f in all_kinds() {
            f.validate().unwrap();
            f.invert().validate().unwrap();
        }
    }

    #[test]
    fn validate_rejects_unrenderable_shapes() {
        let bad = [
            Filter::prefix(Vec::<String>::new()),
            Filter::budlist(["N0CALL", ""]),
            Filter::object(["A/B"]),
            Filter::strict_object(["TWO WORDS"]),
            Filter::types_near([PacketType::Message], "KD0/VTE", 5),
            Filter::types_near([PacketType::Message], "KD0VTE", f64::INFINITY),
            Filter::range(Point::new(f64::NAN, 0.0), 5),
            Filter::area(Point::new(1.0, 2.0), Point::new(3.0, f64::NEG_INFINITY)),
        ];
        for f in bad {
            let text = f.to_string();
            assert!(f.validate().is_err(), "{text:?} should not validate");
            // Rendering loses information, so parsing never recovers `f`.
            assert_ne!(text.parse::<Filter>().ok().as_ref(), Some(&f), "{text:?}");
        }
    }

    #[test]
    fn render_area() {
        let f = Filter::area(Point::new(39.0, -99.0), Point::new(36.5, -94.5));
        assert_eq!(f.to_string(), "a/39.0/-99.0/36.5/-94.5");
    }

    #[test]
    fn inverted_is_dash_prefixed() {
        for f in all_kinds() {
            let plain = f.to_string();
            let inverted = f.clone().invert();
            assert!(inverted.is_inverted());
            assert_eq!(inverted.to_string(), format!("-{plain}"));
        }
    }

    #[test]
    fn invert_is_idempotent() {
        for f in all_kinds() {
            let once = f.clone().invert();
            let twice = once.clone().invert();
            assert_eq!(once, twice);
            assert_eq!(once.to_string(), twice.to_string());
        }
    }

    #[test]
    fn not_operator_inverts() {
        let f = Filter::prefix(["KD0"]);
        assert_eq!((!f.clone()).to_string(), "-p/KD0");
        assert_eq!((!!f).to_string(), "-p/KD0");
    }

    #[test]
    fn invert_leaves_original_untouched() {
        let f = Filter::budlist(["N0CALL"]);
        let _inverted = f.clone().invert();
        assert!(!f.is_inverted());
        assert_eq!(f.to_string(), "b/N0CALL");
    }

    #[test]
    fn range_preserves_values() {
        let cases = [
            (35.0, -97.0),
            (47.606209, -122.332071),
            (-33.868820, 151.209296),
            (0.1, -0.000001),
        ];
        for (lat, lon) in cases {
            for radius in [Numeric::Integer(50), Numeric::Decimal(12.345678)] {
                let text = Filter::range(Point::new(lat, lon), radius).to_string();
                let fields: Vec<&str> = text.split('/').collect();
                assert_eq!(fields[0], "r");
                assert_eq!(fields[1].parse::<f64>().unwrap(), lat);
                assert_eq!(fields[2].parse::<f64>().unwrap(), lon);
                assert_eq!(fields[3].parse::<Numeric>().unwrap(), radius);
            }
        }
    }

    #[test]
    fn parse_round_trips_rendering() {
        for f in all_kinds() {
            let parsed: Filter = f.to_string().parse().unwrap();
            assert_eq!(parsed, f);

            let inverted = f.invert();
            let parsed: Filter = inverted.to_string().parse().unwrap();
            assert_eq!(parsed, inverted);
        }
    }

    #[test]
    fn parse_integer_coordinates() {
        let f: Filter = "r/35/-97/50".parse().unwrap();
        assert_eq!(f, Filter::range(Point::new(35.0, -97.0), 50));
    }

    #[test]
    fn parse_errors() {
        for bad in [
            "",
            "-",
            "x/1/2",
            "r/1/2",
            "r/a/2/3",
            "r/1/2/3/4",
            "p/",
            "p/A//B",
            "t/px",
            "t/p//5",
            "t/p/CALL/5/6",
            "a/1/2/3",
            "p/A B",
            "r/NaN/0/5",
            "a/1/2/3/inf",
        ] {
            assert!(bad.parse::<Filter>().is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn parse_expression_keeps_order() {
        let filters = parse_filters("p/KD0  r/35.0/-97.0/50 -b/N0CALL").unwrap();
        assert_eq!(filters.len(), 3);
        assert_eq!(filters[0], Filter::prefix(["KD0"]));
        assert_eq!(filters[1], Filter::range(Point::new(35.0, -97.0), 50));
        assert_eq!(filters[2], Filter::budlist(["N0CALL"]).invert());
        assert_eq!(join(&filters), "p/KD0 r/35.0/-97.0/50 -b/N0CALL");
    }

    #[test]
    fn join_empty() {
        assert_eq!(join(&[]), "");
    }
}
