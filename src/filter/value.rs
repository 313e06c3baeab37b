//! Scalar literals and their canonical text form
//!
//! Every literal carried by a filter tree is a string. The rendering is
//! fixed and locale-independent so a tree built on one host parses back
//! to the same value on any other:
//! - integers: plain decimal, no separators
//! - floats: shortest round-trip decimal (`1.5`, `0.1`, `NaN`)
//! - booleans: `true` / `false`
//! - timestamps: RFC 3339 in UTC (`2024-01-31T08:00:00Z`)
//! - uuids: lowercase hyphenated

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

/// Type of a scalar member, used to parse literals for it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Int,
    UInt,
    Float,
    Text,
    Timestamp,
    Uuid,
}

impl ScalarKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarKind::Bool => "boolean",
            ScalarKind::Int => "integer",
            ScalarKind::UInt => "unsigned integer",
            ScalarKind::Float => "float",
            ScalarKind::Text => "text",
            ScalarKind::Timestamp => "timestamp",
            ScalarKind::Uuid => "uuid",
        }
    }

    /// Whether `<`, `>`, `<=`, `>=` are meaningful for this kind
    pub fn is_ordered(&self) -> bool {
        !matches!(self, ScalarKind::Bool)
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scalar value read from a member or parsed from a literal
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar<'a> {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(Cow<'a, str>),
    Timestamp(DateTime<Utc>),
    Uuid(Uuid),
}

impl<'a> Scalar<'a> {
    pub fn kind(&self) -> ScalarKind {
        match self {
            Scalar::Bool(_) => ScalarKind::Bool,
            Scalar::Int(_) => ScalarKind::Int,
            Scalar::UInt(_) => ScalarKind::UInt,
            Scalar::Float(_) => ScalarKind::Float,
            Scalar::Text(_) => ScalarKind::Text,
            Scalar::Timestamp(_) => ScalarKind::Timestamp,
            Scalar::Uuid(_) => ScalarKind::Uuid,
        }
    }

    /// Parse a canonical literal into a scalar of the given kind.
    ///
    /// No coercion: `"1.0"` is not an integer, `"True"` is not a boolean.
    pub fn parse(kind: ScalarKind, literal: &str) -> Result<Scalar<'static>, String> {
        let invalid = || format!("'{}' is not a valid {}", literal, kind);
        match kind {
            ScalarKind::Bool => match literal {
                "true" => Ok(Scalar::Bool(true)),
                "false" => Ok(Scalar::Bool(false)),
                _ => Err(invalid()),
            },
            ScalarKind::Int => literal.parse().map(Scalar::Int).map_err(|_| invalid()),
            ScalarKind::UInt => literal.parse().map(Scalar::UInt).map_err(|_| invalid()),
            ScalarKind::Float => literal.parse().map(Scalar::Float).map_err(|_| invalid()),
            ScalarKind::Text => Ok(Scalar::Text(Cow::Owned(literal.to_string()))),
            ScalarKind::Timestamp => DateTime::parse_from_rfc3339(literal)
                .map(|dt| Scalar::Timestamp(dt.with_timezone(&Utc)))
                .map_err(|_| invalid()),
            ScalarKind::Uuid => Uuid::parse_str(literal)
                .map(Scalar::Uuid)
                .map_err(|_| invalid()),
        }
    }

    pub fn into_owned(self) -> Scalar<'static> {
        match self {
            Scalar::Bool(b) => Scalar::Bool(b),
            Scalar::Int(i) => Scalar::Int(i),
            Scalar::UInt(u) => Scalar::UInt(u),
            Scalar::Float(f) => Scalar::Float(f),
            Scalar::Text(s) => Scalar::Text(Cow::Owned(s.into_owned())),
            Scalar::Timestamp(ts) => Scalar::Timestamp(ts),
            Scalar::Uuid(id) => Scalar::Uuid(id),
        }
    }

    /// Canonical text form
    pub fn to_literal(&self) -> String {
        match self {
            Scalar::Bool(b) => b.to_string(),
            Scalar::Int(i) => i.to_string(),
            Scalar::UInt(u) => u.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Text(s) => s.to_string(),
            Scalar::Timestamp(ts) => ts.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            Scalar::Uuid(id) => id.hyphenated().to_string(),
        }
    }

    /// Ordering between two scalars of the same kind
    pub fn compare(&self, other: &Scalar<'_>) -> Option<Ordering> {
        match (self, other) {
            (Scalar::Bool(a), Scalar::Bool(b)) => Some(a.cmp(b)),
            (Scalar::Int(a), Scalar::Int(b)) => Some(a.cmp(b)),
            (Scalar::UInt(a), Scalar::UInt(b)) => Some(a.cmp(b)),
            (Scalar::Float(a), Scalar::Float(b)) => a.partial_cmp(b),
            (Scalar::Text(a), Scalar::Text(b)) => Some(a.as_ref().cmp(b.as_ref())),
            (Scalar::Timestamp(a), Scalar::Timestamp(b)) => Some(a.cmp(b)),
            (Scalar::Uuid(a), Scalar::Uuid(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s.as_ref()),
            _ => None,
        }
    }
}

/// A Rust value that can appear as a filter literal or be read as a member
pub trait ScalarValue {
    const KIND: ScalarKind;

    fn to_scalar(&self) -> Scalar<'_>;

    /// Canonical, transport-safe text form
    fn to_literal(&self) -> String {
        self.to_scalar().to_literal()
    }
}

macro_rules! signed_scalar {
    ($($ty:ty),*) => {$(
        impl ScalarValue for $ty {
            const KIND: ScalarKind = ScalarKind::Int;
            fn to_scalar(&self) -> Scalar<'_> {
                Scalar::Int(i64::from(*self))
            }
        }
    )*};
}

macro_rules! unsigned_scalar {
    ($($ty:ty),*) => {$(
        impl ScalarValue for $ty {
            const KIND: ScalarKind = ScalarKind::UInt;
            fn to_scalar(&self) -> Scalar<'_> {
                Scalar::UInt(u64::from(*self))
            }
        }
    )*};
}

signed_scalar!(i8, i16, i32, i64);
unsigned_scalar!(u8, u16, u32, u64);

impl ScalarValue for f64 {
    const KIND: ScalarKind = ScalarKind::Float;
    fn to_scalar(&self) -> Scalar<'_> {
        Scalar::Float(*self)
    }
}

// Widened before rendering so literals match f32 members read as f64.
impl ScalarValue for f32 {
    const KIND: ScalarKind = ScalarKind::Float;
    fn to_scalar(&self) -> Scalar<'_> {
        Scalar::Float(f64::from(*self))
    }
}

impl ScalarValue for bool {
    const KIND: ScalarKind = ScalarKind::Bool;
    fn to_scalar(&self) -> Scalar<'_> {
        Scalar::Bool(*self)
    }
}

impl ScalarValue for str {
    const KIND: ScalarKind = ScalarKind::Text;
    fn to_scalar(&self) -> Scalar<'_> {
        Scalar::Text(Cow::Borrowed(self))
    }
}

impl ScalarValue for String {
    const KIND: ScalarKind = ScalarKind::Text;
    fn to_scalar(&self) -> Scalar<'_> {
        Scalar::Text(Cow::Borrowed(self.as_str()))
    }
}

impl ScalarValue for char {
    const KIND: ScalarKind = ScalarKind::Text;
    fn to_scalar(&self) -> Scalar<'_> {
        Scalar::Text(Cow::Owned(self.to_string()))
    }
}

impl ScalarValue for DateTime<Utc> {
    const KIND: ScalarKind = ScalarKind::Timestamp;
    fn to_scalar(&self) -> Scalar<'_> {
        Scalar::Timestamp(*self)
    }
}

impl ScalarValue for Uuid {
    const KIND: ScalarKind = ScalarKind::Uuid;
    fn to_scalar(&self) -> Scalar<'_> {
        Scalar::Uuid(*self)
    }
}

impl<V: ScalarValue + ?Sized> ScalarValue for &V {
    const KIND: ScalarKind = V::KIND;
    fn to_scalar(&self) -> Scalar<'_> {
        (**self).to_scalar()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_canonical_numbers() {
        assert_eq!(42i32.to_literal(), "42");
        assert_eq!((-7i64).to_literal(), "-7");
        assert_eq!(1.5f64.to_literal(), "1.5");
        assert_eq!(1e21f64.to_literal(), "1000000000000000000000");
        assert_eq!(true.to_literal(), "true");
    }

    #[test]
    fn test_f32_literal_matches_widened_member() {
        let literal = 0.1f32.to_literal();
        let parsed = Scalar::parse(ScalarKind::Float, &literal).unwrap();
        assert_eq!(parsed, 0.1f32.to_scalar());
    }

    #[test]
    fn test_timestamp_literal_is_utc_rfc3339() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 31, 8, 0, 0).unwrap();
        assert_eq!(ts.to_literal(), "2024-01-31T08:00:00Z");
        assert_eq!(
            Scalar::parse(ScalarKind::Timestamp, "2024-01-31T10:00:00+02:00").unwrap(),
            Scalar::Timestamp(ts)
        );
    }

    #[test]
    fn test_parse_rejects_coercion() {
        assert!(Scalar::parse(ScalarKind::Int, "1.0").is_err());
        assert!(Scalar::parse(ScalarKind::Bool, "True").is_err());
        assert!(Scalar::parse(ScalarKind::UInt, "-1").is_err());
        assert!(Scalar::parse(ScalarKind::Uuid, "not-a-uuid").is_err());
    }

    #[test]
    fn test_compare_same_kind_only() {
        assert_eq!(
            Scalar::Int(3).compare(&Scalar::Int(5)),
            Some(Ordering::Less)
        );
        assert_eq!(Scalar::Int(3).compare(&Scalar::UInt(3)), None);
        assert_eq!(Scalar::Float(f64::NAN).compare(&Scalar::Float(1.0)), None);
    }
}
