use chrono::{DateTime, NaiveDate, NaiveDateTime};
use ordered_float::OrderedFloat;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// `(variant name, ordinal)` pairs describing an enum field.
pub type EnumVariants = &'static [(&'static str, i64)];

/// Declared type of a queryable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Int,
    Long,
    Float,
    Decimal,
    DateTime,
    Enum(EnumVariants),
    Bool,
}

impl FieldKind {
    /// Kinds that support the ordered comparison operators in the filter DSL.
    #[must_use]
    pub const fn is_ordered(&self) -> bool {
        matches!(
            self,
            Self::Int | Self::Long | Self::Float | Self::Decimal | Self::DateTime | Self::Enum(_)
        )
    }

    /// Kinds the simple `filterField`/`filterValue` pair matches by exact equality.
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        matches!(self, Self::Int | Self::Long | Self::Float | Self::Decimal | Self::DateTime)
    }

    /// Parse a raw filter literal into a value of this kind.
    ///
    /// Returns `None` when the text does not parse; callers drop the term.
    #[must_use]
    pub fn parse_literal(&self, raw: &str) -> Option<FieldValue> {
        let s = raw.trim();
        match self {
            Self::String => Some(FieldValue::String(s.to_string())),
            Self::Int => s.parse::<i32>().ok().map(FieldValue::Int),
            Self::Long => s.parse::<i64>().ok().map(FieldValue::Long),
            Self::Float => s.parse::<f64>().ok().map(|f| FieldValue::Float(OrderedFloat(f))),
            Self::Decimal => Decimal::from_str(s).ok().map(FieldValue::Decimal),
            Self::DateTime => parse_datetime(s).map(FieldValue::DateTime),
            Self::Enum(variants) => parse_enum_token(variants, s),
            Self::Bool => parse_bool(s).map(FieldValue::Bool),
        }
    }
}

/// Runtime value of one field of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    String(String),
    Int(i32),
    Long(i64),
    Float(OrderedFloat<f64>),
    Decimal(Decimal),
    DateTime(NaiveDateTime),
    Enum { name: &'static str, ordinal: i64 },
    Bool(bool),
}

impl FieldValue {
    /// Compare two values of the same kind by their natural order.
    ///
    /// Strings compare case-insensitively with an ordinal tie-break. Values of
    /// different kinds are ordered by kind rank so a sort never panics.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Ordering {
        use FieldValue as V;
        match (self, other) {
            (V::String(a), V::String(b)) => {
                a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
            }
            (V::Int(a), V::Int(b)) => a.cmp(b),
            (V::Long(a), V::Long(b)) => a.cmp(b),
            (V::Float(a), V::Float(b)) => a.cmp(b),
            (V::Decimal(a), V::Decimal(b)) => a.cmp(b),
            (V::DateTime(a), V::DateTime(b)) => a.cmp(b),
            (V::Enum { ordinal: a, .. }, V::Enum { ordinal: b, .. }) => a.cmp(b),
            (V::Bool(a), V::Bool(b)) => a.cmp(b),
            _ => kind_rank(self).cmp(&kind_rank(other)),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
            Self::Long(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{}", x.0),
            Self::Decimal(d) => write!(f, "{d}"),
            Self::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S")),
            Self::Enum { name, ordinal } if name.is_empty() => write!(f, "{ordinal}"),
            Self::Enum { name, .. } => f.write_str(name),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
        }
    }
}

const fn kind_rank(v: &FieldValue) -> u8 {
    match v {
        FieldValue::Bool(_) => 0,
        FieldValue::Int(_) => 1,
        FieldValue::Long(_) => 2,
        FieldValue::Float(_) => 3,
        FieldValue::Decimal(_) => 4,
        FieldValue::Enum { .. } => 5,
        FieldValue::DateTime(_) => 6,
        FieldValue::String(_) => 7,
    }
}

/// Enums that can be addressed by name or ordinal in a filter.
pub trait QueryEnum {
    const VARIANTS: EnumVariants;

    fn ordinal(&self) -> i64;

    fn name(&self) -> &'static str {
        let ord = self.ordinal();
        Self::VARIANTS.iter().find(|(_, o)| *o == ord).map_or("", |(n, _)| *n)
    }

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Enum { name: self.name(), ordinal: self.ordinal() }
    }
}

/// Resolve an enum token: a variant name (any case) or any integer ordinal.
///
/// An ordinal with no declared variant still parses, with an empty name, so
/// it compares by number and matches no declared value.
#[must_use]
pub fn parse_enum_token(variants: EnumVariants, token: &str) -> Option<FieldValue> {
    let t = token.trim();
    if let Some((name, ordinal)) = variants.iter().find(|(n, _)| n.eq_ignore_ascii_case(t)) {
        return Some(FieldValue::Enum { name: *name, ordinal: *ordinal });
    }
    let ordinal = t.parse::<i64>().ok()?;
    let name = variants.iter().find(|(_, o)| *o == ordinal).map_or("", |(n, _)| *n);
    Some(FieldValue::Enum { name, ordinal })
}

/// Date/time literal in one of the accepted layouts.
///
/// Offsets in RFC 3339 input are normalized to UTC before the offset is dropped.
#[must_use]
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    const LAYOUTS: [&str; 4] =
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for layout in LAYOUTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, layout) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVELS: EnumVariants = &[("Low", 0), ("Medium", 1), ("High", 2)];

    #[test]
    fn literals_parse_per_kind() {
        assert_eq!(FieldKind::Int.parse_literal(" 42 "), Some(FieldValue::Int(42)));
        assert_eq!(FieldKind::Int.parse_literal("10.5"), None);
        assert_eq!(FieldKind::Long.parse_literal("-7"), Some(FieldValue::Long(-7)));
        assert_eq!(
            FieldKind::Float.parse_literal("10.5"),
            Some(FieldValue::Float(OrderedFloat(10.5)))
        );
        assert_eq!(
            FieldKind::Decimal.parse_literal("15.75"),
            Some(FieldValue::Decimal(Decimal::new(1575, 2)))
        );
        assert_eq!(FieldKind::Decimal.parse_literal("abc"), None);
        assert_eq!(FieldKind::Bool.parse_literal("TRUE"), Some(FieldValue::Bool(true)));
    }

    #[test]
    fn datetime_layouts() {
        let midnight = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(parse_datetime("2024-03-01"), Some(midnight));
        assert_eq!(parse_datetime("2024-03-01T00:00:00"), Some(midnight));
        assert_eq!(parse_datetime("2024-03-01 00:00"), Some(midnight));
        assert_eq!(parse_datetime("2024-03-01T02:00:00+02:00"), Some(midnight));
        assert_eq!(parse_datetime("01/03/2024"), None);
    }

    #[test]
    fn enum_tokens_by_name_or_ordinal() {
        assert_eq!(
            parse_enum_token(LEVELS, "high"),
            Some(FieldValue::Enum { name: "High", ordinal: 2 })
        );
        assert_eq!(
            parse_enum_token(LEVELS, "1"),
            Some(FieldValue::Enum { name: "Medium", ordinal: 1 })
        );
        assert_eq!(parse_enum_token(LEVELS, "9"), Some(FieldValue::Enum { name: "", ordinal: 9 }));
        assert_eq!(parse_enum_token(LEVELS, "Extreme"), None);
    }

    #[test]
    fn display_text_for_bools_and_enums() {
        assert_eq!(FieldValue::Bool(true).to_string(), "True");
        assert_eq!(FieldValue::Bool(false).to_string(), "False");
        assert_eq!(FieldValue::Enum { name: "High", ordinal: 2 }.to_string(), "High");
        assert_eq!(FieldValue::Enum { name: "", ordinal: 9 }.to_string(), "9");
    }

    #[test]
    fn string_compare_is_case_insensitive_first() {
        let a = FieldValue::String("ana".into());
        let b = FieldValue::String("Carlos".into());
        assert_eq!(a.compare(&b), Ordering::Less);
        let upper = FieldValue::String("Ana".into());
        assert_eq!(upper.compare(&a), Ordering::Less);
    }
}
