//! Flag values and their coercion rules.
//!
//! Scenario data mixes numbers and strings freely (`"2"` and `2` are both
//! common), so comparisons follow loose scripting-language semantics rather
//! than strict type equality:
//!
//! | left        | right       | `==` compares                       |
//! |-------------|-------------|-------------------------------------|
//! | undefined   | null        | always equal                        |
//! | undefined/null | anything else | never equal                    |
//! | number      | string      | number against the parsed string    |
//! | bool        | anything    | `0`/`1` against the other side      |
//! | same type   | same type   | value equality (NaN is never equal) |
//!
//! "undefined" is an unset flag, represented as `None`.

use serde::{Deserialize, Serialize};

/// A scalar stored in a flag or written in a condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl From<f64> for FlagValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for FlagValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for FlagValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl FlagValue {
    /// Whether this is the `Number` variant.
    #[must_use]
    pub fn is_number(&self) -> bool {
        matches!(self, Self::Number(_))
    }
}

/// Numeric coercion. Unset is NaN, null is 0, booleans are 0/1, strings are
/// parsed (blank is 0, garbage is NaN).
#[must_use]
pub fn to_number(value: Option<&FlagValue>) -> f64 {
    match value {
        None => f64::NAN,
        Some(FlagValue::Null) => 0.0,
        Some(FlagValue::Bool(b)) => f64::from(u8::from(*b)),
        Some(FlagValue::Number(n)) => *n,
        Some(FlagValue::Text(s)) => parse_number(s),
    }
}

/// Truthiness: unset, null, `false`, `0`, NaN and `""` are false.
#[must_use]
pub fn truthy(value: Option<&FlagValue>) -> bool {
    match value {
        None | Some(FlagValue::Null) => false,
        Some(FlagValue::Bool(b)) => *b,
        Some(FlagValue::Number(n)) => *n != 0.0 && !n.is_nan(),
        Some(FlagValue::Text(s)) => !s.is_empty(),
    }
}

/// Loose equality, see the module table.
#[must_use]
pub fn loose_eq(a: Option<&FlagValue>, b: Option<&FlagValue>) -> bool {
    scalar_eq(Scalar::from(a), Scalar::from(b))
}

#[derive(Clone, Copy)]
enum Scalar<'a> {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Text(&'a str),
}

impl<'a> From<Option<&'a FlagValue>> for Scalar<'a> {
    fn from(value: Option<&'a FlagValue>) -> Self {
        match value {
            None => Self::Undefined,
            Some(FlagValue::Null) => Self::Null,
            Some(FlagValue::Bool(b)) => Self::Bool(*b),
            Some(FlagValue::Number(n)) => Self::Number(*n),
            Some(FlagValue::Text(s)) => Self::Text(s),
        }
    }
}

#[allow(clippy::float_cmp)]
fn scalar_eq(a: Scalar<'_>, b: Scalar<'_>) -> bool {
    use Scalar::{Bool, Null, Number, Text, Undefined};

    match (a, b) {
        (Undefined | Null, Undefined | Null) => true,
        (Undefined | Null, _) | (_, Undefined | Null) => false,
        (Number(x), Number(y)) => x == y,
        (Text(x), Text(y)) => x == y,
        (Bool(x), Bool(y)) => x == y,
        (Number(x), Text(s)) | (Text(s), Number(x)) => x == parse_number(s),
        (Bool(x), other) => scalar_eq(Number(f64::from(u8::from(x))), other),
        (other, Bool(y)) => scalar_eq(other, Number(f64::from(u8::from(y)))),
    }
}

/// String to number the way loosely typed scenario data expects.
fn parse_number(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0.0;
    }
    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = s.strip_prefix(prefix) {
            #[allow(clippy::cast_precision_loss)]
            return u64::from_str_radix(digits, radix).map_or(f64::NAN, |n| n as f64);
        }
    }
    // Rust's parser also accepts "inf" and "nan"; those are not numbers here.
    if !s
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return f64::NAN;
    }
    s.parse().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> FlagValue {
        FlagValue::Number(n)
    }

    fn text(s: &str) -> FlagValue {
        FlagValue::Text(s.to_owned())
    }

    #[test]
    fn test_loose_eq_coercion_table() {
        let cases: Vec<(Option<FlagValue>, Option<FlagValue>, bool)> = vec![
            (None, None, true),
            (None, Some(FlagValue::Null), true),
            (Some(FlagValue::Null), Some(num(0.0)), false),
            (None, Some(num(0.0)), false),
            (None, Some(text("")), false),
            (Some(num(2.0)), Some(text("2")), true),
            (Some(text(" 2 ")), Some(num(2.0)), true),
            (Some(num(0.0)), Some(text("")), true),
            (Some(num(1.0)), Some(text("one")), false),
            (Some(FlagValue::Bool(true)), Some(num(1.0)), true),
            (Some(FlagValue::Bool(true)), Some(text("1")), true),
            (Some(FlagValue::Bool(false)), Some(text("")), true),
            (Some(FlagValue::Bool(true)), Some(text("true")), false),
            (Some(text("a")), Some(text("a")), true),
            (Some(text("a")), Some(text("A")), false),
            (Some(num(f64::NAN)), Some(num(f64::NAN)), false),
        ];

        for (a, b, expected) in cases {
            assert_eq!(
                loose_eq(a.as_ref(), b.as_ref()),
                expected,
                "{a:?} == {b:?}"
            );
        }
    }

    #[test]
    fn test_to_number_coercions() {
        assert!(to_number(None).is_nan());
        assert!(to_number(Some(&FlagValue::Null)).abs() < f64::EPSILON);
        assert!((to_number(Some(&FlagValue::Bool(true))) - 1.0).abs() < f64::EPSILON);
        assert!((to_number(Some(&text("0x10"))) - 16.0).abs() < f64::EPSILON);
        assert!((to_number(Some(&text("1e2"))) - 100.0).abs() < f64::EPSILON);
        assert!(to_number(Some(&text("   "))).abs() < f64::EPSILON);
        assert!(to_number(Some(&text("inf"))).is_nan());
        assert!(to_number(Some(&text("nan"))).is_nan());
        assert!(to_number(Some(&text("12px"))).is_nan());
        assert!(to_number(Some(&text("-Infinity"))).is_infinite());
    }

    #[test]
    fn test_truthiness() {
        assert!(!truthy(None));
        assert!(!truthy(Some(&FlagValue::Null)));
        assert!(!truthy(Some(&num(0.0))));
        assert!(!truthy(Some(&num(f64::NAN))));
        assert!(!truthy(Some(&text(""))));
        assert!(truthy(Some(&text("0"))));
        assert!(truthy(Some(&num(-1.0))));
        assert!(truthy(Some(&FlagValue::Bool(true))));
    }

    #[test]
    fn test_deserializes_untagged_scalars() {
        let values: Vec<FlagValue> =
            serde_json::from_str(r#"[null, true, 3, 2.5, "x"]"#).unwrap();

        assert_eq!(
            values,
            vec![
                FlagValue::Null,
                FlagValue::Bool(true),
                num(3.0),
                num(2.5),
                text("x"),
            ]
        );
    }
}
