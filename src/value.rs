use std::fmt::Write;

use chrono::{NaiveDate, NaiveDateTime};

use crate::translate::Error;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// A runtime literal that can be embedded in (or bound to) a statement.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    /// An ordered collection of literals, used as the right side of `IN`.
    List(Vec<Value>),
}

impl Value {
    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }
}

/// Formats a value as SQL literal text.
///
/// Text is single-quoted with embedded quotes doubled, dates and timestamps
///  are quoted ISO strings, lists are comma-joined (no spaces) for use inside
///  `IN (...)`. There is no literal form for `Null`, so it is rejected along
///  with empty and nested lists.
pub fn format(value: &Value) -> Result<String, Error> {
    let mut out = String::new();
    write_literal(&mut out, value)?;
    Ok(out)
}

pub(crate) fn write_literal(out: &mut String, value: &Value) -> Result<(), Error> {
    match value {
        Value::List(items) => {
            if items.is_empty() {
                return Err(Error::InvalidArgument(
                    "an empty collection has no literal form".into(),
                ));
            }
            let mut first = true;
            for item in items {
                if item.is_list() {
                    return Err(Error::InvalidArgument(
                        "collections cannot be nested".into(),
                    ));
                }
                if !first {
                    out.push(',');
                }
                first = false;
                write_scalar(out, item)?;
            }
            Ok(())
        }
        scalar => write_scalar(out, scalar),
    }
}

fn write_scalar(out: &mut String, value: &Value) -> Result<(), Error> {
    // Writing to a String can't fail
    let _ = match value {
        Value::Null => {
            return Err(Error::InvalidArgument(
                "null has no literal form".into(),
            ));
        }
        Value::Bool(b) => write!(out, "{}", if *b { "TRUE" } else { "FALSE" }),
        Value::Int(i) => write!(out, "{i}"),
        Value::Float(f) if !f.is_finite() => {
            return Err(Error::InvalidArgument(format!(
                "{f} has no literal form"
            )));
        }
        Value::Float(f) => write!(out, "{f}"),
        Value::Text(s) => write!(out, "'{}'", escape_single_quotes(s)),
        Value::Date(d) => write!(out, "'{}'", d.format(DATE_FORMAT)),
        Value::DateTime(dt) => write!(out, "'{}'", dt.format(DATETIME_FORMAT)),
        Value::List(_) => {
            return Err(Error::InvalidArgument(
                "collections cannot be nested".into(),
            ));
        }
    };
    Ok(())
}

// Standard SQL: a quote inside a quoted string is written twice
fn escape_single_quotes(s: &str) -> std::borrow::Cow<'_, str> {
    if s.contains('\'') {
        s.replace('\'', "''").into()
    } else {
        s.into()
    }
}

macro_rules! int_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}
int_value!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}
impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}
impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}
impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}
impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}
impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}
impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}
impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(v: [T; N]) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}
impl<T: Into<Value> + Clone> From<&[T]> for Value {
    fn from(v: &[T]) -> Self {
        Value::List(v.iter().cloned().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_quoted() {
        assert_eq!(format(&"open".into()).unwrap(), "'open'");
    }

    #[test]
    fn embedded_quotes_are_doubled() {
        assert_eq!(format(&"O'Brien".into()).unwrap(), "'O''Brien'");
    }

    #[test]
    fn datetime_format() {
        let dt = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        assert_eq!(format(&dt.into()).unwrap(), "'2024-01-02 03:04:05'");
    }

    #[test]
    fn date_format() {
        let d = NaiveDate::from_ymd_opt(1999, 12, 31).unwrap();
        assert_eq!(format(&d.into()).unwrap(), "'1999-12-31'");
    }

    #[test]
    fn scalars() {
        assert_eq!(format(&100.into()).unwrap(), "100");
        assert_eq!(format(&(-7i64).into()).unwrap(), "-7");
        assert_eq!(format(&2.5.into()).unwrap(), "2.5");
        assert_eq!(format(&true.into()).unwrap(), "TRUE");
        assert_eq!(format(&false.into()).unwrap(), "FALSE");
    }

    #[test]
    fn non_finite_floats_are_rejected() {
        for f in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            assert!(
                matches!(format(&f.into()), Err(Error::InvalidArgument(_))),
                "{f}"
            );
        }
        let in_list = Value::List(vec![1.5.into(), f64::NAN.into()]);
        assert!(matches!(format(&in_list), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn lists_are_comma_joined() {
        assert_eq!(format(&vec![1, 2, 3].into()).unwrap(), "1,2,3");
        assert_eq!(format(&["a", "b"].into()).unwrap(), "'a','b'");
    }

    #[test]
    fn null_is_rejected() {
        assert!(matches!(format(&Value::Null), Err(Error::InvalidArgument(_))));
        let none: Option<i32> = None;
        assert!(matches!(format(&none.into()), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn bad_lists_are_rejected() {
        let empty: Vec<i32> = vec![];
        assert!(matches!(format(&empty.into()), Err(Error::InvalidArgument(_))));

        let nested = Value::List(vec![Value::List(vec![1.into()])]);
        assert!(matches!(format(&nested), Err(Error::InvalidArgument(_))));

        let with_null = Value::List(vec![1.into(), Value::Null]);
        assert!(matches!(format(&with_null), Err(Error::InvalidArgument(_))));
    }
}
