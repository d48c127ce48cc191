//! Argument values for message templates.
//!
//! Positional substitution needs to apply format specifiers (`{0:D4}`, `{when:yyyy-MM-dd}`) to
//! heterogeneous arguments, so each argument is carried as a tagged value instead of a bare
//! `Display` object.

use super::date;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use serde_json::Value;
use std::fmt;

/// One argument of a log call.
#[derive(Debug, Clone, PartialEq)]
pub enum LogValue {
    Str(String),
    I64(i64),
    U64(u64),
    F64(f64),
    Bool(bool),
    Char(char),
    DateTime(DateTime<FixedOffset>),
    NaiveDateTime(NaiveDateTime),
    NaiveDate(NaiveDate),
    /// Rendered as compact JSON.
    Json(Value),
    Null,
}

impl LogValue {
    /// Renders the value with an optional format specifier.
    ///
    /// # Errors
    /// Returns a description of the problem when the specifier is not valid for this value.
    pub fn format_with(&self, spec: Option<&str>) -> Result<String, String> {
        let Some(spec) = spec.filter(|s| !s.is_empty()) else {
            return Ok(self.to_string());
        };

        match self {
            Self::I64(n) => format_integer(i128::from(*n), spec),
            Self::U64(n) => format_integer(i128::from(*n), spec),
            Self::F64(n) => format_float(*n, spec),
            Self::DateTime(dt) => {
                date::format(&dt.naive_local(), Some(*dt.offset()), spec)
            }
            Self::NaiveDateTime(dt) => date::format(dt, None, spec),
            Self::NaiveDate(d) => date::format(&d.and_time(NaiveTime::default()), None, spec),
            // Format specifiers have no meaning for these; they are ignored.
            Self::Str(_) | Self::Bool(_) | Self::Char(_) | Self::Json(_) | Self::Null => {
                Ok(self.to_string())
            }
        }
    }
}

impl fmt::Display for LogValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::I64(n) => write!(f, "{n}"),
            Self::U64(n) => write!(f, "{n}"),
            Self::F64(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Char(c) => write!(f, "{c}"),
            Self::DateTime(dt) => f.write_str(&dt.to_rfc3339()),
            Self::NaiveDateTime(dt) => write!(f, "{dt}"),
            Self::NaiveDate(d) => write!(f, "{d}"),
            Self::Json(v) => write!(f, "{v}"),
            Self::Null => Ok(()),
        }
    }
}

/// Largest width or precision a specifier may ask for.
const MAX_PRECISION: usize = 99;

/// Splits `"N2"` into `('N', Some(2))`.
fn split_spec(spec: &str) -> Result<(char, Option<usize>), String> {
    let mut chars = spec.chars();
    let kind = chars.next().ok_or_else(|| "empty format specifier".to_string())?;
    let digits = chars.as_str();
    if digits.is_empty() {
        return Ok((kind, None));
    }
    let precision = digits
        .parse::<usize>()
        .map_err(|_| format!("invalid format specifier '{spec}'"))?;
    if precision > MAX_PRECISION {
        return Err(format!(
            "precision in format specifier '{spec}' exceeds {MAX_PRECISION}"
        ));
    }
    Ok((kind, Some(precision)))
}

#[allow(clippy::cast_precision_loss)]
fn format_integer(n: i128, spec: &str) -> Result<String, String> {
    let (kind, precision) = split_spec(spec)?;
    match kind {
        'D' | 'd' => {
            let width = precision.unwrap_or(0);
            let digits = format!("{:0width$}", n.unsigned_abs());
            Ok(if n < 0 { format!("-{digits}") } else { digits })
        }
        'X' | 'x' => {
            let width = precision.unwrap_or(0);
            // Negative values render as their 64-bit two's complement.
            #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
            let bits = if n < 0 { u128::from(n as i64 as u64) } else { n as u128 };
            Ok(if kind == 'X' {
                format!("{bits:0width$X}")
            } else {
                format!("{bits:0width$x}")
            })
        }
        'N' | 'n' | 'F' | 'f' | 'E' | 'e' | 'P' | 'p' | 'G' | 'g' | 'R' | 'r' => {
            if matches!(kind, 'G' | 'g' | 'R' | 'r') {
                return Ok(n.to_string());
            }
            format_float(n as f64, spec)
        }
        _ => Err(format!("format specifier '{spec}' is not valid for an integer")),
    }
}

fn format_float(n: f64, spec: &str) -> Result<String, String> {
    let (kind, precision) = split_spec(spec)?;
    match kind {
        'F' | 'f' => Ok(format!("{n:.*}", precision.unwrap_or(2))),
        'N' | 'n' => Ok(group_thousands(&format!("{n:.*}", precision.unwrap_or(2)))),
        'P' | 'p' => Ok(format!(
            "{} %",
            group_thousands(&format!("{:.*}", precision.unwrap_or(2), n * 100.0))
        )),
        'E' | 'e' => Ok(format_exponent(n, precision.unwrap_or(6), kind == 'E')),
        'G' | 'g' | 'R' | 'r' => Ok(n.to_string()),
        _ => Err(format!("format specifier '{spec}' is not valid for a number")),
    }
}

/// `1234.56` with `E3` becomes `1.235E+003`.
fn format_exponent(n: f64, precision: usize, upper: bool) -> String {
    let raw = format!("{n:.precision$e}");
    let (mantissa, exponent) = raw.split_once('e').unwrap_or((raw.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let sign = if exponent < 0 { '-' } else { '+' };
    let marker = if upper { 'E' } else { 'e' };
    format!("{mantissa}{marker}{sign}{:03}", exponent.abs())
}

fn group_thousands(fixed: &str) -> String {
    let (sign, unsigned) = fixed
        .strip_prefix('-')
        .map_or(("", fixed), |rest| ("-", rest));
    let (int_part, frac_part) = unsigned
        .split_once('.')
        .map_or((unsigned, None), |(i, f)| (i, Some(f)));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

macro_rules! from_lossless {
    ($variant:ident, $target:ty, [$($source:ty),*]) => {
        $(
            impl From<$source> for LogValue {
                fn from(v: $source) -> Self {
                    Self::$variant(<$target>::from(v))
                }
            }
        )*
    };
}

from_lossless!(I64, i64, [i8, i16, i32, i64]);
from_lossless!(U64, u64, [u8, u16, u32, u64]);
from_lossless!(F64, f64, [f32, f64]);

impl From<isize> for LogValue {
    fn from(v: isize) -> Self {
        i64::try_from(v).map_or_else(|_| Self::Str(v.to_string()), Self::I64)
    }
}

impl From<usize> for LogValue {
    fn from(v: usize) -> Self {
        u64::try_from(v).map_or_else(|_| Self::Str(v.to_string()), Self::U64)
    }
}

impl From<bool> for LogValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<char> for LogValue {
    fn from(v: char) -> Self {
        Self::Char(v)
    }
}

impl From<&str> for LogValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for LogValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<&String> for LogValue {
    fn from(v: &String) -> Self {
        Self::Str(v.clone())
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for LogValue {
    fn from(v: DateTime<Tz>) -> Self {
        Self::DateTime(v.fixed_offset())
    }
}

impl From<NaiveDateTime> for LogValue {
    fn from(v: NaiveDateTime) -> Self {
        Self::NaiveDateTime(v)
    }
}

impl From<NaiveDate> for LogValue {
    fn from(v: NaiveDate) -> Self {
        Self::NaiveDate(v)
    }
}

impl From<Value> for LogValue {
    fn from(v: Value) -> Self {
        Self::Json(v)
    }
}

impl<T: Into<Self>> From<Option<T>> for LogValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// Builds a `Vec<LogValue>` from heterogeneous expressions.
///
/// ```
/// let args = liblog::args!["disk", 93, 0.5];
/// assert_eq!(args.len(), 3);
/// ```
#[macro_export]
macro_rules! args {
    ($($value:expr),* $(,)?) => {
        ::std::vec![$($crate::fmt::LogValue::from($value)),*]
    };
}
