use std::fmt::Display;
use std::num::IntErrorKind;

use super::duration::{Duration, ParseDurationError};

/// The value kinds a flag can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    Int,
    Int64,
    Uint,
    Uint64,
    Float64,
    String,
    Duration,
}

/// A flag value tagged with its kind.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i32),
    Int64(i64),
    Uint(u32),
    Uint64(u64),
    Float64(f64),
    String(String),
    Duration(Duration),
}

impl Kind {
    /// Label shown in usage text when the help has no placeholder.
    pub fn type_label(&self) -> &'static str {
        match self {
            Kind::Bool => "",
            Kind::Int | Kind::Int64 => "int",
            Kind::Uint | Kind::Uint64 => "uint",
            Kind::Float64 => "float",
            Kind::String => "string",
            Kind::Duration => "duration",
        }
    }

    pub fn zero(&self) -> Value {
        match self {
            Kind::Bool => Value::Bool(false),
            Kind::Int => Value::Int(0),
            Kind::Int64 => Value::Int64(0),
            Kind::Uint => Value::Uint(0),
            Kind::Uint64 => Value::Uint64(0),
            Kind::Float64 => Value::Float64(0.0),
            Kind::String => Value::String(String::new()),
            Kind::Duration => Value::Duration(Duration::ZERO),
        }
    }

    /// Converts command-line text into a value of this kind.
    ///
    /// On failure returns a short reason such as `"invalid syntax"`.
    pub fn parse(&self, text: &str) -> Result<Value, String> {
        let value = match self {
            Kind::Bool => Value::Bool(parse_bool(text)?),
            Kind::Int => Value::Int(narrow(parse_signed(text)?)?),
            Kind::Int64 => Value::Int64(parse_signed(text)?),
            Kind::Uint => Value::Uint(narrow(parse_unsigned(text)?)?),
            Kind::Uint64 => Value::Uint64(parse_unsigned(text)?),
            Kind::Float64 => Value::Float64(
                text.parse()
                    .map_err(|_| "invalid syntax".to_string())?,
            ),
            Kind::String => Value::String(text.to_string()),
            Kind::Duration => Value::Duration(
                text.parse()
                    .map_err(|e: ParseDurationError| e.to_string())?,
            ),
        };
        Ok(value)
    }
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int,
            Value::Int64(_) => Kind::Int64,
            Value::Uint(_) => Kind::Uint,
            Value::Uint64(_) => Kind::Uint64,
            Value::Float64(_) => Kind::Float64,
            Value::String(_) => Kind::String,
            Value::Duration(_) => Kind::Duration,
        }
    }

    /// True when the value is the natural zero of its kind.
    pub fn is_kind_zero(&self) -> bool {
        match self {
            Value::Bool(b) => !b,
            Value::Int(n) => *n == 0,
            Value::Int64(n) => *n == 0,
            Value::Uint(n) => *n == 0,
            Value::Uint64(n) => *n == 0,
            Value::Float64(n) => *n == 0.0,
            Value::String(s) => s.is_empty(),
            Value::Duration(d) => d.is_zero(),
        }
    }

    /// Decides whether usage text should omit the `(default ...)` note.
    ///
    /// Besides the natural zero, any value whose text is exactly `false`,
    /// empty or `0` counts as zero, whatever its kind. A string flag that
    /// defaults to `"0"` therefore shows no default either.
    pub fn looks_zero(&self) -> bool {
        if self.is_kind_zero() {
            return true;
        }
        matches!(self.to_string().as_str(), "false" | "" | "0")
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Uint(v) => write!(f, "{v}"),
            Value::Uint64(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{}", format_float(*v)),
            Value::String(v) => write!(f, "{v}"),
            Value::Duration(v) => write!(f, "{v}"),
        }
    }
}

/// Shortest round-trip form, switching to `1e+06` style notation when the
/// decimal exponent is below -4 or at least 6.
fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "+Inf" } else { "-Inf" }.to_string();
    }
    let scientific = format!("{value:e}");
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return value.to_string();
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    if value != 0.0 && (exponent < -4 || exponent >= 6) {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs())
    } else {
        value.to_string()
    }
}

fn parse_bool(text: &str) -> Result<bool, String> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err("invalid syntax".to_string()),
    }
}

fn narrow<T: TryFrom<W>, W>(wide: W) -> Result<T, String> {
    T::try_from(wide).map_err(|_| "value out of range".to_string())
}

/// Splits an optional base prefix off unsigned digits.
///
/// `0x`, `0o` and `0b` select hex, octal and binary; a bare leading zero
/// also means octal. Separating underscores are dropped.
fn split_radix(text: &str) -> (u32, String) {
    let lower = text.get(..2).map(str::to_ascii_lowercase);
    let (radix, digits) = match lower.as_deref() {
        Some("0x") => (16, &text[2..]),
        Some("0o") => (8, &text[2..]),
        Some("0b") => (2, &text[2..]),
        _ if text.len() > 1 && text.starts_with('0') => (8, &text[1..]),
        _ => (10, text),
    };
    (radix, digits.replace('_', ""))
}

/// An underscore may only sit between two digits, or between a base
/// prefix and a digit.
fn underscores_ok(text: &str) -> bool {
    let bytes = text.as_bytes();
    let (mut rest, mut saw, hex) = match bytes {
        [b'0', prefix, tail @ ..] if matches!(prefix.to_ascii_lowercase(), b'b' | b'o' | b'x') => {
            (tail, b'0', prefix.to_ascii_lowercase() == b'x')
        }
        _ => (bytes, b'^', false),
    };
    while let [c, tail @ ..] = rest {
        if c.is_ascii_digit() || (hex && c.is_ascii_hexdigit()) {
            saw = b'0';
        } else if *c == b'_' {
            if saw != b'0' {
                return false;
            }
            saw = b'_';
        } else {
            if saw == b'_' {
                return false;
            }
            saw = b'!';
        }
        rest = tail;
    }
    saw != b'_'
}

fn parse_unsigned(text: &str) -> Result<u64, String> {
    if text.contains('_') && !underscores_ok(text) {
        return Err("invalid syntax".to_string());
    }
    let (radix, digits) = split_radix(text);
    // from_str_radix tolerates a leading '+', strconv-style parsing does not
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return Err("invalid syntax".to_string());
    }
    u64::from_str_radix(&digits, radix).map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow => "value out of range".to_string(),
        _ => "invalid syntax".to_string(),
    })
}

fn parse_signed(text: &str) -> Result<i64, String> {
    let (negative, magnitude) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let magnitude = i128::from(parse_unsigned(magnitude)?);
    narrow(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bool_spellings() {
        for text in ["1", "t", "T", "TRUE", "true", "True"] {
            assert_eq!(Kind::Bool.parse(text), Ok(Value::Bool(true)));
        }
        for text in ["0", "f", "F", "FALSE", "false", "False"] {
            assert_eq!(Kind::Bool.parse(text), Ok(Value::Bool(false)));
        }
        assert!(Kind::Bool.parse("yes").is_err());
    }

    #[test]
    fn parse_integers_with_prefixes() {
        assert_eq!(Kind::Int.parse("-42"), Ok(Value::Int(-42)));
        assert_eq!(Kind::Int64.parse("0x1F"), Ok(Value::Int64(31)));
        assert_eq!(Kind::Int64.parse("-0b101"), Ok(Value::Int64(-5)));
        assert_eq!(Kind::Uint.parse("0o17"), Ok(Value::Uint(15)));
        assert_eq!(Kind::Uint.parse("017"), Ok(Value::Uint(15)));
        assert_eq!(Kind::Uint64.parse("0x_ff_ff"), Ok(Value::Uint64(65535)));
        assert_eq!(Kind::Uint.parse("0"), Ok(Value::Uint(0)));
        assert_eq!(Kind::Uint.parse("9090"), Ok(Value::Uint(9090)));
    }

    #[test]
    fn underscores_between_digits() {
        assert_eq!(Kind::Int.parse("1_000"), Ok(Value::Int(1000)));
        assert_eq!(Kind::Int64.parse("-1_000_000"), Ok(Value::Int64(-1_000_000)));
        assert_eq!(Kind::Uint.parse("0b1_0"), Ok(Value::Uint(2)));
        assert_eq!(Kind::Uint.parse("0_17"), Ok(Value::Uint(15)));
        for text in ["0x__ff", "0xff_", "_1", "1__0", "1_", "0x_"] {
            assert_eq!(
                Kind::Uint.parse(text),
                Err("invalid syntax".to_string()),
                "{text:?} should be rejected"
            );
        }
    }

    #[test]
    fn parse_integer_failures() {
        assert_eq!(Kind::Uint.parse("abc"), Err("invalid syntax".to_string()));
        assert_eq!(Kind::Uint.parse("-1"), Err("invalid syntax".to_string()));
        assert_eq!(Kind::Uint.parse("+1"), Err("invalid syntax".to_string()));
        assert_eq!(Kind::Uint.parse(""), Err("invalid syntax".to_string()));
        assert_eq!(
            Kind::Uint.parse("4294967296"),
            Err("value out of range".to_string())
        );
        assert_eq!(
            Kind::Int.parse("-2147483649"),
            Err("value out of range".to_string())
        );
        assert_eq!(
            Kind::Int64.parse("-9223372036854775808"),
            Ok(Value::Int64(i64::MIN))
        );
    }

    #[test]
    fn parse_float_string_duration() {
        assert_eq!(Kind::Float64.parse("2.5e3"), Ok(Value::Float64(2500.0)));
        assert!(Kind::Float64.parse("two").is_err());
        assert_eq!(
            Kind::String.parse(""),
            Ok(Value::String(String::new()))
        );
        assert_eq!(
            Kind::Duration.parse("1m30s"),
            Ok(Value::Duration(Duration::from_secs(90)))
        );
        assert!(Kind::Duration.parse("90").is_err());
    }

    #[test]
    fn float_display() {
        let shown = |v: f64| Value::Float64(v).to_string();
        assert_eq!(shown(0.0), "0");
        assert_eq!(shown(0.5), "0.5");
        assert_eq!(shown(8080.0), "8080");
        assert_eq!(shown(123456.0), "123456");
        assert_eq!(shown(0.0001), "0.0001");
        assert_eq!(shown(1e6), "1e+06");
        assert_eq!(shown(1e21), "1e+21");
        assert_eq!(shown(-2.5e-7), "-2.5e-07");
        assert_eq!(shown(f64::INFINITY), "+Inf");
        assert_eq!(shown(f64::NEG_INFINITY), "-Inf");
        assert_eq!(shown(f64::NAN), "NaN");
    }

    #[test]
    fn zero_of_each_kind() {
        for kind in [
            Kind::Bool,
            Kind::Int,
            Kind::Int64,
            Kind::Uint,
            Kind::Uint64,
            Kind::Float64,
            Kind::String,
            Kind::Duration,
        ] {
            let zero = kind.zero();
            assert_eq!(zero.kind(), kind);
            assert!(zero.is_kind_zero());
            assert!(zero.looks_zero());
        }
    }

    #[test]
    fn textual_zero_heuristic() {
        assert!(Value::String("0".to_string()).looks_zero());
        assert!(Value::String("false".to_string()).looks_zero());
        assert!(!Value::String("0".to_string()).is_kind_zero());
        assert!(!Value::String("x".to_string()).looks_zero());
        assert!(!Value::Uint(8080).looks_zero());
        assert!(!Value::Duration(Duration::from_secs(1)).looks_zero());
    }
}
