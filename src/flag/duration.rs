use std::fmt::Display;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

const NANOSECOND: u128 = 1;
const MICROSECOND: u128 = 1_000 * NANOSECOND;
const MILLISECOND: u128 = 1_000 * MICROSECOND;
const SECOND: u128 = 1_000 * MILLISECOND;
const MINUTE: u128 = 60 * SECOND;
const HOUR: u128 = 60 * MINUTE;

/// Signed span of time with nanosecond resolution.
///
/// The text form is a sequence of decimal numbers each followed by a unit,
/// e.g. `"300ms"`, `"-1.5h"` or `"2h45m"`. Valid units are `ns`, `us`
/// (or `µs`), `ms`, `s`, `m` and `h`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Duration {
    nanos: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason} in duration {input:?}")]
pub struct ParseDurationError {
    input: String,
    reason: &'static str,
}

impl Duration {
    pub const ZERO: Duration = Duration { nanos: 0 };

    pub const fn from_nanos(nanos: i64) -> Self {
        Duration { nanos }
    }

    pub const fn from_secs(secs: i64) -> Self {
        Duration {
            nanos: secs.saturating_mul(SECOND as i64),
        }
    }

    pub const fn as_nanos(&self) -> i64 {
        self.nanos
    }

    /// Whole seconds, truncated toward zero.
    pub const fn as_secs(&self) -> i64 {
        self.nanos / SECOND as i64
    }

    pub const fn is_zero(&self) -> bool {
        self.nanos == 0
    }

    /// `None` for negative durations.
    pub fn to_std(&self) -> Option<std::time::Duration> {
        u64::try_from(self.nanos)
            .ok()
            .map(std::time::Duration::from_nanos)
    }
}

impl From<std::time::Duration> for Duration {
    fn from(value: std::time::Duration) -> Self {
        Duration {
            nanos: i64::try_from(value.as_nanos()).unwrap_or(i64::MAX),
        }
    }
}

/// Serialized in its text form, e.g. `"1m30s"`.
impl Serialize for Duration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn unit_nanos(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(NANOSECOND),
        "us" | "\u{b5}s" | "\u{3bc}s" => Some(MICROSECOND),
        "ms" => Some(MILLISECOND),
        "s" => Some(SECOND),
        "m" => Some(MINUTE),
        "h" => Some(HOUR),
        _ => None,
    }
}

impl FromStr for Duration {
    type Err = ParseDurationError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let error = |reason| ParseDurationError {
            input: input.to_string(),
            reason,
        };

        let (negative, mut rest) = match input.as_bytes().first() {
            Some(b'-') => (true, &input[1..]),
            Some(b'+') => (false, &input[1..]),
            _ => (false, input),
        };
        if rest == "0" {
            return Ok(Duration::ZERO);
        }
        if rest.is_empty() {
            return Err(error("invalid syntax"));
        }

        let mut total: u128 = 0;
        while !rest.is_empty() {
            let int_len = rest.bytes().take_while(u8::is_ascii_digit).count();
            let (int_digits, after_int) = rest.split_at(int_len);

            let (frac_digits, after_frac) = match after_int.strip_prefix('.') {
                Some(tail) => {
                    let frac_len = tail.bytes().take_while(u8::is_ascii_digit).count();
                    tail.split_at(frac_len)
                }
                None => ("", after_int),
            };
            if int_digits.is_empty() && frac_digits.is_empty() {
                return Err(error("invalid syntax"));
            }

            let unit_len = after_frac
                .char_indices()
                .find(|(_, c)| *c == '.' || c.is_ascii_digit())
                .map_or(after_frac.len(), |(i, _)| i);
            let (unit, tail) = after_frac.split_at(unit_len);
            if unit.is_empty() {
                return Err(error("missing unit"));
            }
            let unit = unit_nanos(unit).ok_or_else(|| error("unknown unit"))?;

            let mut component: u128 = 0;
            for digit in int_digits.bytes() {
                component = component
                    .checked_mul(10)
                    .and_then(|v| v.checked_add(u128::from(digit - b'0')))
                    .filter(|v| *v <= i64::MAX as u128 + 1)
                    .ok_or_else(|| error("value out of range"))?;
            }
            component = component
                .checked_mul(unit)
                .ok_or_else(|| error("value out of range"))?;

            // Digits past nanosecond precision cannot change the result.
            let mut fraction: u128 = 0;
            let mut scale: u128 = 1;
            for digit in frac_digits.bytes().take(18) {
                fraction = fraction * 10 + u128::from(digit - b'0');
                scale *= 10;
            }
            component += fraction * unit / scale;

            total = total
                .checked_add(component)
                .filter(|v| *v <= i64::MAX as u128 + 1)
                .ok_or_else(|| error("value out of range"))?;
            rest = tail;
        }

        let signed = if negative {
            -(total as i128)
        } else {
            total as i128
        };
        i64::try_from(signed)
            .map(Duration::from_nanos)
            .map_err(|_| error("value out of range"))
    }
}

/// `value / 10^precision` with the remainder as trimmed decimal digits.
fn write_fraction(
    f: &mut std::fmt::Formatter<'_>,
    value: u128,
    precision: u32,
) -> std::fmt::Result {
    let divisor = 10u128.pow(precision);
    write!(f, "{}", value / divisor)?;
    let remainder = value % divisor;
    if remainder != 0 {
        let digits = format!("{:0width$}", remainder, width = precision as usize);
        write!(f, ".{}", digits.trim_end_matches('0'))?;
    }
    Ok(())
}

impl Display for Duration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.nanos == 0 {
            return write!(f, "0s");
        }
        if self.nanos < 0 {
            write!(f, "-")?;
        }
        let nanos = u128::from(self.nanos.unsigned_abs());

        if nanos < MICROSECOND {
            return write!(f, "{nanos}ns");
        }
        if nanos < MILLISECOND {
            write_fraction(f, nanos, 3)?;
            return write!(f, "\u{b5}s");
        }
        if nanos < SECOND {
            write_fraction(f, nanos, 6)?;
            return write!(f, "ms");
        }

        let hours = nanos / HOUR;
        let minutes = nanos % HOUR / MINUTE;
        let seconds = nanos % MINUTE;
        if hours > 0 {
            write!(f, "{hours}h{minutes}m")?;
        } else if minutes > 0 {
            write!(f, "{minutes}m")?;
        }
        write_fraction(f, seconds, 9)?;
        write!(f, "s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Duration {
        text.parse().unwrap()
    }

    #[test]
    fn parse_simple_units() {
        assert_eq!(parse("3s"), Duration::from_secs(3));
        assert_eq!(parse("1ns"), Duration::from_nanos(1));
        assert_eq!(parse("1us"), Duration::from_nanos(1_000));
        assert_eq!(parse("1\u{b5}s"), Duration::from_nanos(1_000));
        assert_eq!(parse("1ms"), Duration::from_nanos(1_000_000));
        assert_eq!(parse("2m"), Duration::from_secs(120));
        assert_eq!(parse("1h"), Duration::from_secs(3600));
    }

    #[test]
    fn parse_compound_and_fractional() {
        assert_eq!(parse("2h45m"), Duration::from_secs(2 * 3600 + 45 * 60));
        assert_eq!(parse("1.5s"), Duration::from_nanos(1_500_000_000));
        assert_eq!(parse(".5m"), Duration::from_secs(30));
        assert_eq!(parse("1h1m1s1ms"), Duration::from_nanos(3_661_001_000_000));
    }

    #[test]
    fn parse_signs_and_zero() {
        assert_eq!(parse("0"), Duration::ZERO);
        assert_eq!(parse("-0"), Duration::ZERO);
        assert_eq!(parse("+5s"), Duration::from_secs(5));
        assert_eq!(parse("-1.5h"), Duration::from_secs(-5400));
    }

    #[test]
    fn parse_rejects_garbage() {
        for text in ["", "-", "abc", "3", "1x", "s", ".s", "1.2.3s"] {
            assert!(text.parse::<Duration>().is_err(), "{text:?} should fail");
        }
    }

    #[test]
    fn parse_rejects_overflow() {
        assert!("9223372036854775808ns".parse::<Duration>().is_err());
        assert!("3000000h".parse::<Duration>().is_err());
        assert_eq!(
            parse("-9223372036854775808ns"),
            Duration::from_nanos(i64::MIN)
        );
    }

    #[test]
    fn display() {
        assert_eq!(Duration::ZERO.to_string(), "0s");
        assert_eq!(Duration::from_nanos(7).to_string(), "7ns");
        assert_eq!(Duration::from_nanos(250_000).to_string(), "250\u{b5}s");
        assert_eq!(Duration::from_nanos(1_500_000).to_string(), "1.5ms");
        assert_eq!(Duration::from_nanos(1_500_000_000).to_string(), "1.5s");
        assert_eq!(Duration::from_secs(90).to_string(), "1m30s");
        assert_eq!(Duration::from_secs(60).to_string(), "1m0s");
        assert_eq!(parse("2h45m").to_string(), "2h45m0s");
        assert_eq!(Duration::from_secs(-5400).to_string(), "-1h30m0s");
    }

    #[test]
    fn parse_error_message() {
        let error = "1x".parse::<Duration>().unwrap_err();
        assert_eq!(error.to_string(), "unknown unit in duration \"1x\"");
    }

    #[test]
    fn serializes_as_text() {
        assert_eq!(
            serde_yml::to_value(Duration::from_secs(90)).unwrap(),
            serde_yml::Value::String("1m30s".to_string())
        );
    }

    #[test]
    fn std_conversion() {
        assert_eq!(
            Duration::from_secs(2).to_std(),
            Some(std::time::Duration::from_secs(2))
        );
        assert_eq!(Duration::from_secs(-2).to_std(), None);
        assert_eq!(
            Duration::from(std::time::Duration::from_millis(5)),
            Duration::from_nanos(5_000_000)
        );
    }
}
