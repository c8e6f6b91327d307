//! Value coercion
//!
//! Unquoted cut values are typed by content. The trial order is fixed:
//!
//! 1. `-?[0-9]+` becomes an integer
//! 2. `YYYY-MM-DD` naming a real calendar date becomes a date
//! 3. anything else stays a string, unchanged
//!
//! Partial matches never truncate: `2015M01` is a string, not `2015`.

use chrono::NaiveDate;
use nom::{
    bytes::complete::take_while_m_n,
    character::complete::{char, digit1},
    combinator::{all_consuming, map_res, opt, recognize},
    sequence::{pair, tuple},
    IResult,
};

use crate::query::ast::Value;

/// Type an unquoted token
pub fn coerce(token: &str) -> Value {
    if let Some(i) = parse_integer(token) {
        return Value::Integer(i);
    }
    if let Some(d) = parse_date(token) {
        return Value::Date(d);
    }
    Value::String(token.to_string())
}

/// Parse a token that is entirely an optionally negative decimal integer.
///
/// Tokens that overflow `i64` are not integers.
pub fn parse_integer(token: &str) -> Option<i64> {
    let (_, digits) = all_consuming(integer)(token).ok()?;
    digits.parse::<i64>().ok()
}

/// Parse a token that is entirely a `YYYY-MM-DD` calendar date.
///
/// Years start at 1; `0000` is not a calendar year.
pub fn parse_date(token: &str) -> Option<NaiveDate> {
    let (_, (year, _, month, _, day)) = all_consuming(date_parts)(token).ok()?;
    if year < 1 {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

fn integer(input: &str) -> IResult<&str, &str> {
    recognize(pair(opt(char('-')), digit1))(input)
}

fn date_parts(input: &str) -> IResult<&str, (i32, char, u32, char, u32)> {
    tuple((
        map_res(fixed_digits(4), |s: &str| s.parse::<i32>()),
        char('-'),
        map_res(fixed_digits(2), |s: &str| s.parse::<u32>()),
        char('-'),
        map_res(fixed_digits(2), |s: &str| s.parse::<u32>()),
    ))(input)
}

fn fixed_digits<'a>(count: usize) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    take_while_m_n(count, count, |c: char| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Value {
        Value::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn test_integers() {
        assert_eq!(coerce("2015"), Value::Integer(2015));
        assert_eq!(coerce("3"), Value::Integer(3));
        assert_eq!(coerce("-42"), Value::Integer(-42));
        assert_eq!(coerce("007"), Value::Integer(7));
        assert_eq!(coerce("-0"), Value::Integer(0));
    }

    #[test]
    fn test_not_integers() {
        assert_eq!(coerce("2015M01"), Value::from("2015M01"));
        assert_eq!(coerce("-"), Value::from("-"));
        assert_eq!(coerce("+5"), Value::from("+5"));
        assert_eq!(coerce("5-"), Value::from("5-"));
        assert_eq!(coerce("--5"), Value::from("--5"));
        assert_eq!(coerce("1.5"), Value::from("1.5"));
        assert_eq!(coerce(" 5"), Value::from(" 5"));
        assert_eq!(coerce("٣"), Value::from("٣"));
    }

    #[test]
    fn test_integer_overflow_stays_string() {
        assert_eq!(
            coerce("9223372036854775807"),
            Value::Integer(i64::MAX)
        );
        assert_eq!(
            coerce("9223372036854775808"),
            Value::from("9223372036854775808")
        );
        assert_eq!(
            coerce("-9223372036854775808"),
            Value::Integer(i64::MIN)
        );
    }

    #[test]
    fn test_dates() {
        assert_eq!(coerce("2015-01-04"), date(2015, 1, 4));
        assert_eq!(coerce("2016-02-29"), date(2016, 2, 29));
        assert_eq!(coerce("0001-01-01"), date(1, 1, 1));
    }

    #[test]
    fn test_invalid_dates_stay_strings() {
        assert_eq!(coerce("2015-13-40"), Value::from("2015-13-40"));
        assert_eq!(coerce("2015-02-29"), Value::from("2015-02-29"));
        assert_eq!(coerce("2015-1-4"), Value::from("2015-1-4"));
        assert_eq!(coerce("15-01-04"), Value::from("15-01-04"));
        assert_eq!(coerce("2015-01-04T00"), Value::from("2015-01-04T00"));
        assert_eq!(coerce("2015/01/04"), Value::from("2015/01/04"));
        assert_eq!(coerce("20150-01-04"), Value::from("20150-01-04"));
        assert_eq!(coerce("0000-01-01"), Value::from("0000-01-01"));
        assert_eq!(coerce("0001-01-01"), date(1, 1, 1));
    }

    #[test]
    fn test_strings() {
        assert_eq!(coerce("bar"), Value::from("bar"));
        assert_eq!(coerce(""), Value::from(""));
        assert_eq!(coerce("bar lala"), Value::from("bar lala"));
    }

    #[test]
    fn test_helpers() {
        assert_eq!(parse_integer("12"), Some(12));
        assert_eq!(parse_integer("12a"), None);
        assert_eq!(parse_date("2015-01-05"), NaiveDate::from_ymd_opt(2015, 1, 5));
        assert_eq!(parse_date("2015-01-05 "), None);
    }
}
