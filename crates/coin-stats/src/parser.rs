//! Parsers for catalog dates and multi-valued categorical fields, using nom.

use std::str::FromStr;

use nom::{
    bytes::complete::take_while,
    character::complete::{char, digit1, one_of, space0},
    combinator::{all_consuming, map_res},
    multi::separated_list0,
    sequence::{delimited, preceded, tuple},
    IResult,
};

use crate::date::Date;
use crate::error::{DataError, DataResult};
use crate::value::Token;

/// Parses a catalog date in `YYYY/MM/DD` form (`-` is accepted as separator too).
///
/// # Examples
///
/// ```rust
/// use coin_stats::parse_catalog_date;
///
/// let date = parse_catalog_date("1433/10/5").unwrap();
/// assert_eq!(date.year(), 1433);
/// assert_eq!(date.month(), 10);
/// assert_eq!(date.day(), 5);
/// ```
pub fn parse_catalog_date(input: &str) -> DataResult<Date> {
    let input = input.trim();
    if input.is_empty() {
        return Err(DataError::EmptyInput);
    }

    match all_consuming(catalog_date)(input) {
        Ok((_, (year, month, day))) => Date::new(year, month, day),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            let position = input.len() - e.input.len();
            Err(DataError::ParseError {
                position,
                message: format!("expected YYYY/MM/DD at: '{}'", truncate(e.input, 20)),
            })
        }
        Err(nom::Err::Incomplete(_)) => Err(DataError::ParseError {
            position: input.len(),
            message: "incomplete date".to_string(),
        }),
    }
}

/// Splits a categorical field into its `/`-separated tokens.
///
/// Whitespace around each token is trimmed and one trailing `?` marks the token as
/// uncertain. Empty tokens are dropped.
///
/// # Examples
///
/// ```rust
/// use coin_stats::{parse_values, Token};
///
/// let tokens = parse_values("Utrecht / Holland?");
/// assert_eq!(tokens, vec![Token::new("Utrecht", false), Token::new("Holland", true)]);
/// ```
pub fn parse_values(input: &str) -> Vec<Token> {
    let raw = match raw_tokens(input) {
        Ok((_, raw)) => raw,
        Err(_) => vec![input],
    };

    raw.into_iter().filter_map(to_token).collect()
}

fn to_token(raw: &str) -> Option<Token> {
    let trimmed = raw.trim();
    let (value, uncertain) = match trimmed.strip_suffix('?') {
        Some(stripped) => (stripped.trim_end(), true),
        None => (trimmed, false),
    };

    if value.is_empty() {
        None
    } else {
        Some(Token::new(value, uncertain))
    }
}

fn truncate(s: &str, max_len: usize) -> &str {
    match s.char_indices().nth(max_len) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn raw_tokens(input: &str) -> IResult<&str, Vec<&str>> {
    separated_list0(char('/'), take_while(|c| c != '/'))(input)
}

fn catalog_date(input: &str) -> IResult<&str, (i32, u32, u32)> {
    tuple((
        number::<i32>,
        preceded(separator, number::<u32>),
        preceded(separator, number::<u32>),
    ))(input)
}

fn separator(input: &str) -> IResult<&str, char> {
    delimited(space0, one_of("/-"), space0)(input)
}

fn number<T: FromStr>(input: &str) -> IResult<&str, T> {
    map_res(digit1, |digits: &str| digits.parse::<T>())(input)
}
