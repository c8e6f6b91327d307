//! Delimiter tokenizer
//!
//! Splits an expression on one delimiter while honoring double-quoted runs.
//! A quote opens a run when it starts the input or directly follows one of
//! the grammar delimiters (`|`, `;`, `:`, `,`). Everything up to the matching
//! closing quote is literal, delimiters included. A closing quote must be
//! followed by the end of input or a delimiter.
//!
//! ```text
//! split(r#"foo:"bar|lala"|bar:5"#, '|')  =>  [foo:"bar|lala"] [bar:5]
//! split(r#""bar";"lala""#, ';')          =>  ["bar"] ["lala"]   (quoted)
//! ```

use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, satisfy},
    combinator::{all_consuming, recognize},
    error::{Error, ErrorKind},
    multi::{many0, separated_list1},
    sequence::terminated,
    IResult, Offset,
};

use crate::query::error::{QueryError, QueryResult};

/// The double quote that opens and closes a quoted run
pub const QUOTE: char = '"';

/// Structural characters of the expression grammars
pub const DELIMITERS: [char; 4] = ['|', ';', ':', ','];

/// Whether `c` is one of the grammar delimiters
pub fn is_delimiter(c: char) -> bool {
    DELIMITERS.contains(&c)
}

/// A piece of an expression between two delimiters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    raw: &'a str,
    offset: usize,
    quoted: bool,
}

impl<'a> Segment<'a> {
    /// The segment exactly as written, quotes included
    pub fn raw(&self) -> &'a str {
        self.raw
    }

    /// Byte offset of the segment within the split input
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Whether the whole segment is one quoted run
    pub fn is_quoted(&self) -> bool {
        self.quoted
    }

    /// Whether nothing was written between the delimiters
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Segment content: the text between the quotes for a quoted segment,
    /// the raw text otherwise
    pub fn text(&self) -> &'a str {
        if self.quoted {
            &self.raw[1..self.raw.len() - 1]
        } else {
            self.raw
        }
    }
}

/// Split `input` on every unquoted occurrence of `delimiter`.
///
/// Empty segments are returned as-is; grammars that need a value reject them.
pub fn split(input: &str, delimiter: char) -> QueryResult<Vec<Segment<'_>>> {
    debug_assert!(is_delimiter(delimiter));

    let (_, raws) = segments(input, delimiter).map_err(|e| tokenizer_error(input, e))?;

    Ok(raws
        .into_iter()
        .map(|raw| Segment {
            raw,
            offset: input.offset(raw),
            quoted: all_consuming(quoted_run)(raw).is_ok(),
        })
        .collect())
}

/// Split `input` at the first unquoted occurrence of `delimiter`.
///
/// Returns the head segment and, when the delimiter occurs, the raw remainder
/// after it.
pub fn split_once(input: &str, delimiter: char) -> QueryResult<(Segment<'_>, Option<&str>)> {
    let segments = split(input, delimiter)?;
    let head = segments[0];
    let tail = segments.get(1).map(|next| &input[next.offset()..]);
    Ok((head, tail))
}

/// segments := segment (delimiter segment)*
/// segment  := (quoted_run | word | other_delimiter)*
///
/// Words are maximal runs of non-delimiters, so a piece that starts with a
/// quote always sits at the start of input or right after a delimiter.
fn segments(input: &str, delimiter: char) -> IResult<&str, Vec<&str>> {
    let word = take_while1(|c: char| !is_delimiter(c));
    let other_delimiter = recognize(satisfy(move |c| c != delimiter && is_delimiter(c)));
    let segment = recognize(many0(alt((quoted_run, word, other_delimiter))));

    all_consuming(separated_list1(char(delimiter), segment))(input)
}

/// A double-quoted run, quotes included. Once the opening quote is seen the
/// run must close and be followed by the end of input or a delimiter.
fn quoted_run(input: &str) -> IResult<&str, &str> {
    let (body, _) = char(QUOTE)(input)?;
    let (rest, _) = terminated(take_while(|c: char| c != QUOTE), char(QUOTE))(body)
        .map_err(|_: nom::Err<Error<&str>>| nom::Err::Failure(Error::new(input, ErrorKind::Char)))?;

    match rest.chars().next() {
        Some(next) if !is_delimiter(next) => {
            Err(nom::Err::Failure(Error::new(rest, ErrorKind::Verify)))
        }
        _ => Ok((rest, &input[..input.offset(rest)])),
    }
}

fn tokenizer_error(input: &str, err: nom::Err<Error<&str>>) -> QueryError {
    let e = match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => e,
        nom::Err::Incomplete(_) => return QueryError::syntax(input, "incomplete expression"),
    };
    let position = input.offset(e.input);

    let reason = match (e.code, e.input.chars().next()) {
        (ErrorKind::Char, Some(QUOTE)) => format!("unterminated quote at position {}", position),
        (ErrorKind::Verify, Some(next)) => format!(
            "unexpected '{}' after closing quote at position {}",
            next,
            position - QUOTE.len_utf8()
        ),
        _ => format!("malformed expression at position {}", position),
    };
    QueryError::syntax(input, reason)
}
