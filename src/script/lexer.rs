// Shared token parsers for the custom-script language

use nom::{
    bytes::complete::{take_while, take_while1},
    character::complete::{char, multispace0},
    combinator::{map, recognize},
    number::complete::double,
    sequence::{delimited, pair},
    IResult,
};

/// Wrap a parser so it consumes surrounding whitespace (newlines included).
pub fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

/// Parse an identifier: alpha or underscore, then alphanumerics/underscores.
pub fn identifier(input: &str) -> IResult<&str, String> {
    map(
        recognize(pair(
            take_while1(|c: char| c.is_alphabetic() || c == '_'),
            take_while(|c: char| c.is_alphanumeric() || c == '_'),
        )),
        |s: &str| s.to_string(),
    )(input)
}

/// Parse a double-quoted string literal (no escape sequences).
pub fn string_literal(input: &str) -> IResult<&str, String> {
    map(
        delimited(char('"'), take_while(|c| c != '"'), char('"')),
        |s: &str| s.to_string(),
    )(input)
}

/// Parse a numeric literal.
pub fn number_literal(input: &str) -> IResult<&str, f64> {
    double(input)
}
