// Command parser for the custom-script language

use super::ast::ScriptCommand;
use super::lexer::{string_literal, ws};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::char,
    combinator::{eof, map, opt},
    multi::{many0, separated_list0},
    sequence::preceded,
    IResult,
};

/// Parse a trace command
/// Format: trace("Revenue") or trace("Revenue", kind: "column", color: "#ff0000")
pub fn parse_trace(input: &str) -> IResult<&str, ScriptCommand> {
    let (input, _) = ws(tag("trace"))(input)?;
    let (input, _) = ws(char('('))(input)?;
    let (input, source) = ws(string_literal)(input)?;

    let (input, args) = many0(preceded(
        ws(char(',')),
        alt((
            map(preceded(ws(tag("kind:")), ws(string_literal)), |v| {
                ("kind", v)
            }),
            map(preceded(ws(tag("name:")), ws(string_literal)), |v| {
                ("name", v)
            }),
            map(preceded(ws(tag("color:")), ws(string_literal)), |v| {
                ("color", v)
            }),
        )),
    ))(input)?;

    let (input, _) = ws(char(')'))(input)?;

    let mut kind = None;
    let mut name = None;
    let mut color = None;
    for (key, val) in args {
        match key {
            "kind" => kind = Some(val),
            "name" => name = Some(val),
            "color" => color = Some(val),
            _ => {}
        }
    }

    Ok((
        input,
        ScriptCommand::Trace {
            source,
            kind,
            name,
            color,
        },
    ))
}

/// Parse a layout command
/// Format: layout(title: "...") or layout(x_title: "...", y_title: "...")
pub fn parse_layout(input: &str) -> IResult<&str, ScriptCommand> {
    let (input, _) = ws(tag("layout"))(input)?;
    let (input, _) = ws(char('('))(input)?;

    let (input, args) = separated_list0(
        ws(char(',')),
        alt((
            map(preceded(ws(tag("title:")), ws(string_literal)), |v| {
                ("title", v)
            }),
            map(preceded(ws(tag("x_title:")), ws(string_literal)), |v| {
                ("x_title", v)
            }),
            map(preceded(ws(tag("y_title:")), ws(string_literal)), |v| {
                ("y_title", v)
            }),
        )),
    )(input)?;

    let (input, _) = ws(char(')'))(input)?;

    let mut title = None;
    let mut x_title = None;
    let mut y_title = None;
    for (key, val) in args {
        match key {
            "title" => title = Some(val),
            "x_title" => x_title = Some(val),
            "y_title" => y_title = Some(val),
            _ => {}
        }
    }

    Ok((
        input,
        ScriptCommand::Layout {
            title,
            x_title,
            y_title,
        },
    ))
}

/// Parse a clear command
/// Format: clear()
pub fn parse_clear(input: &str) -> IResult<&str, ScriptCommand> {
    let (input, _) = ws(tag("clear"))(input)?;
    let (input, _) = ws(char('('))(input)?;
    let (input, _) = ws(char(')'))(input)?;
    Ok((input, ScriptCommand::Clear))
}

/// Parse any command
pub fn parse_command(input: &str) -> IResult<&str, ScriptCommand> {
    alt((parse_trace, parse_layout, parse_clear))(input)
}

/// Parse a complete script: commands separated by ";"
pub fn parse_script(input: &str) -> IResult<&str, Vec<ScriptCommand>> {
    let (input, commands) = separated_list0(ws(char(';')), parse_command)(input)?;
    let (input, _) = opt(ws(char(';')))(input)?;
    let (input, _) = ws(eof)(input)?;
    Ok((input, commands))
}
