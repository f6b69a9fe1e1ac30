//! Filter and sort text parser using nom.
//!
//! Lets a clause be written on one line, e.g. from the command line.
//!
//! # Syntax Overview
//!
//! ```text
//! (region = 'euw' | region = 'eune') & wins >= 10 & deleted_at is null
//! ─────────────┬──────────────────── ┬ ─────┬──── ──────────┬─────────
//!              │                     │      │               │
//!              │                     │      │               └── Null check
//!              │                     │      └── Comparison (=, <>, !=, >, <, >=, <=)
//!              │                     └── AND (binds tighter than OR)
//!              └── Parenthesized OR group
//!
//! id in (1, 2, 3)             List membership (may be empty)
//! -created_at, name asc       Sort: leading '-' or 'desc' sorts descending
//! ```
//!
//! Field names are taken verbatim and are not checked against any schema.
//!
//! Quoted strings run to the next `'` and have no escape sequence, so a value
//! containing a single quote (`O'Brien`) cannot be written in filter text.
//! Build such predicates with [`Predicate::eq`] and friends instead.
//!
//! Once `in (` has been read the list must be well formed; errors inside it
//! are reported where they occur.

use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while, take_while1},
    character::complete::{char, digit1, multispace0, multispace1},
    combinator::{cut, map, opt, recognize, value},
    multi::{separated_list0, separated_list1},
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};

use crate::clause::Clause;
use crate::error::{ArmouryError, ArmouryResult};
use crate::ordering::{Direction, FieldOrder, Sort};
use crate::predicate::{Comparison, Predicate};
use crate::value::Value;

/// Parse filter text into a predicate tree. Blank text is [`Predicate::None`].
pub fn parse_filter(input: &str) -> ArmouryResult<Predicate> {
    if input.trim().is_empty() {
        return Ok(Predicate::None);
    }
    finish(input, parse_or(input))
}

/// Parse a comma separated sort list. Blank text is [`Sort::None`].
pub fn parse_sort(input: &str) -> ArmouryResult<Sort> {
    if input.trim().is_empty() {
        return Ok(Sort::None);
    }
    let parsed = map(
        separated_list1(ws(char(',')), parse_sort_item),
        |mut items: Vec<FieldOrder>| {
            if items.len() == 1 {
                Sort::Field(items.remove(0))
            } else {
                Sort::List(items)
            }
        },
    )(input);
    finish(input, parsed)
}

/// Parse filter and sort text into a clause.
pub fn parse_clause(filter: &str, sort: &str) -> ArmouryResult<Clause> {
    Ok(Clause::new(parse_filter(filter)?, parse_sort(sort)?))
}

/// Map a nom result onto a positioned parse error, rejecting leftovers.
fn finish<T>(input: &str, result: IResult<&str, T>) -> ArmouryResult<T> {
    match result {
        Ok((rest, out)) => {
            let rest = rest.trim_start();
            if rest.is_empty() {
                Ok(out)
            } else {
                Err(ArmouryError::parse(
                    input.len() - rest.len(),
                    format!("Unexpected trailing content: '{}'", rest),
                ))
            }
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(ArmouryError::parse(
            input.len() - e.input.len(),
            format!("Parse failed: {:?}", e.code),
        )),
        Err(nom::Err::Incomplete(_)) => {
            Err(ArmouryError::parse(input.len(), "Unexpected end of input"))
        }
    }
}

/// Surround a parser with optional whitespace.
fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

/// Parse an identifier (column name, optionally table-qualified).
fn parse_identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '.')(input)
}

/// OR of one or more AND groups.
fn parse_or(input: &str) -> IResult<&str, Predicate> {
    map(separated_list1(ws(char('|')), parse_and), |mut parts: Vec<Predicate>| {
        if parts.len() == 1 {
            parts.remove(0)
        } else {
            Predicate::Or(parts)
        }
    })(input)
}

/// AND of one or more atoms.
fn parse_and(input: &str) -> IResult<&str, Predicate> {
    map(separated_list1(ws(char('&')), parse_atom), |mut parts: Vec<Predicate>| {
        if parts.len() == 1 {
            parts.remove(0)
        } else {
            Predicate::And(parts)
        }
    })(input)
}

/// A parenthesized group or a single condition.
fn parse_atom(input: &str) -> IResult<&str, Predicate> {
    preceded(
        multispace0,
        alt((
            delimited(char('('), parse_or, preceded(multispace0, char(')'))),
            parse_condition,
        )),
    )(input)
}

/// Parse a single condition.
fn parse_condition(input: &str) -> IResult<&str, Predicate> {
    let (input, field) = parse_identifier(input)?;
    let (input, _) = multispace0(input)?;

    if let Ok(found) = parse_null_check(input, field) {
        return Ok(found);
    }

    match parse_in_list(input, field) {
        Ok(found) => return Ok(found),
        Err(nom::Err::Failure(e)) => return Err(nom::Err::Failure(e)),
        Err(_) => {}
    }

    parse_comparison(input, field)
}

/// `is null` / `is not null`
fn parse_null_check<'a>(input: &'a str, field: &str) -> IResult<&'a str, Predicate> {
    let (input, _) = tag_no_case("is")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, not) = opt(pair(tag_no_case("not"), multispace1))(input)?;
    let (input, _) = tag_no_case("null")(input)?;

    Ok((
        input,
        Predicate::Null {
            field: field.to_string(),
            is_null: not.is_none(),
        },
    ))
}

/// `in (v, ...)`
fn parse_in_list<'a>(input: &'a str, field: &str) -> IResult<&'a str, Predicate> {
    let (input, _) = tag_no_case("in")(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = char('(')(input)?;
    let (input, values) = cut(separated_list0(ws(char(',')), parse_value))(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = cut(char(')'))(input)?;

    Ok((
        input,
        Predicate::In {
            field: field.to_string(),
            values,
        },
    ))
}

/// `op value`
fn parse_comparison<'a>(input: &'a str, field: &str) -> IResult<&'a str, Predicate> {
    let (input, op) = parse_operator(input)?;
    let (input, value) = parse_value(input)?;

    Ok((
        input,
        Predicate::Compare {
            field: field.to_string(),
            op,
            value,
        },
    ))
}

/// Parse a comparison operator. Two-character operators are tried first.
fn parse_operator(input: &str) -> IResult<&str, Comparison> {
    alt((
        value(Comparison::Gte, tag(">=")),
        value(Comparison::Lte, tag("<=")),
        value(Comparison::Ne, tag("<>")),
        value(Comparison::Ne, tag("!=")),
        value(Comparison::Eq, char('=')),
        value(Comparison::Gt, char('>')),
        value(Comparison::Lt, char('<')),
    ))(input)
}

/// Parse a value.
fn parse_value(input: &str) -> IResult<&str, Value> {
    preceded(
        multispace0,
        alt((parse_quoted_string, parse_number, parse_word)),
    )(input)
}

/// Parse a number (integer or float).
fn parse_number(input: &str) -> IResult<&str, Value> {
    let (rest, num_str) = recognize(tuple((
        opt(char('-')),
        digit1,
        opt(pair(char('.'), digit1)),
    )))(input)?;

    let parsed = if num_str.contains('.') {
        num_str.parse().ok().map(Value::Float)
    } else {
        num_str.parse().ok().map(Value::Int)
    };

    match parsed {
        Some(v) => Ok((rest, v)),
        None => Err(nom::Err::Failure(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Digit,
        ))),
    }
}

/// Parse a quoted string.
fn parse_quoted_string(input: &str) -> IResult<&str, Value> {
    let (input, _) = char('\'')(input)?;
    let (input, content) = take_while(|c| c != '\'')(input)?;
    let (input, _) = char('\'')(input)?;

    Ok((input, Value::String(content.to_string())))
}

/// Bare word: a keyword literal or an unquoted string.
fn parse_word(input: &str) -> IResult<&str, Value> {
    map(parse_identifier, |word: &str| {
        match word.to_ascii_lowercase().as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            "null" => Value::Null,
            _ => Value::String(word.to_string()),
        }
    })(input)
}

/// `[-|+]field [asc|desc]`
fn parse_sort_item(input: &str) -> IResult<&str, FieldOrder> {
    let (input, _) = multispace0(input)?;
    let (input, sign) = opt(alt((char('-'), char('+'))))(input)?;
    let (input, field) = parse_identifier(input)?;
    let (input, keyword) = opt(preceded(
        multispace1,
        alt((
            value(Direction::Asc, tag_no_case("asc")),
            value(Direction::Desc, tag_no_case("desc")),
        )),
    ))(input)?;

    // An explicit keyword overrides the sign.
    let direction = match (sign, keyword) {
        (_, Some(dir)) => dir,
        (Some('-'), None) => Direction::Desc,
        _ => Direction::Asc,
    };

    Ok((input, FieldOrder::new(field, direction)))
}
