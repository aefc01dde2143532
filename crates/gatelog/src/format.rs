//! Runtime message templates.
//!
//! Templates are applied after the severity check, so a disabled call never
//! pays for parsing or rendering. The syntax is a small subset of
//! `core::fmt`:
//!
//! - `{}` takes the next argument
//! - `{N}` takes argument `N` (does not advance the implicit counter)
//! - `{{` and `}}` are literal braces
//!
//! Formatting never panics. Every failure mode is reported as a
//! [`FormatError`], which the emitter turns into a warning record.

use std::fmt::{Display, Write as _};

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, take_till1},
    character::complete::digit1,
    combinator::{map, map_res, opt, value},
    multi::many0,
};

use crate::contain::contain;

/// Why a template could not be applied to its arguments.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// A `{` or `}` with no partner.
    #[error("unmatched `{brace}` at byte {position}")]
    UnmatchedBrace { position: usize, brace: char },

    /// Something other than `{}` or `{N}` between braces.
    #[error("invalid placeholder at byte {position}")]
    InvalidPlaceholder { position: usize },

    /// A placeholder refers past the end of the argument list.
    #[error("missing argument {index} ({supplied} supplied)")]
    MissingArgument { index: usize, supplied: usize },

    /// Arguments were supplied that no placeholder refers to.
    #[error("{supplied} arguments supplied but only {used} used")]
    UnusedArguments { used: usize, supplied: usize },

    /// An argument's `Display` implementation returned an error.
    #[error("argument {index} failed to display")]
    Display { index: usize },

    /// An argument's `Display` implementation panicked.
    #[error("argument display panicked: {message}")]
    Panicked { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fragment<'a> {
    Literal(&'a str),
    Placeholder(Option<usize>),
}

fn literal(input: &str) -> IResult<&str, Fragment<'_>> {
    map(take_till1(|c: char| c == '{' || c == '}'), Fragment::Literal)(input)
}

/// `{{` or `}}`.
fn escaped(input: &str) -> IResult<&str, Fragment<'_>> {
    alt((
        value(Fragment::Literal("{"), tag("{{")),
        value(Fragment::Literal("}"), tag("}}")),
    ))(input)
}

/// `{}` or `{N}`.
fn placeholder(input: &str) -> IResult<&str, Fragment<'_>> {
    let (input, _) = tag("{")(input)?;
    let (input, index) = opt(map_res(digit1, |digits: &str| digits.parse::<usize>()))(input)?;
    let (input, _) = tag("}")(input)?;

    Ok((input, Fragment::Placeholder(index)))
}

fn parse(template: &str) -> Result<Vec<Fragment<'_>>, FormatError> {
    let (rest, fragments) = many0(alt((escaped, placeholder, literal)))(template)
        .map_err(|_| FormatError::InvalidPlaceholder { position: 0 })?;

    if rest.is_empty() {
        return Ok(fragments);
    }

    let position = template.len() - rest.len();
    if rest.starts_with('{') && rest[1..].contains('}') {
        Err(FormatError::InvalidPlaceholder { position })
    } else {
        let brace = if rest.starts_with('{') { '{' } else { '}' };
        Err(FormatError::UnmatchedBrace { position, brace })
    }
}

fn render(fragments: &[Fragment<'_>], args: &[&dyn Display]) -> Result<String, FormatError> {
    let mut out = String::new();
    let mut used = vec![false; args.len()];
    let mut next = 0;

    for fragment in fragments {
        match *fragment {
            Fragment::Literal(text) => out.push_str(text),
            Fragment::Placeholder(explicit) => {
                let index = if let Some(index) = explicit {
                    index
                } else {
                    next += 1;
                    next - 1
                };
                let arg = args.get(index).ok_or(FormatError::MissingArgument {
                    index,
                    supplied: args.len(),
                })?;
                write!(out, "{arg}").map_err(|_| FormatError::Display { index })?;
                used[index] = true;
            }
        }
    }

    let used = used.iter().filter(|u| **u).count();
    if used < args.len() {
        return Err(FormatError::UnusedArguments {
            used,
            supplied: args.len(),
        });
    }

    Ok(out)
}

/// Applies `args` to `template`, containing panics raised by `Display`
/// implementations.
///
/// ```
/// use gatelog::format::safe_format;
///
/// assert_eq!(safe_format("{} of {}", &[&3, &"four"]).unwrap(), "3 of four");
/// assert_eq!(safe_format("{1}{0}", &[&'a', &'b']).unwrap(), "ba");
/// assert!(safe_format("{} {}", &[&1]).is_err());
/// ```
pub fn safe_format(template: &str, args: &[&dyn Display]) -> Result<String, FormatError> {
    format_template(template, args, true)
}

pub(crate) fn format_template(
    template: &str,
    args: &[&dyn Display],
    contain_panics: bool,
) -> Result<String, FormatError> {
    let fragments = parse(template)?;
    contain(contain_panics, || render(&fragments, args))
        .unwrap_or_else(|message| Err(FormatError::Panicked { message }))
}
