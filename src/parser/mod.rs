//! Parser for COOL source files.
//!
//! The grammar lives in `src/cool.pest`; this module drives it and hands the
//! resulting pairs to the AST constructors.
use std::{error::Error, fmt::Display};

use pest::Parser;

use crate::ast::{Position, Program};

#[derive(Parser)]
#[grammar = "cool.pest"]
pub struct CoolParser;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub position: Position,
}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (line, col) = self.position;
        write!(f, "({line}, {col}) - SyntacticError: {}", self.message)
    }
}

impl Error for ParseError {}

/// Parse a whole COOL source file into an untyped AST.
pub fn parse(source: &str) -> Result<Program<()>, ParseError> {
    let mut pairs = CoolParser::parse(Rule::program, source).map_err(|error| {
        let position = match error.line_col {
            pest::error::LineColLocation::Pos(pos) => pos,
            pest::error::LineColLocation::Span(start, _) => start,
        };
        ParseError {
            message: error.variant.message().into_owned(),
            position,
        }
    })?;

    Ok(Program::from_pair(pairs.next().unwrap()))
}
