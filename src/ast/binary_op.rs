use std::fmt::Display;

use pest::iterators::Pair;

use crate::parser::Rule;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Plus,
    Minus,
    Times,
    Divide,
    Less,
    LessEqual,
    Equal,
}

impl BinaryOp {
    pub fn from_pair(pair: Pair<Rule>) -> BinaryOp {
        match pair.as_str() {
            "+" => BinaryOp::Plus,
            "-" => BinaryOp::Minus,
            "*" => BinaryOp::Times,
            "/" => BinaryOp::Divide,
            "<" => BinaryOp::Less,
            "<=" => BinaryOp::LessEqual,
            "=" => BinaryOp::Equal,
            op => unreachable!("unexpected binary operator '{op}'"),
        }
    }

    /// Whether this operator takes two `Int` operands.
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOp::Plus | BinaryOp::Minus | BinaryOp::Times | BinaryOp::Divide
        )
    }
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            BinaryOp::Plus => "+",
            BinaryOp::Minus => "-",
            BinaryOp::Times => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Equal => "=",
        })
    }
}
