use pest::iterators::Pair;

use crate::parser::Rule;

use super::{Expression, Position};

/// A `{ e1; e2; ... }` sequence; its value is the last expression's value.
#[derive(Debug, Clone, PartialEq)]
pub struct Block<T> {
    pub expressions: Vec<Expression<T>>,
    pub position: Position,
    pub info: T,
}

impl Block<()> {
    pub fn from_pair(pair: Pair<Rule>) -> Block<()> {
        assert_eq!(pair.as_rule(), Rule::block_expr);

        let position = pair.line_col();
        let expressions = pair.into_inner().map(Expression::from_pair).collect();

        Block {
            expressions,
            position,
            info: (),
        }
    }
}
