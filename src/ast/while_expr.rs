use pest::iterators::Pair;

use crate::parser::Rule;

use super::{Expression, Position};

/// A `while cond loop body pool` expression. Its value is always void.
#[derive(Debug, Clone, PartialEq)]
pub struct While<T> {
    pub condition: Box<Expression<T>>,
    pub body: Box<Expression<T>>,
    pub position: Position,
    pub info: T,
}

impl While<()> {
    pub fn from_pair(pair: Pair<Rule>) -> While<()> {
        assert_eq!(pair.as_rule(), Rule::while_expr);

        let position = pair.line_col();
        let mut exprs = pair
            .into_inner()
            .filter(|inner| inner.as_rule() == Rule::expr)
            .map(Expression::from_pair);

        While {
            condition: Box::new(exprs.next().unwrap()),
            body: Box::new(exprs.next().unwrap()),
            position,
            info: (),
        }
    }
}
