use pest::iterators::Pair;

use crate::parser::Rule;

use super::{Expression, Position};

/// An `if cond then e1 else e2 fi` expression.
#[derive(Debug, Clone, PartialEq)]
pub struct If<T> {
    pub condition: Box<Expression<T>>,
    pub then_branch: Box<Expression<T>>,
    pub else_branch: Box<Expression<T>>,
    pub position: Position,
    pub info: T,
}

impl If<()> {
    pub fn from_pair(pair: Pair<Rule>) -> If<()> {
        assert_eq!(pair.as_rule(), Rule::if_expr);

        let position = pair.line_col();
        let mut exprs = pair
            .into_inner()
            .filter(|inner| inner.as_rule() == Rule::expr)
            .map(Expression::from_pair);

        If {
            condition: Box::new(exprs.next().unwrap()),
            then_branch: Box::new(exprs.next().unwrap()),
            else_branch: Box::new(exprs.next().unwrap()),
            position,
            info: (),
        }
    }
}
