use pest::iterators::Pair;

use crate::parser::Rule;

use super::{Expression, Ident, Position};

/// An assignment `target <- value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Assign<T> {
    pub target: Ident<T>,
    pub value: Box<Expression<T>>,
    pub position: Position,
    pub info: T,
}

impl Assign<()> {
    pub fn from_pair(pair: Pair<Rule>) -> Assign<()> {
        assert_eq!(pair.as_rule(), Rule::assign);

        let position = pair.line_col();
        let mut inner = pair.into_inner();

        Assign {
            target: Ident::from_pair(inner.next().unwrap()),
            value: Box::new(Expression::from_pair(inner.next().unwrap())),
            position,
            info: (),
        }
    }
}
