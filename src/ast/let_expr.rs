use pest::iterators::Pair;

use crate::parser::Rule;

use super::{Expression, Ident, Position, TypeName};

/// A `let b1, b2, ... in body` expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Let<T> {
    pub bindings: Vec<LetBinding<T>>,
    pub body: Box<Expression<T>>,
    pub position: Position,
    pub info: T,
}

/// One binding of a `let`; the initializer of a binding sees the bindings
/// before it, but never the binding itself.
#[derive(Debug, Clone, PartialEq)]
pub struct LetBinding<T> {
    pub name: Ident<T>,
    pub type_annotation: TypeName,
    pub init: Option<Expression<T>>,
    pub position: Position,
}

impl Let<()> {
    pub fn from_pair(pair: Pair<Rule>) -> Let<()> {
        assert_eq!(pair.as_rule(), Rule::let_expr);

        let position = pair.line_col();

        let mut bindings = vec![];
        let mut body = None;

        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::let_binding => bindings.push(LetBinding::from_pair(inner)),
                Rule::expr => body = Some(Expression::from_pair(inner)),
                _ => {}
            }
        }

        Let {
            bindings,
            body: Box::new(body.unwrap()),
            position,
            info: (),
        }
    }
}

impl LetBinding<()> {
    pub fn from_pair(pair: Pair<Rule>) -> LetBinding<()> {
        assert_eq!(pair.as_rule(), Rule::let_binding);

        let position = pair.line_col();
        let mut inner = pair.into_inner();

        LetBinding {
            name: Ident::from_pair(inner.next().unwrap()),
            type_annotation: TypeName::from_pair(inner.next().unwrap()),
            init: inner.next().map(Expression::from_pair),
            position,
        }
    }
}
