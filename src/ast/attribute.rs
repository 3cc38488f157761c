use pest::iterators::Pair;

use crate::parser::Rule;

use super::{Expression, Ident, Position, TypeName};

/// An attribute declaration `name : Type <- init`.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDecl<T> {
    pub name: Ident<T>,
    pub type_annotation: TypeName,
    pub init: Option<Expression<T>>,
    pub position: Position,
}

impl AttributeDecl<()> {
    pub fn from_pair(pair: Pair<Rule>) -> AttributeDecl<()> {
        assert_eq!(pair.as_rule(), Rule::attribute_decl);

        let position = pair.line_col();
        let mut inner = pair.into_inner();

        let name = Ident::from_pair(inner.next().unwrap());
        let type_annotation = TypeName::from_pair(inner.next().unwrap());
        let init = inner.next().map(Expression::from_pair);

        AttributeDecl {
            name,
            type_annotation,
            init,
            position,
        }
    }
}
