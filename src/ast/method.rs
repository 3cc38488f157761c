use pest::iterators::Pair;

use crate::parser::Rule;

use super::{Expression, Formal, Ident, Position, TypeName};

/// A method declaration `name(formals) : Return { body }`.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl<T> {
    pub name: Ident<T>,
    pub params: Vec<Formal>,
    pub return_type: TypeName,
    pub body: Expression<T>,
    pub position: Position,
}

impl MethodDecl<()> {
    pub fn from_pair(pair: Pair<Rule>) -> MethodDecl<()> {
        assert_eq!(pair.as_rule(), Rule::method_decl);

        let position = pair.line_col();

        let mut name = None;
        let mut params = vec![];
        let mut return_type = None;
        let mut body = None;

        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::object_id => name = Some(Ident::from_pair(inner)),
                Rule::formal => params.push(Formal::from_pair(inner)),
                Rule::type_id => return_type = Some(TypeName::from_pair(inner)),
                Rule::expr => body = Some(Expression::from_pair(inner)),
                rule => unreachable!("unexpected rule {rule:?} in method declaration"),
            }
        }

        MethodDecl {
            name: name.unwrap(),
            params,
            return_type: return_type.unwrap(),
            body: body.unwrap(),
            position,
        }
    }
}
