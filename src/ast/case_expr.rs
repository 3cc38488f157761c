use pest::iterators::Pair;

use crate::parser::Rule;

use super::{Expression, Ident, Position, TypeName};

/// A `case e of b1; b2; ... esac` type-discrimination expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Case<T> {
    pub scrutinee: Box<Expression<T>>,
    pub branches: Vec<CaseBranch<T>>,
    pub position: Position,
    pub info: T,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseBranch<T> {
    pub name: Ident<T>,
    pub type_annotation: TypeName,
    pub body: Expression<T>,
    pub position: Position,
}

impl Case<()> {
    pub fn from_pair(pair: Pair<Rule>) -> Case<()> {
        assert_eq!(pair.as_rule(), Rule::case_expr);

        let position = pair.line_col();

        let mut scrutinee = None;
        let mut branches = vec![];

        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::expr => scrutinee = Some(Expression::from_pair(inner)),
                Rule::case_branch => branches.push(CaseBranch::from_pair(inner)),
                _ => {}
            }
        }

        Case {
            scrutinee: Box::new(scrutinee.unwrap()),
            branches,
            position,
            info: (),
        }
    }
}

impl CaseBranch<()> {
    pub fn from_pair(pair: Pair<Rule>) -> CaseBranch<()> {
        assert_eq!(pair.as_rule(), Rule::case_branch);

        let position = pair.line_col();
        let mut inner = pair.into_inner();

        CaseBranch {
            name: Ident::from_pair(inner.next().unwrap()),
            type_annotation: TypeName::from_pair(inner.next().unwrap()),
            body: Expression::from_pair(inner.next().unwrap()),
            position,
        }
    }
}
