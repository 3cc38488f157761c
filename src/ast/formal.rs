use pest::iterators::Pair;

use crate::parser::Rule;

use super::{Position, TypeName};

/// A formal method parameter `name : Type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formal {
    pub name: String,
    pub type_annotation: TypeName,
    pub position: Position,
}

impl Formal {
    pub fn from_pair(pair: Pair<Rule>) -> Formal {
        assert_eq!(pair.as_rule(), Rule::formal);

        let position = pair.line_col();
        let mut inner = pair.into_inner();

        Formal {
            name: inner.next().unwrap().as_str().to_owned(),
            type_annotation: TypeName::from_pair(inner.next().unwrap()),
            position,
        }
    }
}
