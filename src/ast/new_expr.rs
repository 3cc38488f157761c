use pest::iterators::Pair;

use crate::parser::Rule;

use super::{Position, TypeName};

/// A `new T` expression; `T` may be `SELF_TYPE`.
#[derive(Debug, Clone, PartialEq)]
pub struct New<T> {
    pub type_name: TypeName,
    pub position: Position,
    pub info: T,
}

impl New<()> {
    pub fn from_pair(pair: Pair<Rule>) -> New<()> {
        assert_eq!(pair.as_rule(), Rule::new_expr);

        let position = pair.line_col();
        let type_name = pair
            .into_inner()
            .find(|inner| inner.as_rule() == Rule::type_id)
            .map(TypeName::from_pair)
            .unwrap();

        New {
            type_name,
            position,
            info: (),
        }
    }
}
