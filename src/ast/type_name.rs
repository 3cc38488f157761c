use pest::iterators::Pair;

use crate::parser::Rule;

use super::Position;

/// A type identifier in a declared position (class name, parent, annotation).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeName {
    pub value: String,
    pub position: Position,
}

impl TypeName {
    pub fn from_pair(pair: Pair<Rule>) -> TypeName {
        assert_eq!(pair.as_rule(), Rule::type_id);

        TypeName {
            value: pair.as_str().to_owned(),
            position: pair.line_col(),
        }
    }
}
