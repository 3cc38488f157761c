use pest::iterators::Pair;

use crate::parser::Rule;

use super::Position;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boolean<T> {
    pub value: bool,
    pub position: Position,
    pub info: T,
}

impl Boolean<()> {
    pub fn from_pair(pair: Pair<Rule>) -> Boolean<()> {
        assert_eq!(pair.as_rule(), Rule::bool_lit);

        Boolean {
            value: pair.as_str().starts_with('t'),
            position: pair.line_col(),
            info: (),
        }
    }
}
