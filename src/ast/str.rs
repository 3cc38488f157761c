use pest::iterators::Pair;
use unescape::unescape;

use crate::parser::Rule;

use super::Position;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Str<T> {
    pub value: String,
    pub position: Position,
    pub info: T,
}

impl Str<()> {
    pub fn from_pair(pair: Pair<Rule>) -> Str<()> {
        assert_eq!(pair.as_rule(), Rule::string);

        let raw = pair.clone().into_inner().next().unwrap().as_str();

        Str {
            value: unescape(raw).unwrap_or_else(|| raw.to_owned()),
            position: pair.line_col(),
            info: (),
        }
    }
}
